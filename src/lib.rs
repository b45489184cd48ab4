//! Filetags: xdg tags and comments stored in extended file attributes.
//!
//! Two attributes are managed per file or directory:
//!
//! - `user.xdg.tags`: a set of tags, stored sorted, unique and comma-joined
//! - `user.xdg.comment`: free text
//!
//! # Architecture
//!
//! Every invocation is one [`Operation`] chosen up front. The
//! [`PathResolver`] produces the ordered candidate paths, the editors or the
//! [`SearchEngine`] process each path in turn through an
//! [`AttributeStore`], and the outcomes are collected into a [`Report`]
//! whose exit status reflects per-path errors and, for searches, whether
//! anything matched.
//!
//! Per-path failures never abort a batch. Only an invalid flag combination
//! ([`ConfigurationError`]) or an unreadable working directory does.
//!
//! # Example
//!
//! ```no_run
//! use filetags::{execute, Flags, Invocation, OsBackend};
//! use std::path::PathBuf;
//!
//! let flags = Flags {
//!     add: Some("python,script".to_string()),
//!     paths: vec![PathBuf::from("tool.py")],
//!     ..Default::default()
//! };
//! let invocation = Invocation::from_flags(&flags)?;
//! let cwd = std::env::current_dir()?;
//! let report = execute(&invocation, &cwd, OsBackend::new(false))?;
//! std::process::exit(report.exit_status());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod comment;
pub mod config;
pub mod error;
pub mod mode;
pub mod render;
pub mod report;
pub mod resolve;
pub mod search;
pub mod store;
pub mod tags;

// Re-exports
pub use codec::{
    decode_comment, decode_tags, encode_comment, encode_tags, parse_tag_args, DecodeError,
    TagError, TagSet,
};
pub use comment::CommentEditor;
pub use config::{ConfigError, Defaults};
pub use error::PathError;
pub use mode::{execute, ConfigIssue, ConfigurationError, Flags, Invocation, Operation};
pub use render::{Line, Renderer, Style};
pub use report::{Payload, Record, RecordKind, Report};
pub use resolve::{
    Candidate, PathFilter, PathKind, PathResolver, ResolutionError, ResolveError, ResolveOptions,
};
pub use search::{
    Evaluation, FieldValue, MatchMode, Pattern, SearchEngine, SearchField, SearchMatch,
    SearchQuery,
};
pub use store::{
    AttrBackend, AttrEntry, AttrError, AttributeStore, IoKind, MemBackend, OsBackend,
    COMMENT_ATTR, TAGS_ATTR,
};
pub use tags::{TagChange, TagEditor};
