//! Operation selection and dispatch.
//!
//! The command line hands over a flat [`Flags`] bag. [`Invocation::from_flags`]
//! turns it into exactly one [`Operation`] plus resolution options, rejecting
//! contradictory combinations before any path is touched. [`execute`] then
//! runs that single operation over every resolved path.

use crate::codec::parse_tag_args;
use crate::comment::CommentEditor;
use crate::report::{Payload, Record, RecordKind, Report};
use crate::resolve::{PathFilter, PathResolver, ResolveError, ResolveOptions};
use crate::search::{MatchMode, Pattern, SearchEngine, SearchField, SearchQuery};
use crate::store::{AttrBackend, AttributeStore};
use crate::tags::TagEditor;
use std::fmt;
use std::path::{Path, PathBuf};

/// Options exactly as parsed from the command line, before validation.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    pub paths: Vec<PathBuf>,
    pub list_tags: bool,
    pub list_attrs: bool,
    /// List comments, or search comments instead of tags.
    pub comments: bool,
    pub add: Option<String>,
    pub remove: Option<String>,
    pub clear_tags: bool,
    pub set_comment: Option<String>,
    pub clear_comment: bool,
    pub search: Option<String>,
    pub literal: bool,
    pub reverse: bool,
    pub names_only: bool,
    pub recurse: bool,
    pub follow_symlinks: bool,
    pub files_only: bool,
    pub dirs_only: bool,
}

/// The single thing an invocation does.
#[derive(Debug, Clone)]
pub enum Operation {
    ListTags,
    ListComment,
    ListAttrs,
    AddTags(Vec<String>),
    RemoveTags(Vec<String>),
    ClearTags,
    SetComment(String),
    ClearComment,
    Search(SearchQuery),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListTags => "list tags",
            Operation::ListComment => "list comments",
            Operation::ListAttrs => "list attributes",
            Operation::AddTags(_) => "add tags",
            Operation::RemoveTags(_) => "remove tags",
            Operation::ClearTags => "clear tags",
            Operation::SetComment(_) => "set comment",
            Operation::ClearComment => "clear comment",
            Operation::Search(_) => "search",
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, Operation::Search(_))
    }
}

#[derive(Debug, Clone)]
pub struct ConfigurationError {
    pub issues: Vec<ConfigIssue>,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigurationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    ConflictingOperations(Vec<&'static str>),
    ConflictingFilters,
    NoTags {
        operation: &'static str,
        input: String,
    },
    InvalidPattern {
        pattern: String,
        message: String,
    },
    MissingPaths {
        operation: &'static str,
    },
    SearchOnly {
        option: &'static str,
    },
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::ConflictingOperations(names) => {
                write!(f, "only one operation allowed, got: {}", names.join(", "))
            }
            ConfigIssue::ConflictingFilters => {
                write!(f, "files-only and dirs-only filters cannot be combined")
            }
            ConfigIssue::NoTags { operation, input } => {
                write!(f, "no tags to {operation}: {input:?}")
            }
            ConfigIssue::InvalidPattern { pattern, message } => {
                write!(f, "invalid pattern {pattern:?}: {message}")
            }
            ConfigIssue::MissingPaths { operation } => {
                write!(f, "{operation} requires at least one file name")
            }
            ConfigIssue::SearchOnly { option } => {
                write!(f, "{option} can only be used with search")
            }
        }
    }
}

/// A validated request: one operation, its paths and resolution options.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub operation: Operation,
    pub paths: Vec<PathBuf>,
    pub resolve: ResolveOptions,
}

impl Invocation {
    pub fn new(
        operation: Operation,
        paths: Vec<PathBuf>,
        resolve: ResolveOptions,
    ) -> Result<Self, ConfigurationError> {
        if paths.is_empty() && !operation.is_search() {
            return Err(ConfigurationError {
                issues: vec![ConfigIssue::MissingPaths {
                    operation: operation.name(),
                }],
            });
        }
        Ok(Self {
            operation,
            paths,
            resolve,
        })
    }

    /// Validate `flags` into an invocation, collecting every issue found.
    pub fn from_flags(flags: &Flags) -> Result<Self, ConfigurationError> {
        let mut issues = Vec::new();

        let selected: Vec<&'static str> = [
            (flags.list_tags, "--tags"),
            (flags.list_attrs, "--attrs"),
            (flags.add.is_some(), "--add"),
            (flags.remove.is_some(), "--remove"),
            (flags.clear_tags, "--delete"),
            (flags.set_comment.is_some(), "--comment"),
            (flags.clear_comment, "--removecomment"),
            (flags.search.is_some(), "--search"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();

        if selected.len() > 1 {
            issues.push(ConfigIssue::ConflictingOperations(selected.clone()));
        } else if flags.comments && selected.len() == 1 && flags.search.is_none() {
            issues.push(ConfigIssue::ConflictingOperations(vec![
                "--comments",
                selected[0],
            ]));
        }

        if flags.files_only && flags.dirs_only {
            issues.push(ConfigIssue::ConflictingFilters);
        }

        if flags.search.is_none() {
            for (set, option) in [
                (flags.literal, "--literal"),
                (flags.reverse, "--reverse"),
                (flags.names_only, "--names"),
            ] {
                if set {
                    issues.push(ConfigIssue::SearchOnly { option });
                }
            }
        }

        let operation = Self::select(flags, &mut issues);

        if let Some(op) = &operation {
            if flags.paths.is_empty() && !op.is_search() {
                issues.push(ConfigIssue::MissingPaths {
                    operation: op.name(),
                });
            }
        }

        match operation {
            Some(operation) if issues.is_empty() => {
                let filter = if flags.files_only {
                    PathFilter::FilesOnly
                } else if flags.dirs_only {
                    PathFilter::DirsOnly
                } else {
                    PathFilter::None
                };
                let invocation = Self {
                    operation,
                    paths: flags.paths.clone(),
                    resolve: ResolveOptions {
                        recurse: flags.recurse,
                        follow_symlinks: flags.follow_symlinks,
                        filter,
                    },
                };
                tracing::debug!(
                    operation = invocation.operation.name(),
                    paths = invocation.paths.len(),
                    "validated invocation"
                );
                Ok(invocation)
            }
            _ => Err(ConfigurationError { issues }),
        }
    }

    fn select(flags: &Flags, issues: &mut Vec<ConfigIssue>) -> Option<Operation> {
        if let Some(pattern) = &flags.search {
            let mode = if flags.literal {
                MatchMode::Literal
            } else {
                MatchMode::Regex
            };
            let field = if flags.comments {
                SearchField::Comment
            } else {
                SearchField::Tags
            };
            return match Pattern::compile(pattern, mode) {
                Ok(pattern) => Some(Operation::Search(SearchQuery {
                    pattern,
                    field,
                    reverse: flags.reverse,
                })),
                Err(err) => {
                    issues.push(ConfigIssue::InvalidPattern {
                        pattern: pattern.clone(),
                        message: err.to_string(),
                    });
                    None
                }
            };
        }
        if let Some(input) = &flags.add {
            return Self::tag_operation(input, "add", Operation::AddTags, issues);
        }
        if let Some(input) = &flags.remove {
            return Self::tag_operation(input, "remove", Operation::RemoveTags, issues);
        }
        if let Some(text) = &flags.set_comment {
            return Some(Operation::SetComment(text.clone()));
        }
        if flags.clear_tags {
            return Some(Operation::ClearTags);
        }
        if flags.clear_comment {
            return Some(Operation::ClearComment);
        }
        if flags.list_attrs {
            return Some(Operation::ListAttrs);
        }
        if flags.comments {
            return Some(Operation::ListComment);
        }
        Some(Operation::ListTags)
    }

    fn tag_operation(
        input: &str,
        operation: &'static str,
        build: fn(Vec<String>) -> Operation,
        issues: &mut Vec<ConfigIssue>,
    ) -> Option<Operation> {
        let tags = parse_tag_args(&[input]);
        if tags.is_empty() {
            issues.push(ConfigIssue::NoTags {
                operation,
                input: input.to_string(),
            });
            return None;
        }
        Some(build(tags))
    }
}

/// Resolve the invocation's paths under `cwd` and run its operation on each.
///
/// Per-path failures become [`RecordKind::Errored`] records; only an
/// unreadable working directory aborts.
pub fn execute<B: AttrBackend>(
    invocation: &Invocation,
    cwd: &Path,
    backend: B,
) -> Result<Report, ResolveError> {
    let resolved = PathResolver::new(invocation.resolve, cwd).resolve(&invocation.paths)?;
    let store = AttributeStore::new(backend);
    let dispatcher = Dispatcher {
        store: &store,
        operation: &invocation.operation,
    };

    let mut report = Report::new(invocation.operation.is_search());
    for item in resolved {
        let record = match item {
            Ok(candidate) => dispatcher.apply(&candidate.path),
            Err(err) => Record::errored(err.path().to_path_buf(), err),
        };
        report.push(record);
    }
    Ok(report)
}

struct Dispatcher<'a, B> {
    store: &'a AttributeStore<B>,
    operation: &'a Operation,
}

impl<B: AttrBackend> Dispatcher<'_, B> {
    fn apply(&self, path: &Path) -> Record {
        let tags = TagEditor::new(self.store);
        let comments = CommentEditor::new(self.store);

        let result = match self.operation {
            Operation::ListTags => self
                .store
                .read_tags(path)
                .map(|tags| (RecordKind::Listed, Payload::Tags(tags))),
            Operation::ListComment => self
                .store
                .read_comment(path)
                .map(|comment| (RecordKind::Listed, Payload::Comment(comment))),
            Operation::ListAttrs => self
                .store
                .list_attrs(path)
                .map(|attrs| (RecordKind::Listed, Payload::Attrs(attrs))),
            Operation::AddTags(add) => tags
                .add(path, add)
                .map(|change| (RecordKind::Set, Payload::Tags(change.tags))),
            Operation::RemoveTags(remove) => tags
                .remove(path, remove)
                .map(|change| (RecordKind::Set, Payload::Tags(change.tags))),
            Operation::ClearTags => tags
                .clear(path)
                .map(|()| (RecordKind::Cleared, Payload::Empty)),
            Operation::SetComment(text) => comments
                .set(path, text)
                .map(|()| (RecordKind::Set, Payload::Comment(Some(text.clone())))),
            Operation::ClearComment => comments
                .clear(path)
                .map(|()| (RecordKind::Cleared, Payload::Empty)),
            Operation::Search(query) => {
                return SearchEngine::new(self.store, query).evaluate(path).into();
            }
        };

        match result {
            Ok((kind, payload)) => Record::new(path, kind, payload),
            Err(err) => Record::errored(path, err),
        }
    }
}
