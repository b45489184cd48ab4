//! Typed access to the tag and comment attributes.
//!
//! [`AttributeStore`] speaks in [`TagSet`](crate::codec::TagSet)s and
//! comments; the raw get/set/remove/list primitive sits behind the
//! [`AttrBackend`] trait so the same logic runs against real extended
//! attributes ([`OsBackend`]) or an in-memory map ([`MemBackend`]).

pub mod attributes;
pub mod backend;
pub mod errors;
pub mod memory;
pub mod os;

pub use attributes::{AttrEntry, AttributeStore, COMMENT_ATTR, TAGS_ATTR};
pub use backend::AttrBackend;
pub use errors::{AttrError, IoKind};
pub use memory::MemBackend;
pub use os::OsBackend;
