//! Tag mutations on a single path.

use crate::codec::{parse_tag_args, TagSet};
use crate::store::{AttrBackend, AttrError, AttributeStore};
use std::path::Path;

/// Outcome of an add or remove.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "TagChange carries the final tag set for reporting"]
pub struct TagChange {
    /// Tag set after the edit.
    pub tags: TagSet,
    /// Whether the attribute was written. `false` when the edit was a no-op.
    pub written: bool,
}

pub struct TagEditor<'a, B> {
    store: &'a AttributeStore<B>,
}

impl<'a, B: AttrBackend> TagEditor<'a, B> {
    pub fn new(store: &'a AttributeStore<B>) -> Self {
        Self { store }
    }

    /// Union `tags` into the path's tag set.
    ///
    /// Each argument is split on commas and trimmed; empty tokens are
    /// dropped, so `["a,b", " c "]` adds `a`, `b` and `c`.
    pub fn add<S: AsRef<str>>(&self, path: &Path, tags: &[S]) -> Result<TagChange, AttrError> {
        let mut current = self.store.read_tags(path)?;
        let mut changed = false;
        for tag in parse_tag_args(tags) {
            // Parsed tokens are non-empty and comma-free, so insert cannot fail.
            changed |= matches!(current.insert(tag), Ok(true));
        }
        self.finish(path, current, changed)
    }

    /// Remove `tags` from the path's tag set. Arguments are parsed like
    /// [`add`](Self::add); absent tags are ignored.
    pub fn remove<S: AsRef<str>>(&self, path: &Path, tags: &[S]) -> Result<TagChange, AttrError> {
        let mut current = self.store.read_tags(path)?;
        let mut changed = false;
        for tag in parse_tag_args(tags) {
            if current.remove(&tag) {
                changed = true;
            } else {
                tracing::debug!(path = %path.display(), tag = %tag, "tag not present");
            }
        }
        self.finish(path, current, changed)
    }

    /// Remove the tags attribute, whatever its prior state.
    pub fn clear(&self, path: &Path) -> Result<(), AttrError> {
        self.store.clear_tags(path)
    }

    fn finish(&self, path: &Path, tags: TagSet, changed: bool) -> Result<TagChange, AttrError> {
        if !changed {
            tracing::debug!(path = %path.display(), tags = %tags, "tags unchanged, skipping write");
            return Ok(TagChange {
                tags,
                written: false,
            });
        }
        self.store.write_tags(path, &tags)?;
        Ok(TagChange {
            tags,
            written: true,
        })
    }
}
