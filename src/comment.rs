//! Comment mutations on a single path.

use crate::store::{AttrBackend, AttrError, AttributeStore};
use std::path::Path;

pub struct CommentEditor<'a, B> {
    store: &'a AttributeStore<B>,
}

impl<'a, B: AttrBackend> CommentEditor<'a, B> {
    pub fn new(store: &'a AttributeStore<B>) -> Self {
        Self { store }
    }

    /// Write the comment, even when it equals the stored value.
    pub fn set(&self, path: &Path, text: &str) -> Result<(), AttrError> {
        self.store.write_comment(path, text)
    }

    /// Remove the comment. A missing comment is not an error.
    pub fn clear(&self, path: &Path) -> Result<(), AttrError> {
        self.store.clear_comment(path)
    }
}
