use super::backend::AttrBackend;
use super::errors::AttrError;
use crate::codec::{self, TagSet};
use std::path::Path;

/// Attribute holding the comma-joined tag set.
pub const TAGS_ATTR: &str = "user.xdg.tags";
/// Attribute holding the free-text comment.
pub const COMMENT_ATTR: &str = "user.xdg.comment";

/// One attribute from [`AttributeStore::list_attrs`].
#[derive(Debug)]
pub struct AttrEntry {
    pub name: String,
    /// Value decoded lossily, or the failure reading this attribute alone.
    pub value: Result<String, AttrError>,
}

/// The two filetags attributes over any [`AttrBackend`].
///
/// An absent attribute is a normal state: no tags reads as an empty
/// [`TagSet`], no comment reads as `None`. Only real I/O failures and
/// undecodable values are errors.
#[derive(Debug, Clone, Default)]
pub struct AttributeStore<B> {
    backend: B,
}

impl<B: AttrBackend> AttributeStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn read_tags(&self, path: &Path) -> Result<TagSet, AttrError> {
        match self.get(path, TAGS_ATTR)? {
            Some(bytes) => codec::decode_tags(&bytes).map_err(|source| AttrError::Decode {
                path: path.to_path_buf(),
                attr: TAGS_ATTR.to_string(),
                source,
            }),
            None => {
                tracing::trace!(path = %path.display(), "no tags attribute");
                Ok(TagSet::new())
            }
        }
    }

    /// Store `tags`, removing the attribute instead when the set is empty.
    pub fn write_tags(&self, path: &Path, tags: &TagSet) -> Result<(), AttrError> {
        if tags.is_empty() {
            return self.clear_tags(path);
        }
        self.backend
            .set(path, TAGS_ATTR, &codec::encode_tags(tags))
            .map_err(|err| AttrError::io(path, TAGS_ATTR, err))
    }

    pub fn clear_tags(&self, path: &Path) -> Result<(), AttrError> {
        self.remove(path, TAGS_ATTR)
    }

    pub fn read_comment(&self, path: &Path) -> Result<Option<String>, AttrError> {
        let Some(bytes) = self.get(path, COMMENT_ATTR)? else {
            return Ok(None);
        };
        codec::decode_comment(&bytes)
            .map(Some)
            .map_err(|source| AttrError::Decode {
                path: path.to_path_buf(),
                attr: COMMENT_ATTR.to_string(),
                source,
            })
    }

    /// Store a comment. An empty string is written, not removed.
    pub fn write_comment(&self, path: &Path, comment: &str) -> Result<(), AttrError> {
        self.backend
            .set(path, COMMENT_ATTR, &codec::encode_comment(comment))
            .map_err(|err| AttrError::io(path, COMMENT_ATTR, err))
    }

    pub fn clear_comment(&self, path: &Path) -> Result<(), AttrError> {
        self.remove(path, COMMENT_ATTR)
    }

    /// Every attribute on `path`, sorted by name, values decoded lossily.
    ///
    /// Only a failure to list the names fails the whole path. A value that
    /// cannot be read is kept as an `Err` entry and the rest are still read;
    /// an attribute that disappears between listing and reading is skipped.
    pub fn list_attrs(&self, path: &Path) -> Result<Vec<AttrEntry>, AttrError> {
        let mut names = self
            .backend
            .list(path)
            .map_err(|err| AttrError::io(path, "attribute list", err))?;
        names.sort();

        let mut attrs = Vec::with_capacity(names.len());
        for name in names {
            let value = match self.get(path, &name) {
                Ok(Some(value)) => Ok(String::from_utf8_lossy(&value).into_owned()),
                Ok(None) => continue,
                Err(err) => {
                    tracing::debug!(
                        path = %path.display(),
                        name = %name,
                        %err,
                        "attribute unreadable"
                    );
                    Err(err)
                }
            };
            attrs.push(AttrEntry { name, value });
        }
        Ok(attrs)
    }

    fn get(&self, path: &Path, attr: &str) -> Result<Option<Vec<u8>>, AttrError> {
        self.backend
            .get(path, attr)
            .map_err(|err| AttrError::io(path, attr, err))
    }

    fn remove(&self, path: &Path, attr: &str) -> Result<(), AttrError> {
        self.backend
            .remove(path, attr)
            .map_err(|err| AttrError::io(path, attr, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{IoKind, MemBackend};
    use std::io;

    fn store() -> AttributeStore<MemBackend> {
        AttributeStore::new(MemBackend::new())
    }

    #[test]
    fn test_absent_tags_read_empty() {
        let store = store();
        assert!(store.read_tags(Path::new("/f")).unwrap().is_empty());
    }

    #[test]
    fn test_write_then_read_tags() {
        let store = store();
        let path = Path::new("/f");
        let tags = TagSet::try_from_tags(["script", "python"]).unwrap();
        store.write_tags(path, &tags).unwrap();

        assert_eq!(store.read_tags(path).unwrap(), tags);
        assert_eq!(
            store.backend().raw(path, TAGS_ATTR),
            Some(b"python,script".to_vec())
        );
    }

    #[test]
    fn test_write_empty_tags_removes_attribute() {
        let store = store();
        let path = Path::new("/f");
        store
            .write_tags(path, &TagSet::try_from_tags(["a"]).unwrap())
            .unwrap();
        store.write_tags(path, &TagSet::new()).unwrap();

        assert_eq!(store.backend().raw(path, TAGS_ATTR), None);
        assert!(store.backend().list(path).unwrap().is_empty());
    }

    #[test]
    fn test_clear_tags_then_read_is_empty() {
        let store = store();
        let path = Path::new("/f");
        store.clear_tags(path).unwrap();
        store
            .write_tags(path, &TagSet::try_from_tags(["a", "b"]).unwrap())
            .unwrap();
        store.clear_tags(path).unwrap();
        assert!(store.read_tags(path).unwrap().is_empty());
    }

    #[test]
    fn test_empty_comment_is_distinct_from_absent() {
        let store = store();
        let path = Path::new("/f");
        assert_eq!(store.read_comment(path).unwrap(), None);

        store.write_comment(path, "").unwrap();
        assert_eq!(store.read_comment(path).unwrap(), Some(String::new()));

        store.clear_comment(path).unwrap();
        assert_eq!(store.read_comment(path).unwrap(), None);
        // Clearing again is not an error.
        store.clear_comment(path).unwrap();
    }

    #[test]
    fn test_malformed_tags_are_decode_errors() {
        let store = store();
        let path = Path::new("/f");
        store.backend().set(path, TAGS_ATTR, &[0xff, 0xfe]).unwrap();
        let err = store.read_tags(path).unwrap_err();
        assert!(matches!(err, AttrError::Decode { .. }));
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn test_backend_failure_is_classified() {
        let store = store();
        let path = Path::new("/locked");
        store
            .backend()
            .fail_path(path, io::ErrorKind::PermissionDenied);
        let err = store.read_comment(path).unwrap_err();
        assert_eq!(err.kind(), Some(IoKind::PermissionDenied));
        assert!(err.to_string().contains(COMMENT_ATTR));
    }

    #[test]
    fn test_list_attrs_sorted_with_values() {
        let store = store();
        let path = Path::new("/f");
        store.write_comment(path, "hello").unwrap();
        store
            .write_tags(path, &TagSet::try_from_tags(["t"]).unwrap())
            .unwrap();
        store.backend().set(path, "user.other", &[0xff]).unwrap();

        let attrs = store.list_attrs(path).unwrap();
        let names: Vec<_> = attrs.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["user.other", COMMENT_ATTR, TAGS_ATTR]);
        assert_eq!(attrs[1].value.as_deref().unwrap(), "hello");
        assert_eq!(attrs[0].value.as_deref().unwrap(), "\u{fffd}");
    }

    #[test]
    fn test_list_attrs_keeps_going_past_unreadable_value() {
        let store = store();
        let path = Path::new("/f");
        store.write_comment(path, "hello").unwrap();
        store
            .write_tags(path, &TagSet::try_from_tags(["t"]).unwrap())
            .unwrap();
        store
            .backend()
            .fail_attr(path, COMMENT_ATTR, io::ErrorKind::PermissionDenied);

        let attrs = store.list_attrs(path).unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name, COMMENT_ATTR);
        let err = attrs[0].value.as_ref().unwrap_err();
        assert_eq!(err.kind(), Some(IoKind::PermissionDenied));
        assert_eq!(attrs[1].name, TAGS_ATTR);
        assert_eq!(attrs[1].value.as_deref().unwrap(), "t");
    }

    #[test]
    fn test_list_attrs_fails_when_names_unreadable() {
        let store = store();
        let path = Path::new("/locked");
        store
            .backend()
            .fail_path(path, io::ErrorKind::PermissionDenied);
        assert!(store.list_attrs(path).is_err());
    }
}
