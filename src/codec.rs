//! Canonical byte encoding for the tag set and the comment.
//!
//! Tags are stored as one UTF-8 string: the unique tags, sorted, joined with
//! `,`. The comment is stored as raw UTF-8 with no framing at all.

use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Delimiter between tags in the stored attribute value.
pub const TAG_DELIMITER: char = ',';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("attribute value is not valid UTF-8: {0}")]
pub struct DecodeError(#[from] std::string::FromUtf8Error);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("tag must not be empty")]
    Empty,

    #[error("tag must not contain '{TAG_DELIMITER}': {0:?}")]
    ContainsDelimiter(String),
}

/// A sorted, duplicate-free set of tags.
///
/// Every member is non-empty and free of [`TAG_DELIMITER`]. Iteration is
/// always lexicographic, independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TagSet {
    tags: BTreeSet<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set, failing on the first empty or delimiter-bearing tag.
    pub fn try_from_tags<I, S>(tags: I) -> Result<Self, TagError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for tag in tags {
            set.insert(tag)?;
        }
        Ok(set)
    }

    /// Insert a tag. Returns `true` if it was not already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> Result<bool, TagError> {
        let tag = tag.into();
        validate_tag(&tag)?;
        Ok(self.tags.insert(tag))
    }

    /// Remove a tag. Returns `true` if it was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, tag) in self.iter().enumerate() {
            if idx > 0 {
                write!(f, "{TAG_DELIMITER}")?;
            }
            f.write_str(tag)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

fn validate_tag(tag: &str) -> Result<(), TagError> {
    if tag.is_empty() {
        return Err(TagError::Empty);
    }
    if tag.contains(TAG_DELIMITER) {
        return Err(TagError::ContainsDelimiter(tag.to_string()));
    }
    Ok(())
}

/// Encode a tag set into its stored form. The empty set encodes to no bytes.
pub fn encode_tags(tags: &TagSet) -> Vec<u8> {
    tags.to_string().into_bytes()
}

/// Decode a stored tag value.
///
/// Zero-length tokens are discarded and duplicates collapse. Tokens are kept
/// verbatim, surrounding whitespace included.
pub fn decode_tags(bytes: &[u8]) -> Result<TagSet, DecodeError> {
    let text = String::from_utf8(bytes.to_vec())?;
    let tags = text
        .split(TAG_DELIMITER)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();
    Ok(TagSet { tags })
}

pub fn encode_comment(comment: &str) -> Vec<u8> {
    comment.as_bytes().to_vec()
}

pub fn decode_comment(bytes: &[u8]) -> Result<String, DecodeError> {
    Ok(String::from_utf8(bytes.to_vec())?)
}

/// Parse tags given on the command line.
///
/// Each argument may hold several comma-separated tags. Tokens are trimmed,
/// empty tokens dropped, and the first occurrence of each tag wins.
pub fn parse_tag_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut tags = Vec::new();
    for arg in args {
        for token in arg.as_ref().split(TAG_DELIMITER) {
            let token = token.trim();
            if !token.is_empty() && seen.insert(token) {
                tags.push(token.to_string());
            }
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_sorts_and_joins() {
        let tags = TagSet::try_from_tags(["test", "python", "script"]).unwrap();
        assert_eq!(encode_tags(&tags), b"python,script,test".to_vec());
    }

    #[test]
    fn test_encode_empty_set() {
        assert!(encode_tags(&TagSet::new()).is_empty());
    }

    #[test]
    fn test_decode_drops_empty_tokens_and_duplicates() {
        let tags = decode_tags(b",b,,a,b,").unwrap();
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_decode_keeps_whitespace_and_unicode() {
        let tags = decode_tags(" spaced ,caf\u{e9}".as_bytes()).unwrap();
        assert!(tags.contains(" spaced "));
        assert!(tags.contains("caf\u{e9}"));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        assert!(decode_tags(&[0x66, 0xff, 0x6f]).is_err());
        assert!(decode_comment(&[0xc3]).is_err());
    }

    #[test]
    fn test_insert_rejects_invalid_tags() {
        let mut tags = TagSet::new();
        assert_eq!(tags.insert(""), Err(TagError::Empty));
        assert!(matches!(
            tags.insert("a,b"),
            Err(TagError::ContainsDelimiter(_))
        ));
        assert_eq!(tags.insert("a"), Ok(true));
        assert_eq!(tags.insert("a"), Ok(false));
    }

    #[test]
    fn test_comment_keeps_newlines() {
        let comment = "first line\nsecond, with comma\n";
        assert_eq!(decode_comment(&encode_comment(comment)).unwrap(), comment);
    }

    #[test]
    fn test_parse_tag_args() {
        let args = ["python, script", " ,test,python", ""];
        assert_eq!(parse_tag_args(&args), vec!["python", "script", "test"]);
        assert!(parse_tag_args(&[" , "]).is_empty());
    }

    fn tag_strategy() -> impl Strategy<Value = String> {
        "[^,]{1,12}"
    }

    proptest! {
        #[test]
        fn prop_tags_round_trip(tags in proptest::collection::btree_set(tag_strategy(), 0..8)) {
            let set = TagSet::try_from_tags(tags).unwrap();
            prop_assert_eq!(decode_tags(&encode_tags(&set)).unwrap(), set);
        }

        #[test]
        fn prop_comment_round_trip(comment in any::<String>()) {
            prop_assert_eq!(decode_comment(&encode_comment(&comment)).unwrap(), comment);
        }

        #[test]
        fn prop_encoding_ignores_insertion_order(mut tags in proptest::collection::vec(tag_strategy(), 0..8)) {
            let forward = TagSet::try_from_tags(tags.clone()).unwrap();
            tags.reverse();
            let backward = TagSet::try_from_tags(tags).unwrap();
            prop_assert_eq!(encode_tags(&forward), encode_tags(&backward));
        }
    }
}
