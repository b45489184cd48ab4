//! Pattern search over tags or comments.
//!
//! Each candidate goes `Evaluating -> {Matched, NotMatched, Errored}` in
//! candidate order; nothing is reordered or ranked. A read failure on one
//! path is recorded and the scan moves on.

use crate::codec::TagSet;
use crate::store::{AttrBackend, AttrError, AttributeStore};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

/// How the search text is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    #[default]
    Regex,
    /// Plain substring; every regex metacharacter is escaped.
    Literal,
}

/// A compiled search pattern. Matching is an unanchored search.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn compile(source: &str, mode: MatchMode) -> Result<Self, regex::Error> {
        let regex = match mode {
            MatchMode::Regex => Regex::new(source)?,
            MatchMode::Literal => Regex::new(&regex::escape(source))?,
        };
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchField {
    #[default]
    Tags,
    Comment,
}

impl SearchField {
    /// Singular noun for summaries ("tag", "comment").
    pub fn noun(self) -> &'static str {
        match self {
            SearchField::Tags => "tag",
            SearchField::Comment => "comment",
        }
    }
}

/// The field value a search was evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Tags(TagSet),
    Comment(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub path: PathBuf,
    pub value: FieldValue,
    /// Match result with `reverse` already applied.
    pub matched: bool,
}

#[derive(Debug)]
pub enum Evaluation {
    Matched(SearchMatch),
    NotMatched(SearchMatch),
    Errored { path: PathBuf, error: AttrError },
}

impl Evaluation {
    pub fn is_match(&self) -> bool {
        matches!(self, Evaluation::Matched(_))
    }

    pub fn path(&self) -> &Path {
        match self {
            Evaluation::Matched(found) | Evaluation::NotMatched(found) => &found.path,
            Evaluation::Errored { path, .. } => path,
        }
    }
}

/// What to look for and where.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub pattern: Pattern,
    pub field: SearchField,
    pub reverse: bool,
}

pub struct SearchEngine<'a, B> {
    store: &'a AttributeStore<B>,
    query: &'a SearchQuery,
}

impl<'a, B: AttrBackend> SearchEngine<'a, B> {
    pub fn new(store: &'a AttributeStore<B>, query: &'a SearchQuery) -> Self {
        Self { store, query }
    }

    /// Evaluate every path, in order.
    pub fn run<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<Evaluation> {
        paths
            .iter()
            .map(|path| self.evaluate(path.as_ref()))
            .collect()
    }

    pub fn evaluate(&self, path: &Path) -> Evaluation {
        let value = match self.read(path) {
            Ok(value) => value,
            Err(error) => {
                tracing::debug!(path = %path.display(), %error, "search read failed");
                return Evaluation::Errored {
                    path: path.to_path_buf(),
                    error,
                };
            }
        };

        let raw = self.raw_match(&value);
        let matched = raw != self.query.reverse;
        tracing::trace!(path = %path.display(), raw, matched, "evaluated");

        let found = SearchMatch {
            path: path.to_path_buf(),
            value,
            matched,
        };
        if matched {
            Evaluation::Matched(found)
        } else {
            Evaluation::NotMatched(found)
        }
    }

    fn read(&self, path: &Path) -> Result<FieldValue, AttrError> {
        match self.query.field {
            SearchField::Tags => self.store.read_tags(path).map(FieldValue::Tags),
            SearchField::Comment => self.store.read_comment(path).map(FieldValue::Comment),
        }
    }

    fn raw_match(&self, value: &FieldValue) -> bool {
        let pattern = &self.query.pattern;
        match value {
            FieldValue::Tags(tags) => tags.iter().any(|tag| pattern.is_match(tag)),
            FieldValue::Comment(Some(comment)) => pattern.is_match(comment),
            FieldValue::Comment(None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemBackend;
    use proptest::prelude::*;

    fn query(pattern: &str, field: SearchField, reverse: bool) -> SearchQuery {
        SearchQuery {
            pattern: Pattern::compile(pattern, MatchMode::Regex).unwrap(),
            field,
            reverse,
        }
    }

    fn tagged(files: &[(&str, &[&str])]) -> AttributeStore<MemBackend> {
        let store = AttributeStore::new(MemBackend::new());
        for (path, tags) in files {
            store
                .write_tags(
                    Path::new(path),
                    &TagSet::try_from_tags(tags.iter().copied()).unwrap(),
                )
                .unwrap();
        }
        store
    }

    fn matched_paths(results: &[Evaluation]) -> Vec<String> {
        results
            .iter()
            .filter(|eval| eval.is_match())
            .map(|eval| eval.path().display().to_string())
            .collect()
    }

    #[test]
    fn test_tag_search_matches_any_tag() {
        let store = tagged(&[
            ("/one", &["python", "script", "things"]),
            ("/two", &["python", "script", "other"]),
            ("/three", &["other", "stuff"]),
        ]);
        let query = query("python", SearchField::Tags, false);
        let results = SearchEngine::new(&store, &query).run(&["/one", "/two", "/three"]);

        assert_eq!(matched_paths(&results), vec!["/one", "/two"]);
        assert!(matches!(results[2], Evaluation::NotMatched(_)));
    }

    #[test]
    fn test_tag_search_does_not_match_joined_string() {
        let store = tagged(&[("/f", &["ab", "cd"])]);
        let query = query("b,c", SearchField::Tags, false);
        let results = SearchEngine::new(&store, &query).run(&["/f"]);
        assert!(matched_paths(&results).is_empty());
    }

    #[test]
    fn test_literal_mode_escapes_metacharacters() {
        let store = tagged(&[("/a", &["c++"]), ("/b", &["cpp"])]);
        let query = SearchQuery {
            pattern: Pattern::compile("c++", MatchMode::Literal).unwrap(),
            field: SearchField::Tags,
            reverse: false,
        };
        let results = SearchEngine::new(&store, &query).run(&["/a", "/b"]);
        assert_eq!(matched_paths(&results), vec!["/a"]);
        assert!(Pattern::compile("(", MatchMode::Literal).is_ok());
        assert!(Pattern::compile("(", MatchMode::Regex).is_err());
    }

    #[test]
    fn test_comment_search() {
        let store = AttributeStore::new(MemBackend::new());
        store
            .write_comment(Path::new("/a"), "line one\nTODO: fix")
            .unwrap();
        store.write_comment(Path::new("/b"), "").unwrap();

        let query_todo = query("TODO", SearchField::Comment, false);
        let results = SearchEngine::new(&store, &query_todo).run(&["/a", "/b", "/c"]);
        assert_eq!(matched_paths(&results), vec!["/a"]);

        // An empty comment exists and matches ^$; an absent one never does.
        let query_empty = query("^$", SearchField::Comment, false);
        let results = SearchEngine::new(&store, &query_empty).run(&["/a", "/b", "/c"]);
        assert_eq!(matched_paths(&results), vec!["/b"]);
        match &results[2] {
            Evaluation::NotMatched(found) => assert_eq!(found.value, FieldValue::Comment(None)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_errors_are_excluded_and_scan_continues() {
        let store = tagged(&[("/a", &["x"]), ("/c", &["x"])]);
        store
            .backend()
            .fail_path("/b", std::io::ErrorKind::PermissionDenied);

        for reverse in [false, true] {
            let query = query("x", SearchField::Tags, reverse);
            let results = SearchEngine::new(&store, &query).run(&["/a", "/b", "/c"]);
            assert_eq!(results.len(), 3);
            assert!(matches!(results[1], Evaluation::Errored { .. }));
            assert!(!results[1].is_match());
        }
    }

    #[test]
    fn test_reverse_includes_untagged_paths() {
        let store = tagged(&[("/a", &["x"])]);
        let query = query("x", SearchField::Tags, true);
        let results = SearchEngine::new(&store, &query).run(&["/a", "/untagged"]);
        assert_eq!(matched_paths(&results), vec!["/untagged"]);
    }

    proptest! {
        #[test]
        fn prop_reverse_is_complement(
            sets in proptest::collection::vec(
                proptest::collection::btree_set("[a-d]{1,3}", 0..4), 1..8),
            pattern in "[a-d]{1,2}",
        ) {
            let store = AttributeStore::new(MemBackend::new());
            let paths: Vec<PathBuf> = (0..sets.len())
                .map(|idx| PathBuf::from(format!("/p{idx}")))
                .collect();
            for (path, tags) in paths.iter().zip(&sets) {
                store
                    .write_tags(path, &TagSet::try_from_tags(tags.iter().cloned()).unwrap())
                    .unwrap();
            }

            let forward = query(&pattern, SearchField::Tags, false);
            let backward = query(&pattern, SearchField::Tags, true);
            let fwd = SearchEngine::new(&store, &forward).run(&paths);
            let rev = SearchEngine::new(&store, &backward).run(&paths);

            for (a, b) in fwd.iter().zip(&rev) {
                prop_assert_ne!(a.is_match(), b.is_match());
            }
        }

        #[test]
        fn prop_comment_reverse_is_complement(
            comments in proptest::collection::vec(
                proptest::option::of("[a-d ]{0,6}"), 1..8),
            pattern in prop_oneof![Just("^$".to_string()), "[a-d]{1,2}"],
        ) {
            let store = AttributeStore::new(MemBackend::new());
            let paths: Vec<PathBuf> = (0..comments.len())
                .map(|idx| PathBuf::from(format!("/c{idx}")))
                .collect();
            for (path, comment) in paths.iter().zip(&comments) {
                if let Some(text) = comment {
                    store.write_comment(path, text).unwrap();
                }
            }

            let forward = query(&pattern, SearchField::Comment, false);
            let backward = query(&pattern, SearchField::Comment, true);
            let fwd = SearchEngine::new(&store, &forward).run(&paths);
            let rev = SearchEngine::new(&store, &backward).run(&paths);

            for ((a, b), comment) in fwd.iter().zip(&rev).zip(&comments) {
                prop_assert_ne!(a.is_match(), b.is_match());
                if comment.is_none() {
                    // Absent comments never match, so reverse always lists them.
                    prop_assert!(!a.is_match());
                }
            }
        }
    }
}
