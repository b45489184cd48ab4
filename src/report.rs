//! Per-path result records and the overall exit status.

use crate::codec::TagSet;
use crate::error::PathError;
use crate::search::{Evaluation, FieldValue};
use crate::store::AttrEntry;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Listed,
    Set,
    Cleared,
    Matched,
    NotMatched,
    Errored,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RecordKind::Listed => "listed",
            RecordKind::Set => "set",
            RecordKind::Cleared => "cleared",
            RecordKind::Matched => "matched",
            RecordKind::NotMatched => "not matched",
            RecordKind::Errored => "errored",
        };
        f.write_str(text)
    }
}

/// What a record carries for display.
#[derive(Debug)]
pub enum Payload {
    /// Nothing beyond the path (clears).
    Empty,
    Tags(TagSet),
    Comment(Option<String>),
    Attrs(Vec<AttrEntry>),
    Error(PathError),
}

impl From<FieldValue> for Payload {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Tags(tags) => Payload::Tags(tags),
            FieldValue::Comment(comment) => Payload::Comment(comment),
        }
    }
}

#[derive(Debug)]
pub struct Record {
    pub path: PathBuf,
    pub kind: RecordKind,
    pub payload: Payload,
}

impl Record {
    pub fn new(path: impl Into<PathBuf>, kind: RecordKind, payload: Payload) -> Self {
        Self {
            path: path.into(),
            kind,
            payload,
        }
    }

    pub fn errored(path: impl Into<PathBuf>, error: impl Into<PathError>) -> Self {
        Self::new(path, RecordKind::Errored, Payload::Error(error.into()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn error(&self) -> Option<&PathError> {
        match &self.payload {
            Payload::Error(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Evaluation> for Record {
    fn from(evaluation: Evaluation) -> Self {
        match evaluation {
            Evaluation::Matched(found) => {
                Record::new(found.path, RecordKind::Matched, found.value.into())
            }
            Evaluation::NotMatched(found) => {
                Record::new(found.path, RecordKind::NotMatched, found.value.into())
            }
            Evaluation::Errored { path, error } => Record::errored(path, error),
        }
    }
}

/// Finished result of one invocation.
///
/// Records stay in candidate order. The report can be iterated any number of
/// times after evaluation is complete.
#[derive(Debug, Default)]
pub struct Report {
    search: bool,
    records: Vec<Record>,
}

impl Report {
    pub fn new(search: bool) -> Self {
        Self {
            search,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn match_count(&self) -> usize {
        self.count(RecordKind::Matched)
    }

    pub fn error_count(&self) -> usize {
        self.count(RecordKind::Errored)
    }

    /// No per-path errors and, for a search, at least one match.
    pub fn success(&self) -> bool {
        self.error_count() == 0 && (!self.search || self.match_count() > 0)
    }

    pub fn exit_status(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }

    fn count(&self, kind: RecordKind) -> usize {
        self.records.iter().filter(|rec| rec.kind == kind).count()
    }
}

impl Extend<Record> for Report {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
