//! Terminal formatting of report records.
//!
//! Rendering never looks at global state: whether to colour is decided once
//! by the caller and carried in [`Style`].

use crate::codec::TagSet;
use crate::mode::Operation;
use crate::report::{Payload, Record, RecordKind, Report};
use crate::store::AttrEntry;
use colored::{Color, Colorize};
use std::path::Path;

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, Default)]
pub struct Style {
    pub color: bool,
}

/// One rendered piece of output and the stream it belongs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Out(String),
    Err(String),
}

pub struct Renderer {
    style: Style,
    names_only: bool,
    label: Option<&'static str>,
    search_noun: Option<&'static str>,
}

impl Renderer {
    pub fn new(operation: &Operation, style: Style, names_only: bool) -> Self {
        let label = match operation {
            Operation::AddTags(_) | Operation::RemoveTags(_) => Some("Set tags for"),
            Operation::ClearTags => Some("Cleared tags for"),
            Operation::SetComment(_) => Some("Set comment for"),
            Operation::ClearComment => Some("Cleared comment for"),
            _ => None,
        };
        let search_noun = match operation {
            Operation::Search(query) => Some(query.field.noun()),
            _ => None,
        };
        Self {
            style,
            names_only,
            label,
            search_noun,
        }
    }

    /// Render a record, or `None` when it produces no output.
    pub fn record(&self, record: &Record) -> Option<Line> {
        if let Some(err) = record.error() {
            return Some(Line::Err(self.paint(&err.to_string(), Color::Red)));
        }
        match record.kind {
            RecordKind::NotMatched => None,
            RecordKind::Matched if self.names_only => {
                Some(Line::Out(record.path.display().to_string()))
            }
            RecordKind::Cleared => Some(Line::Out(self.file_name(&record.path, self.label))),
            _ => Some(Line::Out(self.with_payload(record))),
        }
    }

    /// The closing "Found N tags." line of a search.
    pub fn summary(&self, report: &Report) -> Option<String> {
        let noun = self.search_noun?;
        if self.names_only {
            return None;
        }
        let total = report.match_count();
        let plural = if total == 1 { "" } else { "s" };
        if !self.style.color {
            return Some(format!("\nFound {total} {noun}{plural}."));
        }
        Some(format!(
            "\n{} {} {}.",
            "Found".cyan(),
            total.to_string().blue().bold(),
            format!("{noun}{plural}").cyan()
        ))
    }

    /// Render the whole report in order, summary last.
    pub fn lines(&self, report: &Report) -> Vec<Line> {
        let mut lines: Vec<Line> = report.iter().filter_map(|rec| self.record(rec)).collect();
        if let Some(summary) = self.summary(report) {
            lines.push(Line::Out(summary));
        }
        lines
    }

    fn with_payload(&self, record: &Record) -> String {
        let label = match record.kind {
            RecordKind::Set => self.label,
            _ => None,
        };
        let body = match &record.payload {
            Payload::Tags(tags) => self.tags(tags),
            Payload::Comment(comment) => self.comment(comment.as_deref()),
            Payload::Attrs(attrs) => self.attrs(attrs),
            Payload::Empty | Payload::Error(_) => return self.file_name(&record.path, label),
        };
        format!("{}:\n{INDENT}{}", self.file_name(&record.path, label), body)
    }

    fn file_name(&self, path: &Path, label: Option<&str>) -> String {
        let name = path.display().to_string();
        let name = if !self.style.color {
            name
        } else if path.is_dir() {
            name.blue().bold().to_string()
        } else {
            name.blue().to_string()
        };
        match label {
            Some(label) => format!("{label} {name}"),
            None => name,
        }
    }

    fn tags(&self, tags: &TagSet) -> String {
        if tags.is_empty() {
            return self.none();
        }
        tags.iter()
            .map(|tag| self.paint(tag, Color::Cyan))
            .collect::<Vec<_>>()
            .join(&format!("\n{INDENT}"))
    }

    fn comment(&self, comment: Option<&str>) -> String {
        match comment {
            None => self.none(),
            Some("") => self.marker("empty"),
            Some(text) => text
                .lines()
                .collect::<Vec<_>>()
                .join(&format!("\n{INDENT}")),
        }
    }

    fn attrs(&self, attrs: &[AttrEntry]) -> String {
        if attrs.is_empty() {
            return self.none();
        }
        attrs
            .iter()
            .map(|entry| {
                let name = format!("{:>24}", entry.name);
                let value = match &entry.value {
                    Ok(value) => self.paint(value, Color::Cyan),
                    Err(err) => self.marker(&format!("error: {err}")),
                };
                format!("{}: {}", self.paint(&name, Color::Green), value)
            })
            .collect::<Vec<_>>()
            .join(&format!("\n{INDENT}"))
    }

    fn none(&self) -> String {
        self.marker("none")
    }

    fn marker(&self, word: &str) -> String {
        if self.style.color {
            format!("({})", word.red().bold())
        } else {
            format!("({word})")
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.style.color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }
}
