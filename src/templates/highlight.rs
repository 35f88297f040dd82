//! Placeholder highlighting for the template editor
//!
//! Splits Tera template text into plain text, `{{ ... }}` expressions,
//! `{% ... %}` tags and `{# ... #}` comments. An opener without its closer
//! stays part of the surrounding text.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Text,
    Variable,
    Tag,
    Comment,
}

/// A slice of the input with its byte range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

fn delimiter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}|\{#.*?#\}").expect("valid regex")
    })
}

/// Split `text` into highlight segments covering the whole input in order
pub fn highlight(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for m in delimiter_pattern().find_iter(text) {
        if m.start() > cursor {
            segments.push(Segment {
                kind: SegmentKind::Text,
                start: cursor,
                end: m.start(),
                text: &text[cursor..m.start()],
            });
        }

        let kind = match &m.as_str()[..2] {
            "{{" => SegmentKind::Variable,
            "{%" => SegmentKind::Tag,
            _ => SegmentKind::Comment,
        };
        segments.push(Segment {
            kind,
            start: m.start(),
            end: m.end(),
            text: m.as_str(),
        });
        cursor = m.end();
    }

    if cursor < text.len() {
        segments.push(Segment {
            kind: SegmentKind::Text,
            start: cursor,
            end: text.len(),
            text: &text[cursor..],
        });
    }

    segments
}

/// Base names of context variables referenced by the template, sorted.
///
/// Covers `{{ var }}`, `{{ var.field | filter }}`, `{% for x in var %}` and
/// `{% if var %}`. Loop variables are reported as used too.
pub fn variable_names(text: &str) -> Vec<String> {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        [
            Regex::new(r"\{\{-?\s*([a-zA-Z_][a-zA-Z0-9_]*)").expect("valid regex"),
            Regex::new(r"\{%-?\s*for\s+\w+\s+in\s+([a-zA-Z_][a-zA-Z0-9_]*)").expect("valid regex"),
            Regex::new(r"\{%-?\s*(?:el)?if\s+(?:not\s+)?([a-zA-Z_][a-zA-Z0-9_]*)")
                .expect("valid regex"),
        ]
    });

    let mut names = BTreeSet::new();
    for pattern in patterns.iter() {
        for cap in pattern.captures_iter(text) {
            if let Some(name) = cap.get(1) {
                names.insert(name.as_str().to_string());
            }
        }
    }
    names.into_iter().collect()
}
