//! Section / key-value text format shared by `site.cfg` and post headers
//!
//! ```text
//! ; comment
//! [config]
//! port = 5555
//! post_div_id: post
//! motto = first line
//!     second line
//! ```
//!
//! An indented line directly below an entry continues that entry's value.
//! Text after the closing `]` of a section header is ignored.

use indexmap::IndexMap;

use crate::Metadata;

/// Parsed sections, keyed by section name. Entries that appear before any
/// `[section]` header are stored under the empty name.
pub type Sections = IndexMap<String, Metadata>;

/// Classification of a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// Empty line or `;` / `#` comment
    Blank,
    /// `[name]` header
    Section(&'a str),
    /// `key = value` or `key: value`
    Entry(&'a str, &'a str),
    /// Anything else
    Malformed,
}

impl<'a> Line<'a> {
    /// Classify a raw line. The first `:` or `=` separates key from value,
    /// so values may themselves contain either character.
    pub fn classify(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
            return Line::Blank;
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            if let Some(end) = rest.rfind(']') {
                return Line::Section(rest[..end].trim());
            }
        }

        match trimmed.find([':', '=']) {
            Some(pos) => {
                let key = trimmed[..pos].trim();
                if key.is_empty() {
                    Line::Malformed
                } else {
                    Line::Entry(key, trimmed[pos + 1..].trim())
                }
            }
            None => Line::Malformed,
        }
    }
}

/// Parse text into sections.
///
/// Returns the sections together with the 1-based line numbers of every
/// malformed line; callers decide whether those are fatal.
pub fn parse_sections(text: &str) -> (Sections, Vec<usize>) {
    let mut sections = Sections::new();
    let mut malformed = Vec::new();
    let mut current = String::new();
    // Key of the entry an indented line would continue
    let mut last_key: Option<String> = None;

    for (idx, raw) in text.lines().enumerate() {
        let indented = raw.starts_with([' ', '\t']);
        if let (true, Some(key)) = (indented, &last_key) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() && !trimmed.starts_with([';', '#']) {
                if let Some(value) = sections
                    .get_mut(&current)
                    .and_then(|section| section.get_mut(key))
                {
                    value.push('\n');
                    value.push_str(trimmed);
                }
                continue;
            }
        }

        match Line::classify(raw) {
            Line::Blank => {
                // Comments do not end a continued value
                if raw.trim().is_empty() {
                    last_key = None;
                }
            }
            Line::Section(name) => {
                current = name.to_string();
                last_key = None;
                sections.entry(current.clone()).or_insert_with(IndexMap::new);
            }
            Line::Entry(key, value) => {
                sections
                    .entry(current.clone())
                    .or_insert_with(IndexMap::new)
                    .insert(key.to_string(), value.to_string());
                last_key = Some(key.to_string());
            }
            Line::Malformed => {
                last_key = None;
                malformed.push(idx + 1);
            }
        }
    }

    (sections, malformed)
}
