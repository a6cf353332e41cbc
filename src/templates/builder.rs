//! Metadata substitution: replaces `{key}` placeholders

use indexmap::IndexSet;

use super::PLACEHOLDER;
use crate::Metadata;

/// A built template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Template output
    pub html: String,
    /// Keys that had no metadata value, once each in first-seen order
    pub missing: Vec<String>,
}

/// Substitute metadata into a resolved template.
///
/// Each `{key}` span, braces included, becomes the raw metadata value. Spans
/// whose key is absent become empty and are reported once per call with a
/// warning. Substituted values are not scanned again, so a value may safely
/// contain braces.
pub fn build(template: &str, metadata: &Metadata) -> Rendered {
    let mut missing: IndexSet<String> = IndexSet::new();

    let html = PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            let key = &caps[1];
            match metadata.get(key) {
                Some(value) => value.clone(),
                None => {
                    missing.insert(key.to_string());
                    String::new()
                }
            }
        })
        .into_owned();

    for key in &missing {
        tracing::warn!("No metadata value for '{{{}}}', substituting an empty string", key);
    }

    Rendered {
        html,
        missing: missing.into_iter().collect(),
    }
}
