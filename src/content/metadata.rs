//! Post metadata headers
//!
//! A post may start with an HTML comment holding its metadata:
//!
//! ```text
//! <!--
//! [metadata]
//! title: Hello World
//! -->
//! ```

use crate::config::parse_sections;
use crate::Metadata;

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Section of the header that holds post metadata
const METADATA_SECTION: &str = "metadata";

/// Split the leading metadata comment off `source`.
///
/// Returns the body with the comment removed and the local metadata. When
/// there is no leading comment, or it is never closed, the source is
/// returned unchanged with empty metadata.
pub fn split_header(source: &str) -> (&str, Metadata) {
    let trimmed = source.trim_start();
    let Some(rest) = trimmed.strip_prefix(COMMENT_OPEN) else {
        return (source, Metadata::new());
    };
    let Some(end) = rest.find(COMMENT_CLOSE) else {
        return (source, Metadata::new());
    };

    let header = &rest[..end];
    let body = rest[end + COMMENT_CLOSE.len()..].trim_start_matches(['\n', '\r']);

    (body, parse_header(header))
}

/// Parse header text. Entries before any section header and entries in the
/// `[metadata]` section are kept; malformed lines are skipped.
fn parse_header(header: &str) -> Metadata {
    let (mut sections, malformed) = parse_sections(header);
    if !malformed.is_empty() {
        tracing::debug!("Skipping malformed metadata lines {:?}", malformed);
    }

    let mut metadata = sections.shift_remove("").unwrap_or_default();
    if let Some(section) = sections.shift_remove(METADATA_SECTION) {
        metadata.extend(section);
    }
    metadata
}

/// Parse a post's metadata header and merge it with global metadata.
///
/// Global values always overwrite local ones on key collision.
pub fn parse_metadata<'a>(source: &'a str, global: &Metadata) -> (&'a str, Metadata) {
    let (body, mut metadata) = split_header(source);
    for (key, value) in global {
        metadata.insert(key.clone(), value.clone());
    }
    (body, metadata)
}
