//! Small string helpers shared across the crate

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex =
        Regex::new(r"[^a-zA-Z0-9\s]").expect("name filter pattern is valid");
}

/// Simple HTML escaping
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Turn a site or post name into a path component.
///
/// Everything except ASCII letters, digits and whitespace is deleted, then
/// the remaining words are joined by hyphens and lowercased.
///
/// # Examples
/// ```
/// assert_eq!(flux::helpers::name_to_path("Hello, World!"), "hello-world");
/// ```
pub fn name_to_path(name: &str) -> String {
    NON_WORD
        .replace_all(name, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
