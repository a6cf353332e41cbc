//! Flat HTML templates
//!
//! Templates contain two kinds of placeholder, both written as a single
//! brace pair with no braces inside:
//!
//! - `{@relative/path}` pulls in another file (see [`TemplateResolver`])
//! - `{key}` is replaced by a metadata value (see [`build`])
//!
//! There is no escape for literal braces.

mod builder;
mod include;

use std::path::PathBuf;

use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;

pub use builder::{build, Rendered};
pub use include::TemplateResolver;

lazy_static! {
    /// `{...}` with no brace inside; capture 1 is the inner text
    pub(crate) static ref PLACEHOLDER: Regex =
        Regex::new(r"\{([^{}]*)\}").expect("placeholder pattern is valid");
}

/// Template errors that abort a build
#[derive(thiserror::Error, Debug)]
pub enum TemplateError {
    #[error("circular include: {}", format_chain(.chain))]
    CircularInclude { chain: Vec<PathBuf> },

    #[error("failed to read template {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Unique placeholder spans, braces included, in first-seen order
pub fn placeholders(text: &str) -> IndexSet<&str> {
    PLACEHOLDER.find_iter(text).map(|m| m.as_str()).collect()
}

/// The path of an inclusion placeholder (`{@path}`), or `None` for a
/// substitution placeholder
pub fn include_path(span: &str) -> Option<&str> {
    span.strip_prefix("{@")?.strip_suffix('}')
}
