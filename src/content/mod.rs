//! Content module - handles posts, metadata headers and markdown rendering

pub mod loader;
mod markdown;
mod metadata;
mod post;

pub use markdown::MarkdownRenderer;
pub use metadata::{parse_metadata, split_header};
pub use post::Post;
