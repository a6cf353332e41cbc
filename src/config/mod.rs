//! Configuration module

mod ini;
mod site;

pub use ini::{parse_sections, Line, Sections};
pub use site::{ConfigError, SiteConfig};
