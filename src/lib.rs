//! flux: a small static blog generator
//!
//! A site tree holds markdown posts, flat HTML templates, public assets and
//! a `site.cfg`. Building turns it into a `.build` directory that can be
//! deployed as-is or served locally.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use std::path::{Path, PathBuf};

pub use error::BuildError;
pub use generator::BuildOutcome;

/// Key/value metadata used to fill template placeholders
pub type Metadata = indexmap::IndexMap<String, String>;

/// Config file at the root of a site tree
pub const CONFIG_FILE: &str = "site.cfg";

/// Directories every site tree must have
const REQUIRED_DIRS: [&str; 3] = ["posts", "public", "templates"];

/// Files every site tree must have
const REQUIRED_FILES: [&str; 3] = [CONFIG_FILE, "templates/index.html", "templates/post.html"];

/// A site tree opened for building
#[derive(Debug, Clone)]
pub struct Flux {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Root of the site tree
    pub base_dir: PathBuf,
    /// Markdown posts
    pub posts_dir: PathBuf,
    /// HTML templates
    pub templates_dir: PathBuf,
    /// Assets copied verbatim
    pub public_dir: PathBuf,
    /// Build output
    pub build_dir: PathBuf,
}

impl Flux {
    /// Open the site tree at `base_dir` and load its configuration
    pub fn open<P: AsRef<Path>>(base_dir: P) -> Result<Self, BuildError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        if !Self::is_site_tree(&base_dir) {
            return Err(BuildError::NotSiteTree(base_dir));
        }

        let config = config::SiteConfig::load(base_dir.join(CONFIG_FILE))?;

        Ok(Self {
            config,
            posts_dir: base_dir.join("posts"),
            templates_dir: base_dir.join("templates"),
            public_dir: base_dir.join("public"),
            build_dir: base_dir.join(cache::BUILD_DIR),
            base_dir,
        })
    }

    /// Whether `dir` has the directories and files of a site tree
    pub fn is_site_tree<P: AsRef<Path>>(dir: P) -> bool {
        let dir = dir.as_ref();
        REQUIRED_DIRS.iter().all(|d| dir.join(d).is_dir())
            && REQUIRED_FILES.iter().all(|f| dir.join(f).is_file())
    }

    /// Whether the build output is missing or older than any source file
    pub fn needs_rebuild(&self) -> bool {
        cache::needs_rebuild(&self.base_dir)
    }

    /// Build the site if it is stale, or unconditionally with `force`
    pub fn build(&self, force: bool) -> Result<BuildOutcome, BuildError> {
        generator::Generator::new(self).run(force)
    }
}
