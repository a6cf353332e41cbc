//! Build errors

use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::templates::TemplateError;

/// Why a build failed. Recoverable template problems (a missing include,
/// an unknown key) are logged and never reach this type.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("{0:?} is not a site tree")]
    NotSiteTree(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("post {post:?} must contain metadata key 'title'")]
    MissingTitle { post: PathBuf },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl AsRef<Path>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| Self::Io { path, source }
    }
}
