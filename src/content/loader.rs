//! Content loader - loads posts from the posts directory

use std::fs;
use std::path::{Path, PathBuf};

use super::{parse_metadata, MarkdownRenderer, Post};
use crate::config::SiteConfig;
use crate::error::BuildError;
use crate::Flux;

/// Loads posts from `posts/`
pub struct ContentLoader<'a> {
    config: &'a SiteConfig,
    posts_dir: PathBuf,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(flux: &'a Flux) -> Self {
        Self {
            config: &flux.config,
            posts_dir: flux.posts_dir.clone(),
            renderer: MarkdownRenderer::with_theme(flux.config.highlight_theme()),
        }
    }

    /// Load every `*.md` file directly under `posts/`, sorted by file name
    pub fn load_posts(&self) -> Result<Vec<Post>, BuildError> {
        let entries = fs::read_dir(&self.posts_dir).map_err(BuildError::io(&self.posts_dir))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(BuildError::io(&self.posts_dir))?.path();
            if path.is_file() && is_markdown_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        paths.iter().map(|path| self.load_post(path)).collect()
    }

    /// Load a single post from a file
    pub fn load_post(&self, path: &Path) -> Result<Post, BuildError> {
        let source = fs::read_to_string(path).map_err(BuildError::io(path))?;
        tracing::debug!("Loaded post {:?}", path);
        Ok(self.parse_post(path, &source))
    }

    /// Build a post from its source text: split off the metadata header,
    /// merge global metadata and render the body. The rendered body is stored
    /// in the metadata under the post container id.
    pub fn parse_post(&self, path: &Path, source: &str) -> Post {
        let (body, mut metadata) = parse_metadata(source, self.config.metadata());

        let container_id = self.config.post_div_id();
        let content = self.renderer.render_post(body, container_id);
        metadata.insert(container_id.to_string(), content);

        Post {
            source: path.to_path_buf(),
            metadata,
        }
    }
}

/// Check if a file is a markdown post
fn is_markdown_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("md")
}
