//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::helpers::name_to_path;
use crate::Flux;

/// Path a post with `title` would have in the site tree at `site_dir`
pub fn post_path(site_dir: &Path, title: &str) -> PathBuf {
    site_dir
        .join("posts")
        .join(format!("{}.md", name_to_path(title)))
}

/// Whether a post with `title` already exists
pub fn post_exists(site_dir: &Path, title: &str) -> bool {
    post_path(site_dir, title).exists()
}

/// Create a post with a metadata header holding its title
pub fn create_post(site_dir: &Path, title: &str) -> Result<PathBuf> {
    if !Flux::is_site_tree(site_dir) {
        anyhow::bail!("{:?} is not a site tree", site_dir);
    }

    if name_to_path(title).is_empty() {
        anyhow::bail!("Post title {:?} has no letters or digits", title);
    }

    let file_path = post_path(site_dir, title);
    if file_path.exists() {
        anyhow::bail!("Post with the same name already exists: {:?}", file_path);
    }

    let content = format!("<!--\n[metadata]\ntitle: {}\n-->\n", title.trim());
    fs::write(&file_path, content)?;

    tracing::debug!("Created post {:?}", file_path);
    Ok(file_path)
}
