//! Build staleness check
//!
//! The build output is fresh or stale only as a whole. Its directory
//! modification time is the watermark: if any file in the site tree outside
//! the build output is newer, the whole site is rebuilt.
//!
//! Only modification times are compared, so two edits inside one mtime
//! resolution window can go unnoticed.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use walkdir::{DirEntry, WalkDir};

/// Name of the build output directory inside a site tree
pub const BUILD_DIR: &str = ".build";

/// Prefix shared by staging directories created while a build is assembled
pub const STAGING_PREFIX: &str = ".build-";

/// Get a path's modification time
pub fn get_mtime(path: &Path) -> std::io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Whether `entry` is the build output or a staging directory at the top of
/// the site tree
fn is_build_output(entry: &DirEntry) -> bool {
    entry.depth() == 1
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| name == BUILD_DIR || name.starts_with(STAGING_PREFIX))
            .unwrap_or(false)
}

/// Decide whether the site in `site_dir` needs to be rebuilt.
///
/// True when there is no build output yet, or when any file outside it has a
/// newer modification time than the build output directory. Files whose
/// timestamps cannot be read count as changed.
pub fn needs_rebuild(site_dir: &Path) -> bool {
    let build_dir = site_dir.join(BUILD_DIR);
    if !build_dir.is_dir() {
        tracing::debug!("No build output at {:?}", build_dir);
        return true;
    }

    let built_at = match get_mtime(&build_dir) {
        Ok(mtime) => mtime,
        Err(e) => {
            tracing::debug!("Cannot read mtime of {:?}: {}", build_dir, e);
            return true;
        }
    };

    for entry in WalkDir::new(site_dir)
        .into_iter()
        .filter_entry(|e| !is_build_output(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Cannot walk site tree: {}", e);
                return true;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match entry.metadata().map(|m| m.modified()) {
            Ok(Ok(mtime)) if mtime <= built_at => {}
            Ok(Ok(_)) => {
                tracing::debug!("{:?} changed since the last build", entry.path());
                return true;
            }
            Ok(Err(e)) => {
                tracing::debug!("Cannot read mtime of {:?}: {}", entry.path(), e);
                return true;
            }
            Err(e) => {
                tracing::debug!("Cannot read metadata of {:?}: {}", entry.path(), e);
                return true;
            }
        }
    }

    false
}
