//! Build the site

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::cache::{BUILD_DIR, STAGING_PREFIX};
use crate::{BuildOutcome, Flux};

/// Build the site if any source changed since the last build
pub fn run(flux: &Flux, force: bool) -> Result<BuildOutcome> {
    Ok(flux.build(force)?)
}

/// Whether a changed path lives in the build output rather than the sources
fn is_output_path(flux: &Flux, path: &Path) -> bool {
    path.strip_prefix(&flux.base_dir)
        .ok()
        .and_then(|relative| relative.components().next())
        .and_then(|first| first.as_os_str().to_str())
        .map(|first| first == BUILD_DIR || first.starts_with(STAGING_PREFIX))
        .unwrap_or(false)
}

/// Watch the site tree and rebuild whenever a source file changes
pub async fn watch(flux: &Flux) -> Result<()> {
    let (tx, rx) = channel();

    // Debounce so one save does not trigger several builds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;
    debouncer
        .watcher()
        .watch(&flux.base_dir, RecursiveMode::Recursive)?;

    tracing::info!("Watching {:?} for changes. Press Ctrl+C to stop.", flux.base_dir);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| !is_output_path(flux, &e.path))
                    .collect();

                if changed.is_empty() {
                    continue;
                }

                for event in &changed {
                    tracing::debug!("File changed: {:?}", event.path);
                }

                match flux.build(false) {
                    Ok(BuildOutcome::Built { posts }) => {
                        println!("Rebuilt site ({} posts).", posts);
                    }
                    Ok(BuildOutcome::UpToDate) => {}
                    Err(e) => tracing::error!("Build failed: {}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}
