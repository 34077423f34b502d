use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use tracing::info;
use voxel_collide::PhysParams;

/// Reads simulation parameters from a JSON file; missing fields keep their
/// defaults.
pub fn load_params(path: &Path) -> Result<PhysParams> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading parameters from {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing parameters in {}", path.display()))
}

fn reload_params(path: &Path, tx: &Sender<PhysParams>) {
    match load_params(path) {
        Ok(params) => {
            info!(path = %path.display(), "parameters changed, reloading");
            if tx.send(params).is_err() {
                tracing::debug!("simulation loop gone, dropping reloaded parameters");
            }
        }
        Err(e) => tracing::error!("Keeping previous parameters: {e:#}"),
    }
}

/// Watches `path` and sends freshly parsed parameters on every change.
///
/// The parent directory is watched rather than the file itself so that
/// editors replacing the file on save are still seen.
pub fn start(path: &Path, tx: Sender<PhysParams>) -> Result<RecommendedWatcher> {
    let target: PathBuf = path
        .canonicalize()
        .with_context(|| format!("resolving {}", path.display()))?;
    let dir = target
        .parent()
        .map(Path::to_path_buf)
        .context("parameters file has no parent directory")?;
    info!(path = %target.display(), "Initializing parameters watcher...");

    let watched = target.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if (event.kind.is_modify() || event.kind.is_create())
                && event.paths.iter().any(|p| p.file_name() == watched.file_name())
            {
                reload_params(&watched, &tx);
            }
        }
        Err(e) => tracing::error!("Error watching parameters file: {e:?}"),
    })?;

    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    info!(dir = %dir.display(), "Parameters watcher started.");
    Ok(watcher)
}
