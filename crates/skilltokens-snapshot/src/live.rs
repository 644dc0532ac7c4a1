//! Working tree snapshot backed by the filesystem

use crate::{SnapshotAccessor, SnapshotContext};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Reads skills straight from disk
#[derive(Debug, Clone)]
pub struct LiveSnapshot {
    context: SnapshotContext,
}

impl LiveSnapshot {
    pub fn new() -> Self {
        LiveSnapshot {
            context: SnapshotContext::Live,
        }
    }
}

impl Default for LiveSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Regular files below `dir`, depth first, sorted by name within each directory.
///
/// `dir` itself is never listed, so a regular file in its place lists nothing.
fn walk_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry under {:?}: {}", dir, e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

#[async_trait]
impl SnapshotAccessor for LiveSnapshot {
    fn context(&self) -> &SnapshotContext {
        &self.context
    }

    async fn read_file(&self, path: &Path) -> Option<String> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                debug!("Cannot read {:?}: {}", path, e);
                None
            }
        }
    }

    async fn list_files(&self, dir: &Path) -> Vec<PathBuf> {
        let dir = dir.to_path_buf();
        match tokio::task::spawn_blocking(move || walk_files(&dir)).await {
            Ok(files) => files,
            Err(e) => {
                debug!("Directory walk task failed: {}", e);
                Vec::new()
            }
        }
    }
}
