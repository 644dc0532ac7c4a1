//! Snapshot Access
//!
//! Uniform read-only access to skill files, backed by either:
//! - the live working tree (`LiveSnapshot`)
//! - a historical git ref (`GitSnapshot`)
//!
//! Callers only see the two-method [`SnapshotAccessor`] capability and never
//! branch on which backing store answers. All paths are absolute.

pub mod git;
pub mod live;

pub use git::GitSnapshot;
pub use live::LiveSnapshot;

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Not a git repository: {path}: {source}")]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Repository has no working directory: {0}")]
    BareRepository(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Where skill data is read from for one analysis pass
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SnapshotContext {
    /// The working tree on disk
    Live,
    /// A branch, tag or commit
    Reference(String),
}

impl SnapshotContext {
    pub fn is_live(&self) -> bool {
        matches!(self, SnapshotContext::Live)
    }

    pub fn reference(&self) -> Option<&str> {
        match self {
            SnapshotContext::Live => None,
            SnapshotContext::Reference(r) => Some(r),
        }
    }
}

impl fmt::Display for SnapshotContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotContext::Live => f.write_str("local"),
            SnapshotContext::Reference(r) => f.write_str(r),
        }
    }
}

/// Read-only view of one snapshot
#[async_trait]
pub trait SnapshotAccessor: Send + Sync {
    /// The context this accessor answers for
    fn context(&self) -> &SnapshotContext;

    /// File content, or `None` when the file is absent or unreadable
    async fn read_file(&self, path: &Path) -> Option<String>;

    /// Every regular file below `dir`, recursively; empty if `dir` is absent
    async fn list_files(&self, dir: &Path) -> Vec<PathBuf>;
}

/// Open the accessor matching `context`.
///
/// `start` is any path inside the repository; it is only consulted for
/// reference contexts.
pub fn open_snapshot(
    context: &SnapshotContext,
    start: &Path,
) -> Result<Box<dyn SnapshotAccessor>> {
    match context {
        SnapshotContext::Live => Ok(Box::new(LiveSnapshot::new())),
        SnapshotContext::Reference(rev) => Ok(Box::new(GitSnapshot::discover(start, rev)?)),
    }
}

/// Canonicalize a path that may not exist.
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// appended unchanged, so skills deleted from the working tree still resolve
/// to the same location inside the repository.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;

    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            let mut resolved = canonical;
            for part in tail.iter().rev() {
                resolved.push(part);
            }
            return Ok(resolved);
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }
}
