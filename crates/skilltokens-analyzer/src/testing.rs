//! In-memory snapshot and counters for unit tests

use async_trait::async_trait;
use skilltokens_counter::{CounterError, TokenCounter, TokenMeter};
use skilltokens_snapshot::{SnapshotAccessor, SnapshotContext};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Snapshot whose files live in a sorted map
pub struct MemorySnapshot {
    context: SnapshotContext,
    files: BTreeMap<PathBuf, String>,
    unreadable: BTreeSet<PathBuf>,
}

impl MemorySnapshot {
    pub fn live() -> Self {
        Self::with_context(SnapshotContext::Live)
    }

    pub fn at(rev: &str) -> Self {
        Self::with_context(SnapshotContext::Reference(rev.to_string()))
    }

    fn with_context(context: SnapshotContext) -> Self {
        MemorySnapshot {
            context,
            files: BTreeMap::new(),
            unreadable: BTreeSet::new(),
        }
    }

    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(PathBuf::from(path), content.to_string());
        self
    }

    /// Listed but never readable
    pub fn unreadable(mut self, path: &str) -> Self {
        self.unreadable.insert(PathBuf::from(path));
        self
    }
}

#[async_trait]
impl SnapshotAccessor for MemorySnapshot {
    fn context(&self) -> &SnapshotContext {
        &self.context
    }

    async fn read_file(&self, path: &Path) -> Option<String> {
        self.files.get(path).cloned()
    }

    async fn list_files(&self, dir: &Path) -> Vec<PathBuf> {
        let listed: BTreeSet<PathBuf> = self
            .files
            .keys()
            .chain(self.unreadable.iter())
            .filter(|p| p.starts_with(dir) && p.as_path() != dir)
            .cloned()
            .collect();
        listed.into_iter().collect()
    }
}

/// Counts one token per byte and fails on any text containing `FAIL`
pub struct LengthCounter;

#[async_trait]
impl TokenCounter for LengthCounter {
    fn name(&self) -> &str {
        "length"
    }

    async fn count(&self, text: &str) -> skilltokens_counter::Result<u64> {
        if text.contains("FAIL") {
            return Err(CounterError::Other("refused".to_string()));
        }
        Ok(text.len() as u64)
    }
}

pub fn length_meter() -> TokenMeter {
    TokenMeter::new(Arc::new(LengthCounter))
}
