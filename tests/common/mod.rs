//! Shared fixtures: skill trees on disk, git history, deterministic counters

#![allow(dead_code)]

use async_trait::async_trait;
use git2::{IndexAddOption, Repository, Signature};
use skilltokens::counter::{CounterError, TokenCounter, TokenMeter};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// One token per byte
pub struct LengthCounter;

#[async_trait]
impl TokenCounter for LengthCounter {
    fn name(&self) -> &str {
        "length"
    }

    async fn count(&self, text: &str) -> skilltokens::counter::Result<u64> {
        Ok(text.len() as u64)
    }
}

/// One token per byte, except text containing the poison marker fails
pub struct PoisonCounter {
    pub marker: &'static str,
}

#[async_trait]
impl TokenCounter for PoisonCounter {
    fn name(&self) -> &str {
        "poison"
    }

    async fn count(&self, text: &str) -> skilltokens::counter::Result<u64> {
        if text.contains(self.marker) {
            return Err(CounterError::Other("service unavailable".to_string()));
        }
        Ok(text.len() as u64)
    }
}

pub fn length_meter() -> TokenMeter {
    TokenMeter::new(Arc::new(LengthCounter))
}

/// Temporary workspace whose root path is canonical
pub struct Workspace {
    _temp: TempDir,
    pub root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let root = temp.path().canonicalize().expect("canonical temp dir");
        Workspace { _temp: temp, root }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root.join(rel);
        std::fs::create_dir_all(path.parent().expect("file has a parent"))
            .expect("create parent dirs");
        std::fs::write(&path, content).expect("write fixture file");
        path
    }

    pub fn remove(&self, rel: &str) {
        let path = self.root.join(rel);
        if path.is_dir() {
            std::fs::remove_dir_all(path).expect("remove fixture dir");
        } else {
            std::fs::remove_file(path).expect("remove fixture file");
        }
    }

    /// Initialize a git repository and commit everything currently on disk
    pub fn commit_all(&self) -> Repository {
        let repo = Repository::init(&self.root).expect("init repo");
        commit_tree(&repo);
        repo
    }
}

fn commit_tree(repo: &Repository) {
    let mut index = repo.index().expect("open index");
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .expect("stage files");
    index.write().expect("write index");
    let tree_id = index.write_tree().expect("write tree");
    let tree = repo.find_tree(tree_id).expect("find tree");
    let sig = Signature::now("test", "test@example.com").expect("signature");
    repo.commit(Some("HEAD"), &sig, &sig, "snapshot", &tree, &[])
        .expect("commit");
}
