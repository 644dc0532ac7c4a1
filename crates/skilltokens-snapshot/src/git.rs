//! Historical snapshot backed by a git ref.
//!
//! Uses libgit2 to read blobs and walk trees at the ref without touching the
//! working tree. Paths are accepted and returned as absolute paths under the
//! repository's working directory.

use crate::{Result, SnapshotAccessor, SnapshotContext, SnapshotError};
use async_trait::async_trait;
use git2::{ObjectType, Repository, Tree, TreeWalkMode, TreeWalkResult};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads skills as they were recorded at a git ref
pub struct GitSnapshot {
    repo: Mutex<Repository>,
    root: PathBuf,
    rev: String,
    context: SnapshotContext,
}

impl GitSnapshot {
    /// Find the repository containing `start` and bind it to `rev`
    pub fn discover(start: &Path, rev: impl Into<String>) -> Result<Self> {
        let repo = Repository::discover(start).map_err(|source| SnapshotError::NotARepository {
            path: start.to_path_buf(),
            source,
        })?;
        Self::from_repository(repo, rev)
    }

    pub fn from_repository(repo: Repository, rev: impl Into<String>) -> Result<Self> {
        let rev = rev.into();
        let workdir = repo
            .workdir()
            .ok_or_else(|| SnapshotError::BareRepository(repo.path().to_path_buf()))?;
        let root = workdir
            .canonicalize()
            .unwrap_or_else(|_| workdir.to_path_buf());

        if let Err(e) = repo.revparse_single(&rev) {
            warn!("Ref '{}' does not resolve, nothing will be found there: {}", rev, e);
        }
        debug!("Opened git snapshot {} at {:?}", rev, root);

        Ok(GitSnapshot {
            repo: Mutex::new(repo),
            root,
            context: SnapshotContext::Reference(rev.clone()),
            rev,
        })
    }

    /// Repository working directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn rev(&self) -> &str {
        &self.rev
    }

    /// Path relative to the repository root, or `None` if outside it
    pub fn relative_path(&self, path: &Path) -> Option<PathBuf> {
        match path.strip_prefix(&self.root) {
            Ok(rel) => Some(rel.to_path_buf()),
            Err(_) => {
                debug!("{:?} is outside repository {:?}", path, self.root);
                None
            }
        }
    }

    fn ref_tree<'r>(&self, repo: &'r Repository) -> Option<Tree<'r>> {
        repo.revparse_single(&self.rev).ok()?.peel_to_tree().ok()
    }

    fn read_blob(&self, path: &Path) -> Option<String> {
        let rel = self.relative_path(path)?;
        let repo = self.repo.lock();
        let tree = self.ref_tree(&repo)?;
        let entry = tree.get_path(&rel).ok()?;
        let object = entry.to_object(&repo).ok()?;
        let blob = object.as_blob()?;
        Some(String::from_utf8_lossy(blob.content()).into_owned())
    }

    fn walk_tree(&self, dir: &Path) -> Vec<PathBuf> {
        let Some(rel_dir) = self.relative_path(dir) else {
            return Vec::new();
        };
        let repo = self.repo.lock();
        let Some(tree) = self.ref_tree(&repo) else {
            return Vec::new();
        };

        let subtree = if rel_dir.as_os_str().is_empty() {
            tree
        } else {
            match tree
                .get_path(&rel_dir)
                .and_then(|entry| entry.to_object(&repo))
                .and_then(|object| object.peel_to_tree())
            {
                Ok(subtree) => subtree,
                Err(_) => return Vec::new(),
            }
        };

        let base = self.root.join(&rel_dir);
        let mut files = Vec::new();
        let walked = subtree.walk(TreeWalkMode::PreOrder, |parent, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    files.push(base.join(format!("{}{}", parent, name)));
                }
            }
            TreeWalkResult::Ok
        });
        if let Err(e) = walked {
            debug!("Tree walk of {:?} at {} failed: {}", rel_dir, self.rev, e);
            return Vec::new();
        }
        files
    }
}

#[async_trait]
impl SnapshotAccessor for GitSnapshot {
    fn context(&self) -> &SnapshotContext {
        &self.context
    }

    async fn read_file(&self, path: &Path) -> Option<String> {
        self.read_blob(path)
    }

    async fn list_files(&self, dir: &Path) -> Vec<PathBuf> {
        self.walk_tree(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{IndexAddOption, Signature};
    use tempfile::TempDir;

    fn commit_all(repo: &Repository) {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("test", "test@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();
    }

    fn setup_repo() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let repo = Repository::init(&root).unwrap();

        let skill = root.join("skills").join("alpha");
        std::fs::create_dir_all(skill.join("references").join("deep")).unwrap();
        std::fs::write(skill.join("SKILL.md"), "---\nname: alpha\n---\nbody").unwrap();
        std::fs::write(skill.join("references").join("b.md"), "bee").unwrap();
        std::fs::write(skill.join("references").join("a.md"), "ay").unwrap();
        std::fs::write(
            skill.join("references").join("deep").join("c.md"),
            "sea",
        )
        .unwrap();
        commit_all(&repo);

        (temp, root)
    }

    #[tokio::test]
    async fn test_read_file_at_ref() {
        let (_temp, root) = setup_repo();
        let skill_md = root.join("skills").join("alpha").join("SKILL.md");

        // working tree changes are invisible to the ref
        std::fs::write(&skill_md, "changed").unwrap();

        let snapshot = GitSnapshot::discover(&root, "HEAD").unwrap();
        assert_eq!(
            snapshot.read_file(&skill_md).await.as_deref(),
            Some("---\nname: alpha\n---\nbody")
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_absent() {
        let (_temp, root) = setup_repo();
        let snapshot = GitSnapshot::discover(&root, "HEAD").unwrap();

        assert_eq!(
            snapshot
                .read_file(&root.join("skills").join("beta").join("SKILL.md"))
                .await,
            None
        );
        // a tree is not a file
        assert_eq!(snapshot.read_file(&root.join("skills")).await, None);
    }

    #[tokio::test]
    async fn test_list_files_flattens_tree() {
        let (_temp, root) = setup_repo();
        let snapshot = GitSnapshot::discover(&root, "HEAD").unwrap();
        let refs = root.join("skills").join("alpha").join("references");

        let files = snapshot.list_files(&refs).await;
        assert_eq!(
            files,
            vec![
                refs.join("a.md"),
                refs.join("b.md"),
                refs.join("deep").join("c.md"),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let (_temp, root) = setup_repo();
        let snapshot = GitSnapshot::discover(&root, "HEAD").unwrap();
        assert!(snapshot
            .list_files(&root.join("skills").join("gamma"))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_unknown_ref_finds_nothing() {
        let (_temp, root) = setup_repo();
        let snapshot = GitSnapshot::discover(&root, "no-such-branch").unwrap();
        assert!(snapshot.list_files(&root).await.is_empty());
        assert_eq!(
            snapshot
                .read_file(&root.join("skills").join("alpha").join("SKILL.md"))
                .await,
            None
        );
    }

    #[tokio::test]
    async fn test_list_repository_root() {
        let (_temp, root) = setup_repo();
        let snapshot = GitSnapshot::discover(&root, "HEAD").unwrap();
        let files = snapshot.list_files(&root).await;
        assert_eq!(files.len(), 4);
        assert!(files.contains(&root.join("skills").join("alpha").join("SKILL.md")));
        assert_eq!(snapshot.context().reference(), Some("HEAD"));
    }

    #[test]
    fn test_relative_path_outside_root() {
        let (_temp, root) = setup_repo();
        let snapshot = GitSnapshot::discover(&root, "HEAD").unwrap();
        assert_eq!(snapshot.relative_path(Path::new("/definitely/elsewhere")), None);
        assert_eq!(
            snapshot.relative_path(&root.join("skills")),
            Some(PathBuf::from("skills"))
        );
    }
}
