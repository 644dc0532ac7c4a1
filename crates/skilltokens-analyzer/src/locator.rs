//! Skill discovery.
//!
//! A target holding a `SKILL.md` directly is a single skill. Otherwise every
//! directory below it, at any depth, that holds a `SKILL.md` is a skill. The
//! same rule applies to the working tree and to historical refs since it only
//! uses the two accessor operations.

use skilltokens_core::{FatalError, REFERENCES_DIR, SKILL_MD};
use skilltokens_snapshot::SnapshotAccessor;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Skill directories under `target` in one snapshot
pub async fn locate(accessor: &dyn SnapshotAccessor, target: &Path) -> BTreeSet<PathBuf> {
    let mut skills = BTreeSet::new();

    if accessor.read_file(&target.join(SKILL_MD)).await.is_some() {
        debug!("{:?} is a single skill ({})", target, accessor.context());
        skills.insert(target.to_path_buf());
        return skills;
    }

    for file in accessor.list_files(target).await {
        if file.file_name() != Some(OsStr::new(SKILL_MD)) {
            continue;
        }
        if let Some(dir) = file.parent() {
            skills.insert(dir.to_path_buf());
        }
    }

    let skills = drop_reference_nested(skills);
    debug!(
        "Found {} skill(s) under {:?} ({})",
        skills.len(),
        target,
        accessor.context()
    );
    skills
}

/// Skill directories living inside another skill's `references/` tree are
/// reference material, not skills.
fn drop_reference_nested(skills: BTreeSet<PathBuf>) -> BTreeSet<PathBuf> {
    skills
        .iter()
        .filter(|candidate| {
            !skills.iter().any(|owner| {
                owner != *candidate && candidate.starts_with(owner.join(REFERENCES_DIR))
            })
        })
        .cloned()
        .collect()
}

/// Union of skills found in every snapshot.
///
/// Fails with [`FatalError::NoSkillsFound`] when no snapshot yields a skill.
pub async fn locate_union(
    accessors: &[&dyn SnapshotAccessor],
    target: &Path,
) -> Result<BTreeSet<PathBuf>, FatalError> {
    let mut all = BTreeSet::new();
    for accessor in accessors {
        all.extend(locate(*accessor, target).await);
    }

    if all.is_empty() {
        let compare_ref = accessors
            .iter()
            .find_map(|a| a.context().reference().map(str::to_string));
        return Err(FatalError::NoSkillsFound {
            target: target.to_path_buf(),
            compare_ref,
        });
    }
    Ok(all)
}
