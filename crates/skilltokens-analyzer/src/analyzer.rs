//! Per-skill token breakdown.
//!
//! Units are discovered in a fixed order: frontmatter, body, then each file
//! under `references/` in listing order.

use skilltokens_core::{
    parse_skill_md, AccountableUnit, Breakdown, SkillAnalysis, REFERENCES_DIR, SKILL_MD,
};
use skilltokens_counter::TokenMeter;
use skilltokens_snapshot::SnapshotAccessor;
use std::path::Path;
use tracing::{debug, warn};

/// Measures skills with a shared [`TokenMeter`]
#[derive(Debug, Clone)]
pub struct SkillAnalyzer {
    meter: TokenMeter,
}

impl SkillAnalyzer {
    pub fn new(meter: TokenMeter) -> Self {
        SkillAnalyzer { meter }
    }

    pub fn meter(&self) -> &TokenMeter {
        &self.meter
    }

    /// Break down the skill at `skill_path` as seen by `accessor`
    pub async fn analyze(&self, accessor: &dyn SnapshotAccessor, skill_path: &Path) -> SkillAnalysis {
        let name = skill_name(skill_path);
        let context = accessor.context();
        let mut breakdown = Breakdown::new();

        match accessor.read_file(&skill_path.join(SKILL_MD)).await {
            Some(content) => {
                let doc = parse_skill_md(&content);
                if !doc.frontmatter.trim().is_empty() {
                    let label = format!("{}/{} frontmatter ({})", name, SKILL_MD, context);
                    let tokens = self.meter.measure(doc.frontmatter, &label).await;
                    breakdown.push(AccountableUnit::frontmatter(tokens));
                }
                if !doc.body.trim().is_empty() {
                    let label = format!("{}/{} body ({})", name, SKILL_MD, context);
                    let tokens = self.meter.measure(doc.body, &label).await;
                    breakdown.push(AccountableUnit::body(tokens));
                }
            }
            None if context.is_live() => {
                warn!("{} not found in {}", SKILL_MD, skill_path.display());
            }
            None => {
                debug!("{} absent in {} at {}", SKILL_MD, skill_path.display(), context);
            }
        }

        for file in accessor.list_files(&skill_path.join(REFERENCES_DIR)).await {
            let entity = relative_entity(skill_path, &file);
            match accessor.read_file(&file).await {
                Some(content) if content.is_empty() => {
                    debug!("Skipping empty reference {} in {}", entity, name);
                }
                Some(content) => {
                    let label = format!("{}/{} ({})", name, entity, context);
                    let tokens = self.meter.measure(&content, &label).await;
                    if !breakdown.push(AccountableUnit::reference(entity.clone(), tokens)) {
                        warn!("Duplicate unit {} in {} ignored", entity, name);
                    }
                }
                None => {
                    warn!("Cannot read reference {} in {} ({})", entity, name, context);
                }
            }
        }

        debug!(
            "{} ({}): {} unit(s), {} tokens",
            name,
            context,
            breakdown.len(),
            breakdown.total()
        );

        SkillAnalysis {
            name,
            path: skill_path.to_path_buf(),
            breakdown,
        }
    }
}

/// Directory base name, or the whole path when it has none
pub fn skill_name(skill_path: &Path) -> String {
    skill_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| skill_path.display().to_string())
}

/// Path of `file` relative to the skill root, `/`-separated
fn relative_entity(skill_path: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(skill_path).unwrap_or(file);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
