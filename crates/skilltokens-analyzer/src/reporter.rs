//! Differential Reporter
//!
//! Runs the analyzer against the working tree and, when a comparison snapshot
//! is configured, against that snapshot too. The two breakdowns are merged by
//! unit identity and aggregated into per-skill summaries and grand totals.

use crate::analyzer::SkillAnalyzer;
use crate::locator::locate_union;
use skilltokens_core::{
    Breakdown, Delta, FatalError, MergedRow, Report, SkillReport, SkillRows, SummaryEntry,
};
use skilltokens_snapshot::SnapshotAccessor;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Union two breakdowns into rows sorted by kind, then identity
pub fn merge_breakdowns(local: &Breakdown, reference: &Breakdown) -> Vec<MergedRow> {
    let mut rows: Vec<MergedRow> = local
        .iter()
        .map(|unit| match reference.get(&unit.entity) {
            Some(historical) => MergedRow::both(unit, historical),
            None => MergedRow::local_only(unit),
        })
        .collect();

    rows.extend(
        reference
            .iter()
            .filter(|unit| local.get(&unit.entity).is_none())
            .map(MergedRow::reference_only),
    );

    rows.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.entity.cmp(&b.entity)));
    rows
}

/// Paths sorted as strings, so `group-b` precedes `group/a`
fn in_string_order(skills: &BTreeSet<PathBuf>) -> Vec<&PathBuf> {
    let mut ordered: Vec<&PathBuf> = skills.iter().collect();
    ordered.sort_by_cached_key(|path| path.to_string_lossy().into_owned());
    ordered
}

/// Produces the full report for a set of skills
pub struct DifferentialReporter<'a> {
    analyzer: &'a SkillAnalyzer,
    live: &'a dyn SnapshotAccessor,
    reference: Option<&'a dyn SnapshotAccessor>,
}

impl<'a> DifferentialReporter<'a> {
    pub fn new(
        analyzer: &'a SkillAnalyzer,
        live: &'a dyn SnapshotAccessor,
        reference: Option<&'a dyn SnapshotAccessor>,
    ) -> Self {
        DifferentialReporter {
            analyzer,
            live,
            reference,
        }
    }

    /// Label of the comparison snapshot, if any
    pub fn compare_ref(&self) -> Option<&str> {
        self.reference.and_then(|r| r.context().reference())
    }

    /// Skills under `target` in the working tree or the comparison snapshot
    pub async fn locate(&self, target: &Path) -> Result<BTreeSet<PathBuf>, FatalError> {
        let mut accessors: Vec<&dyn SnapshotAccessor> = vec![self.live];
        accessors.extend(self.reference);
        locate_union(&accessors, target).await
    }

    /// Locate then report
    pub async fn run(&self, target: &Path) -> Result<Report, FatalError> {
        let skills = self.locate(target).await?;
        Ok(self.report(&skills).await)
    }

    /// Analyze `skills` in path string order and aggregate
    pub async fn report(&self, skills: &BTreeSet<PathBuf>) -> Report {
        match self.compare_ref() {
            Some(r) => info!("Analyzing {} skill(s) and comparing with [{}]", skills.len(), r),
            None => info!("Analyzing {} skill(s)", skills.len()),
        }

        let mut skill_reports = Vec::with_capacity(skills.len());
        let mut summary = Vec::with_capacity(skills.len());
        let mut grand_total_local = 0u64;
        let mut grand_total_ref = 0u64;

        for skill_path in in_string_order(skills) {
            let local = self.analyzer.analyze(self.live, skill_path).await;
            let local_total = local.total_tokens();
            grand_total_local += local_total;

            match self.reference {
                Some(reference) => {
                    let historical = self.analyzer.analyze(reference, skill_path).await;
                    let ref_total = historical.total_tokens();
                    grand_total_ref += ref_total;

                    let rows = merge_breakdowns(&local.breakdown, &historical.breakdown);
                    summary.push(SummaryEntry::Compared {
                        skill: local.name.clone(),
                        local: local_total,
                        reference: ref_total,
                        delta: Delta::between(local_total, ref_total),
                    });
                    skill_reports.push(SkillReport {
                        name: local.name,
                        path: local.path,
                        local_total,
                        ref_total: Some(ref_total),
                        breakdown: SkillRows::Merged(rows),
                    });
                }
                None => {
                    summary.push(SummaryEntry::Local {
                        skill: local.name.clone(),
                        tokens: local_total,
                    });
                    skill_reports.push(SkillReport {
                        name: local.name,
                        path: local.path,
                        local_total,
                        ref_total: None,
                        breakdown: SkillRows::Local(local.breakdown.into_units()),
                    });
                }
            }
        }

        let comparing = self.reference.is_some();
        Report {
            compare_ref: self.compare_ref().map(str::to_string),
            skills: skill_reports,
            summary,
            grand_total_local,
            grand_total_ref: comparing.then_some(grand_total_ref),
            grand_delta: comparing.then(|| Delta::between(grand_total_local, grand_total_ref)),
        }
    }
}
