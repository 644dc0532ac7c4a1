//! Core types for skill-tokens
//!
//! Defines the data model shared by the snapshot, counter and analyzer crates:
//! - Accountable units (frontmatter, body, reference files) and their breakdowns
//! - Merged rows for local vs reference comparison
//! - Per-skill summaries, grand totals and the full report
//!
//! Everything here is derived and read-only; nothing is persisted between runs.

pub mod error;
pub mod frontmatter;

pub use error::{FatalError, Result};
pub use frontmatter::{parse_skill_md, SkillDocument};

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// Primary document file name
pub const SKILL_MD: &str = "SKILL.md";

/// Subdirectory holding a skill's reference files
pub const REFERENCES_DIR: &str = "references";

/// Entity name of the frontmatter unit
pub const FRONTMATTER_ENTITY: &str = "SKILL.md (Frontmatter)";

/// Entity name of the body unit
pub const BODY_ENTITY: &str = "SKILL.md (Body)";

/// Kind of accountable unit.
///
/// Declaration order is the display order used when sorting merged rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Frontmatter,
    Body,
    Reference,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnitKind::Frontmatter => "Frontmatter",
            UnitKind::Body => "Body",
            UnitKind::Reference => "Reference",
        };
        f.write_str(s)
    }
}

/// The smallest item the report assigns a token count to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountableUnit {
    /// Unit identity, unique within one skill and snapshot
    pub entity: String,

    #[serde(rename = "type")]
    pub kind: UnitKind,

    pub tokens: u64,
}

impl AccountableUnit {
    pub fn new(entity: impl Into<String>, kind: UnitKind, tokens: u64) -> Self {
        AccountableUnit {
            entity: entity.into(),
            kind,
            tokens,
        }
    }

    pub fn frontmatter(tokens: u64) -> Self {
        Self::new(FRONTMATTER_ENTITY, UnitKind::Frontmatter, tokens)
    }

    pub fn body(tokens: u64) -> Self {
        Self::new(BODY_ENTITY, UnitKind::Body, tokens)
    }

    pub fn reference(relative_path: impl Into<String>, tokens: u64) -> Self {
        Self::new(relative_path, UnitKind::Reference, tokens)
    }
}

/// Ordered units of one skill in one snapshot context.
///
/// Unit identities are unique; a second unit with an identity already present
/// is rejected by [`Breakdown::push`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Breakdown {
    units: Vec<AccountableUnit>,
}

impl Breakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit in discovery order. Returns false if the identity is taken.
    pub fn push(&mut self, unit: AccountableUnit) -> bool {
        if self.get(&unit.entity).is_some() {
            return false;
        }
        self.units.push(unit);
        true
    }

    pub fn get(&self, entity: &str) -> Option<&AccountableUnit> {
        self.units.iter().find(|u| u.entity == entity)
    }

    /// Sum of all unit counts
    pub fn total(&self) -> u64 {
        self.units.iter().map(|u| u.tokens).sum()
    }

    pub fn units(&self) -> &[AccountableUnit] {
        &self.units
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AccountableUnit> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn into_units(self) -> Vec<AccountableUnit> {
        self.units
    }
}

impl<'a> IntoIterator for &'a Breakdown {
    type Item = &'a AccountableUnit;
    type IntoIter = std::slice::Iter<'a, AccountableUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

/// Result of analyzing one skill in one snapshot context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillAnalysis {
    pub name: String,
    pub path: PathBuf,
    pub breakdown: Breakdown,
}

impl SkillAnalysis {
    pub fn total_tokens(&self) -> u64 {
        self.breakdown.total()
    }
}

/// Signed token difference (local - reference).
///
/// Renders with a leading `+` when positive, otherwise as the bare signed number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Delta(pub i64);

impl Delta {
    pub fn between(local: u64, reference: u64) -> Self {
        Delta(local as i64 - reference as i64)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 > 0 {
            write!(f, "+{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for Delta {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Which snapshot contexts a merged row was seen in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    LocalOnly,
    ReferenceOnly,
    Both,
}

/// One row of the unioned local/reference breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedRow {
    pub entity: String,

    #[serde(rename = "type")]
    pub kind: UnitKind,

    pub local: u64,

    pub reference: u64,

    pub delta: Delta,

    #[serde(skip)]
    pub presence: Presence,
}

impl MergedRow {
    pub fn local_only(unit: &AccountableUnit) -> Self {
        MergedRow {
            entity: unit.entity.clone(),
            kind: unit.kind,
            local: unit.tokens,
            reference: 0,
            delta: Delta::between(unit.tokens, 0),
            presence: Presence::LocalOnly,
        }
    }

    pub fn reference_only(unit: &AccountableUnit) -> Self {
        MergedRow {
            entity: unit.entity.clone(),
            kind: unit.kind,
            local: 0,
            reference: unit.tokens,
            delta: Delta::between(0, unit.tokens),
            presence: Presence::ReferenceOnly,
        }
    }

    pub fn both(local: &AccountableUnit, reference: &AccountableUnit) -> Self {
        MergedRow {
            entity: local.entity.clone(),
            kind: local.kind,
            local: local.tokens,
            reference: reference.tokens,
            delta: Delta::between(local.tokens, reference.tokens),
            presence: Presence::Both,
        }
    }
}

/// Per-skill rows: the plain local breakdown, or merged rows when comparing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SkillRows {
    Local(Vec<AccountableUnit>),
    Merged(Vec<MergedRow>),
}

/// Per-skill section of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillReport {
    pub name: String,
    pub path: PathBuf,
    pub local_total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_total: Option<u64>,
    pub breakdown: SkillRows,
}

/// Per-skill aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SummaryEntry {
    Local {
        skill: String,
        tokens: u64,
    },
    Compared {
        skill: String,
        local: u64,
        reference: u64,
        delta: Delta,
    },
}

impl SummaryEntry {
    pub fn skill(&self) -> &str {
        match self {
            SummaryEntry::Local { skill, .. } | SummaryEntry::Compared { skill, .. } => skill,
        }
    }

    pub fn local_total(&self) -> u64 {
        match self {
            SummaryEntry::Local { tokens, .. } => *tokens,
            SummaryEntry::Compared { local, .. } => *local,
        }
    }

    pub fn reference_total(&self) -> Option<u64> {
        match self {
            SummaryEntry::Local { .. } => None,
            SummaryEntry::Compared { reference, .. } => Some(*reference),
        }
    }
}

/// Full differential report, serializable verbatim for machine consumption
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Comparison ref label; absent when no comparison was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_ref: Option<String>,

    pub skills: Vec<SkillReport>,

    pub summary: Vec<SummaryEntry>,

    pub grand_total_local: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_total_ref: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_delta: Option<Delta>,
}

impl Report {
    pub fn is_comparison(&self) -> bool {
        self.compare_ref.is_some()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
