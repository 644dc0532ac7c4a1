//! skill-tokens - how much context do your skills cost?
//!
//! Measures the token footprint of agent skills (SKILL.md frontmatter, body and
//! reference files) in the working tree, and how it changed since a git ref.

// Re-export all public modules
#[allow(ambiguous_glob_reexports)]
pub use skilltokens_core::*;

pub use skilltokens_analyzer as analyzer;
pub use skilltokens_counter as counter;
pub use skilltokens_snapshot as snapshot;

pub use skilltokens_analyzer::{DifferentialReporter, SkillAnalyzer};
pub use skilltokens_counter::{TokenCounter, TokenMeter};
pub use skilltokens_snapshot::{GitSnapshot, LiveSnapshot, SnapshotAccessor, SnapshotContext};
