//! Skill discovery and differential accounting
//!
//! - `locator`: find skill directories under a target in any snapshot
//! - `analyzer`: break one skill into accountable units and measure them
//! - `reporter`: analyze every skill live and at the comparison ref, then
//!   merge the breakdowns into one report

pub mod analyzer;
pub mod locator;
pub mod reporter;

#[cfg(test)]
pub(crate) mod testing;

pub use analyzer::SkillAnalyzer;
pub use locator::{locate, locate_union};
pub use reporter::{merge_breakdowns, DifferentialReporter};
