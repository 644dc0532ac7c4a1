//! Fatal conditions that abort a run before a report is produced.
//!
//! Per-unit failures never appear here: they are logged and substituted with
//! zero at the unit boundary.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FatalError {
    #[error("{env_var} environment variable is missing")]
    MissingCredential { env_var: String },

    #[error("comparison with '{compare_ref}' requested but {} is not inside a git repository", .path.display())]
    NotARepository { path: PathBuf, compare_ref: String },

    #[error("No skills found in {} ({})", .target.display(), searched_label(.compare_ref))]
    NoSkillsFound {
        target: PathBuf,
        compare_ref: Option<String>,
    },
}

fn searched_label(compare_ref: &Option<String>) -> String {
    match compare_ref {
        Some(r) => format!("local or {}", r),
        None => "local".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, FatalError>;
