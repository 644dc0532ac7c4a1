//! Binary tests: exit codes, stdout/stderr discipline

mod common;

use assert_cmd::Command;
use common::Workspace;
use predicates::prelude::*;

const ALPHA_MD: &str = "---\nname: alpha\n---\n# Alpha\n\nDo alpha things.\n";

fn skill_tokens(ws: &Workspace) -> Command {
    let mut cmd = Command::cargo_bin("skill-tokens").unwrap();
    cmd.current_dir(&ws.root)
        .env_remove("SKILL_TOKENS_COUNTER")
        .env_remove("SKILL_TOKENS_MODEL")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(ws.path("none.yaml"));
    cmd
}

#[test]
fn test_json_report_with_estimate_counter() {
    let ws = Workspace::new();
    ws.write("skills/alpha/SKILL.md", ALPHA_MD);
    ws.write("skills/alpha/references/guide.md", "guide text");

    let output = skill_tokens(&ws)
        .args(["--counter", "estimate", "--json"])
        .arg(ws.path("skills"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["skills"][0]["name"], "alpha");
    assert!(json["grandTotalLocal"].as_u64().unwrap() > 0);
    assert!(json.get("compareRef").is_none());
}

#[test]
fn test_human_report_with_estimate_counter() {
    let ws = Workspace::new();
    ws.write("skills/alpha/SKILL.md", ALPHA_MD);

    skill_tokens(&ws)
        .args(["--counter", "estimate"])
        .arg(ws.path("skills/alpha"))
        .assert()
        .success()
        .stdout(predicate::str::contains("--- Local Token Breakdown for alpha ---"))
        .stdout(predicate::str::contains("Grand Total Tokens:"));
}

#[test]
fn test_no_skills_fails_without_stdout() {
    let ws = Workspace::new();
    ws.write("skills/README.md", "nothing here");

    skill_tokens(&ws)
        .args(["--counter", "estimate", "--json"])
        .arg(ws.path("skills"))
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No skills found"));
}

#[test]
fn test_missing_api_key_is_fatal() {
    let ws = Workspace::new();
    ws.write("skills/alpha/SKILL.md", ALPHA_MD);

    skill_tokens(&ws)
        .env_remove("GEMINI_API_KEY")
        .args(["--counter", "gemini"])
        .arg(ws.path("skills"))
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_compare_outside_repository_is_fatal() {
    let ws = Workspace::new();
    ws.write("skills/alpha/SKILL.md", ALPHA_MD);

    skill_tokens(&ws)
        .args(["--counter", "estimate", "--compare=HEAD"])
        .arg(ws.path("skills"))
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("not inside a git repository"));
}

#[test]
fn test_compare_against_head() {
    let ws = Workspace::new();
    ws.write("skills/alpha/SKILL.md", ALPHA_MD);
    ws.write("skills/alpha/references/api.md", "historical api notes");
    ws.commit_all();
    ws.remove("skills/alpha/references/api.md");

    let output = skill_tokens(&ws)
        .args(["--counter", "estimate", "--json", "--compare=HEAD"])
        .arg(ws.path("skills"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["compareRef"], "HEAD");

    let api = json["skills"][0]["breakdown"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["entity"] == "references/api.md")
        .unwrap();
    assert_eq!(api["local"], 0);
    // "historical api notes" is 20 chars, 5 estimated tokens
    assert_eq!(api["reference"], 5);
    assert_eq!(api["delta"], "-5");
    assert_eq!(json["grandDelta"], "-5");
}

#[test]
fn test_compare_human_output_labels_ref() {
    let ws = Workspace::new();
    ws.write("skills/alpha/SKILL.md", ALPHA_MD);
    ws.commit_all();

    skill_tokens(&ws)
        .args(["--counter", "estimate", "--compare=HEAD"])
        .arg(ws.path("skills"))
        .assert()
        .success()
        .stdout(predicate::str::contains("comparing with [HEAD]"))
        .stdout(predicate::str::contains("Grand Delta"));
}

#[test]
fn test_json_mode_keeps_stderr_clean_on_partial_failure() {
    let ws = Workspace::new();
    ws.write("skills/alpha/SKILL.md", ALPHA_MD);
    ws.write("skills/gone/SKILL.md", "# Gone\n\nRemoved locally.\n");
    ws.commit_all();
    ws.remove("skills/gone/SKILL.md");

    let output = skill_tokens(&ws)
        .args(["--counter", "estimate", "--json", "--compare=HEAD"])
        .arg(ws.path("skills"))
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stderr.is_empty());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"][1]["skill"], "gone");
    assert_eq!(json["summary"][1]["local"], 0);
}

#[test]
fn test_human_mode_reports_partial_failure_on_stderr() {
    let ws = Workspace::new();
    ws.write("skills/alpha/SKILL.md", ALPHA_MD);
    ws.write("skills/gone/SKILL.md", "# Gone\n\nRemoved locally.\n");
    ws.commit_all();
    ws.remove("skills/gone/SKILL.md");

    skill_tokens(&ws)
        .args(["--counter", "estimate", "--compare=HEAD"])
        .arg(ws.path("skills"))
        .assert()
        .success()
        .stdout(predicate::str::contains("--- Token Breakdown for gone ---"))
        .stderr(predicate::str::contains("SKILL.md not found"))
        .stderr(predicate::str::contains("\u{1b}[").not());
}
