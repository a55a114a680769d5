//! CLI Integration Tests
//!
//! Tests the command-line interface end-to-end.

use assert_cmd::Command;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Get the binary to test, pointed at an isolated session directory.
fn ideaflow(session: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ideaflow").unwrap();
    cmd.arg("--session-dir").arg(session.path());
    cmd
}

/// First `[id]` prefix in a `variations list` output.
fn first_listed_id(session: &TempDir) -> String {
    let output = ideaflow(session).args(["variations", "list"]).output().unwrap();
    let listing = String::from_utf8(output.stdout).unwrap();
    listing
        .lines()
        .find_map(|line| {
            let start = line.find('[')? + 1;
            let end = line.find(']')?;
            Some(line[start..end].to_string())
        })
        .expect("listing should contain at least one id")
}

// ============================================================================
// Help & Version Tests
// ============================================================================

#[test]
fn test_help_flag() {
    Command::cargo_bin("ideaflow")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("idea-refinement"));
}

#[test]
fn test_short_help_flag() {
    Command::cargo_bin("ideaflow")
        .unwrap()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("ideaflow")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// ============================================================================
// Status & Navigation Tests
// ============================================================================

#[test]
fn test_fresh_session_starts_at_step_one() {
    let session = TempDir::new().unwrap();
    ideaflow(&session)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 1/5: Basic Info"));
}

#[test]
fn test_bare_invocation_defaults_to_status() {
    let session = TempDir::new().unwrap();
    ideaflow(&session).assert().success().stdout(predicate::str::contains("Step 1/5"));
}

#[test]
fn test_advance_is_blocked_without_basic_info() {
    let session = TempDir::new().unwrap();
    ideaflow(&session)
        .arg("advance")
        .assert()
        .success()
        .stdout(predicate::str::contains("Blocked:"));

    // Cursor did not move
    ideaflow(&session)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 1/5"));
}

#[test]
fn test_set_then_advance_moves_forward() {
    let session = TempDir::new().unwrap();
    ideaflow(&session).args(["set", "title", "Pony Tutus"]).assert().success();
    ideaflow(&session).args(["set", "description", "Tutus for ponies"]).assert().success();
    ideaflow(&session)
        .arg("advance")
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved to step 1: Concept Variations"));
}

#[test]
fn test_set_rejects_unknown_field() {
    let session = TempDir::new().unwrap();
    ideaflow(&session)
        .args(["set", "nonsense", "value"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field"));
}

#[test]
fn test_continue_fills_placeholder_description() {
    let session = TempDir::new().unwrap();
    ideaflow(&session).args(["set", "title", "Pony Tutus"]).assert().success();
    ideaflow(&session)
        .arg("continue")
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved to step 1"));
    ideaflow(&session)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pony Tutus (to be refined)"));
}

#[test]
fn test_continue_at_last_step_reports_no_move() {
    let session = TempDir::new().unwrap();
    ideaflow(&session).args(["goto", "4"]).assert().success();
    ideaflow(&session)
        .arg("continue")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already at the last step"));
}

#[test]
fn test_goto_rejects_out_of_range_step() {
    let session = TempDir::new().unwrap();
    ideaflow(&session)
        .args(["goto", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 0 and 4"));
}

#[test]
fn test_back_at_first_step_is_noop() {
    let session = TempDir::new().unwrap();
    ideaflow(&session)
        .arg("back")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already at the first step"));
}

// ============================================================================
// Resumability Tests
// ============================================================================

#[test]
fn test_state_survives_across_invocations() {
    let session = TempDir::new().unwrap();
    ideaflow(&session).args(["set", "title", "Pony Tutus"]).assert().success();
    ideaflow(&session).args(["set", "description", "Tutus for ponies"]).assert().success();
    ideaflow(&session).arg("advance").assert().success();

    // A fresh invocation resumes at the stored step with the stored document
    ideaflow(&session)
        .arg("status")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Step 2/5").and(predicate::str::contains("Pony Tutus")),
        );
}

#[test]
fn test_step_flag_deep_links_past_stored_cursor() {
    let session = TempDir::new().unwrap();
    ideaflow(&session).args(["set", "title", "Pony Tutus"]).assert().success();
    ideaflow(&session).args(["set", "description", "Tutus for ponies"]).assert().success();
    ideaflow(&session).arg("advance").assert().success();

    ideaflow(&session)
        .args(["--step", "0", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 1/5"));

    // An out-of-range deep link falls back to the stored cursor
    ideaflow(&session)
        .args(["--step", "42", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 2/5"));
}

#[test]
fn test_clear_resets_the_session() {
    let session = TempDir::new().unwrap();
    ideaflow(&session).args(["set", "title", "Pony Tutus"]).assert().success();
    ideaflow(&session)
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("cleared"));
    ideaflow(&session)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Title:       -"));
}

// ============================================================================
// Variation Tests
// ============================================================================

#[test]
fn test_generate_and_select_variation() {
    let session = TempDir::new().unwrap();
    ideaflow(&session).args(["set", "title", "Pony Tutus"]).assert().success();

    ideaflow(&session)
        .args(["variations", "generate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("variations generated"));

    let prefix = first_listed_id(&session);
    ideaflow(&session)
        .args(["variations", "select", &prefix])
        .assert()
        .success()
        .stdout(predicate::str::contains("Selected variation"));

    ideaflow(&session)
        .args(["variations", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("*"));
}

#[test]
fn test_select_unknown_variation_fails() {
    let session = TempDir::new().unwrap();
    ideaflow(&session)
        .args(["variations", "select", "deadbeef"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no variation"));
}

#[test]
fn test_edit_variation_updates_fields() {
    let session = TempDir::new().unwrap();
    ideaflow(&session).args(["set", "title", "Pony Tutus"]).assert().success();
    ideaflow(&session).args(["variations", "generate"]).assert().success();

    let prefix = first_listed_id(&session);
    ideaflow(&session)
        .args(["variations", "edit", &prefix, "--title", "Renamed Concept"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated variation"));

    ideaflow(&session)
        .args(["variations", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed Concept"));
}

#[test]
fn test_merge_requires_at_least_two_variations() {
    let session = TempDir::new().unwrap();
    ideaflow(&session).args(["set", "title", "Pony Tutus"]).assert().success();
    ideaflow(&session).args(["variations", "generate"]).assert().success();

    let prefix = first_listed_id(&session);
    ideaflow(&session)
        .args(["variations", "merge", &prefix])
        .assert()
        .success()
        .stdout(predicate::str::contains("at least two variations"));
}

// ============================================================================
// Generation & Persistence Tests
// ============================================================================

#[test]
fn test_feedback_prints_strengths_and_suggestions() {
    let session = TempDir::new().unwrap();
    ideaflow(&session).args(["set", "title", "Pony Tutus"]).assert().success();
    ideaflow(&session)
        .arg("feedback")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Strengths:").and(predicate::str::contains("Suggestions:")),
        );
}

#[test]
fn test_save_issues_identity_and_records_file() {
    let session = TempDir::new().unwrap();
    ideaflow(&session).args(["set", "title", "Pony Tutus"]).assert().success();
    ideaflow(&session).args(["set", "description", "Tutus for ponies"]).assert().success();

    ideaflow(&session)
        .arg("save")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved idea"));
    assert!(session.path().join("records.json").exists());

    // Status now shows the remote identity
    ideaflow(&session)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Remote id:"));
}

#[test]
fn test_duplicate_title_save_is_reported() {
    let session = TempDir::new().unwrap();
    ideaflow(&session).args(["set", "title", "Pony Tutus"]).assert().success();
    ideaflow(&session).arg("save").assert().success();

    // Fresh document against the same records file: insert hits the
    // duplicate-title constraint
    ideaflow(&session).arg("clear").assert().success();
    ideaflow(&session).args(["set", "title", "Pony Tutus"]).assert().success();
    ideaflow(&session)
        .arg("save")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

// ============================================================================
// Completions Tests
// ============================================================================

#[test]
fn test_completions_bash() {
    Command::cargo_bin("ideaflow")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ideaflow"));
}
