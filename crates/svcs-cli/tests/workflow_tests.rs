//! End-to-end workflows through the svcs binary.

mod common;

use common::{svcs, write_file};

#[test]
fn init_add_commit_log() {
    let dir = tempfile::tempdir().unwrap();

    let out = svcs(dir.path(), &["init"]);
    out.assert_ok();
    assert!(out.stdout.contains("Initialized empty svcs repository"));
    assert!(dir.path().join(".svcs/HEAD").is_file());

    write_file(dir.path(), "a.txt", "hello\n");
    svcs(dir.path(), &["add", "a.txt"]).assert_ok();
    let out = svcs(dir.path(), &["commit", "-m", "first"]);
    out.assert_ok();
    assert!(out.stdout.contains("[main"));
    assert!(out.stdout.contains("first"));

    let out = svcs(dir.path(), &["log", "--oneline"]);
    out.assert_ok();
    assert!(out.stdout.contains("first"));
    assert_eq!(out.stdout.lines().count(), 1);
}

#[test]
fn reinit_reports_existing() {
    let dir = tempfile::tempdir().unwrap();
    svcs(dir.path(), &["init"]).assert_ok();
    let out = svcs(dir.path(), &["init"]);
    out.assert_ok();
    assert!(out.stdout.contains("Reinitialized existing svcs repository"));
}

#[test]
fn status_short_shows_added_and_untracked() {
    let dir = tempfile::tempdir().unwrap();
    svcs(dir.path(), &["init"]).assert_ok();

    write_file(dir.path(), "staged.txt", "s\n");
    write_file(dir.path(), "loose.txt", "l\n");
    svcs(dir.path(), &["add", "staged.txt"]).assert_ok();

    let out = svcs(dir.path(), &["status", "--short"]);
    out.assert_ok();
    assert!(out.stdout.contains("A staged.txt"));
    assert!(out.stdout.contains("? loose.txt"));
}

#[test]
fn branch_and_checkout_flow() {
    let dir = tempfile::tempdir().unwrap();
    svcs(dir.path(), &["init"]).assert_ok();
    write_file(dir.path(), "a.txt", "base\n");
    svcs(dir.path(), &["add", "a.txt"]).assert_ok();
    svcs(dir.path(), &["commit", "-m", "base"]).assert_ok();

    svcs(dir.path(), &["branch", "feature"]).assert_ok();
    let out = svcs(dir.path(), &["branch"]);
    out.assert_ok();
    assert!(out.stdout.contains("* main"));
    assert!(out.stdout.contains("  feature"));

    let out = svcs(dir.path(), &["checkout", "feature"]);
    out.assert_ok();
    assert!(out.stdout.contains("Switched to branch 'feature'"));

    // Deleting the now-current branch fails with exit 1.
    let out = svcs(dir.path(), &["branch", "-d", "feature"]);
    assert_eq!(out.exit_code, 1);
    assert!(out.stderr.contains("current branch"));

    svcs(dir.path(), &["branch", "-d", "main"]).assert_ok();
}

#[test]
fn diff_shows_unstaged_changes() {
    let dir = tempfile::tempdir().unwrap();
    svcs(dir.path(), &["init"]).assert_ok();
    write_file(dir.path(), "f.txt", "one\ntwo\n");
    svcs(dir.path(), &["add", "f.txt"]).assert_ok();

    write_file(dir.path(), "f.txt", "one\nTWO\n");
    let out = svcs(dir.path(), &["diff"]);
    out.assert_ok();
    assert!(out.stdout.contains("--- a/f.txt"));
    assert!(out.stdout.contains("-two"));
    assert!(out.stdout.contains("+TWO"));

    // The staged copy is unchanged relative to HEAD-less index.
    let out = svcs(dir.path(), &["diff", "--cached"]);
    out.assert_ok();
    assert!(out.stdout.contains("+two"));
}

#[test]
fn merge_conflict_exits_one_with_markers() {
    let dir = tempfile::tempdir().unwrap();
    svcs(dir.path(), &["init"]).assert_ok();
    write_file(dir.path(), "f.txt", "a\nb\nc\n");
    svcs(dir.path(), &["add", "f.txt"]).assert_ok();
    svcs(dir.path(), &["commit", "-m", "base"]).assert_ok();

    svcs(dir.path(), &["checkout", "-b", "x"]).assert_ok();
    write_file(dir.path(), "f.txt", "a\nB1\nc\n");
    svcs(dir.path(), &["add", "f.txt"]).assert_ok();
    svcs(dir.path(), &["commit", "-m", "x change"]).assert_ok();

    svcs(dir.path(), &["checkout", "main"]).assert_ok();
    write_file(dir.path(), "f.txt", "a\nB2\nc\n");
    svcs(dir.path(), &["add", "f.txt"]).assert_ok();
    svcs(dir.path(), &["commit", "-m", "main change"]).assert_ok();

    let out = svcs(dir.path(), &["merge", "x"]);
    assert_eq!(out.exit_code, 1);
    assert!(out.stdout.contains("CONFLICT (content): f.txt"));

    let merged = std::fs::read_to_string(dir.path().join("f.txt")).unwrap();
    assert!(merged.contains("<<<<<<< HEAD"));
    assert!(merged.contains("======="));
    assert!(merged.contains(">>>>>>> x"));
}

#[test]
fn fast_forward_merge_reports() {
    let dir = tempfile::tempdir().unwrap();
    svcs(dir.path(), &["init"]).assert_ok();
    write_file(dir.path(), "f.txt", "one\n");
    svcs(dir.path(), &["add", "f.txt"]).assert_ok();
    svcs(dir.path(), &["commit", "-m", "c1"]).assert_ok();

    svcs(dir.path(), &["branch", "topic"]).assert_ok();
    write_file(dir.path(), "f.txt", "two\n");
    svcs(dir.path(), &["add", "f.txt"]).assert_ok();
    svcs(dir.path(), &["commit", "-m", "c2"]).assert_ok();

    svcs(dir.path(), &["checkout", "topic"]).assert_ok();
    let out = svcs(dir.path(), &["merge", "main"]);
    out.assert_ok();
    assert!(out.stdout.contains("Fast-forward"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("f.txt")).unwrap(),
        "two\n"
    );
}

#[test]
fn usage_error_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let out = svcs(dir.path(), &["definitely-not-a-command"]);
    assert_eq!(out.exit_code, 2);
}

#[test]
fn commit_without_repo_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = svcs(dir.path(), &["commit", "-m", "x"]);
    assert_eq!(out.exit_code, 1);
    assert!(out.stderr.contains("not an svcs repository"));
}

#[test]
fn add_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    svcs(dir.path(), &["init"]).assert_ok();
    let out = svcs(dir.path(), &["add", "ghost.txt"]);
    assert_eq!(out.exit_code, 1);
}
