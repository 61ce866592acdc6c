use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rgit() -> Command {
    Command::cargo_bin("rgit").expect("rgit binary")
}

const LOG_CONTENT: &str =
    "\u{1b}[33mabc1234\u{1b}[0m dev 2026-08-01 first\n\u{1b}[33mdef5678\u{1b}[0m dev 2026-08-02 second\n\u{1b}[33m9990000\u{1b}[0m dev 2026-08-03 third\n";

/// Fabricate a synced tree the way a remote host would see it: cache files
/// only, no `.git` anywhere.
fn fake_remote_root(tmp: &TempDir) -> PathBuf {
    let root = tmp.path().join("common_sync");
    let cache = root.join("commit_msg/toolbox");
    fs::create_dir_all(&cache).unwrap();
    fs::write(cache.join("log.txt"), LOG_CONTENT).unwrap();
    fs::write(
        cache.join("status.txt"),
        "On branch main\nnothing to commit\n",
    )
    .unwrap();
    fs::write(cache.join("branch.txt"), "* main abc1234 first\n").unwrap();
    fs::write(cache.join("diff_stat.txt"), "").unwrap();
    fs::write(
        root.join("commit_msg/worktrees.json"),
        r#"{
  "toolbox": [
    {
      "name": "toolbox-wip",
      "branch": "wip",
      "head": "abc1234"
    }
  ]
}
"#,
    )
    .unwrap();
    root
}

#[test]
fn list_shows_cached_repos() {
    let tmp = TempDir::new().unwrap();
    let root = fake_remote_root(&tmp);

    rgit()
        .current_dir(&root)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("toolbox"));
}

#[test]
fn log_prints_cached_bytes_verbatim() {
    let tmp = TempDir::new().unwrap();
    let root = fake_remote_root(&tmp);

    rgit()
        .current_dir(&root)
        .args(["log", "toolbox"])
        .assert()
        .success()
        .stdout(LOG_CONTENT);
}

#[test]
fn log_head_limit_takes_first_lines() {
    let tmp = TempDir::new().unwrap();
    let root = fake_remote_root(&tmp);

    rgit()
        .current_dir(&root)
        .args(["log", "toolbox", "-n", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("first"))
        .stdout(predicate::str::contains("second"))
        .stdout(predicate::str::contains("third").not());
}

#[test]
fn repo_auto_detected_from_cwd() {
    let tmp = TempDir::new().unwrap();
    let root = fake_remote_root(&tmp);
    let inside = root.join("toolbox/src");
    fs::create_dir_all(&inside).unwrap();

    rgit()
        .current_dir(&inside)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to commit"));
}

#[test]
fn unknown_repo_and_uncollected_view_report_distinctly() {
    let tmp = TempDir::new().unwrap();
    let root = fake_remote_root(&tmp);

    rgit()
        .current_dir(&root)
        .args(["status", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown repository 'ghost'"));

    rgit()
        .current_dir(&root)
        .args(["diff", "toolbox"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("never collected"));
}

#[test]
fn status_all_summarizes_each_repo() {
    let tmp = TempDir::new().unwrap();
    let root = fake_remote_root(&tmp);

    rgit()
        .current_dir(&root)
        .arg("status-all")
        .assert()
        .success()
        .stdout(predicate::str::contains("toolbox"))
        .stdout(predicate::str::contains("Branch: * main"))
        .stdout(predicate::str::contains("Latest:"));
}

#[test]
fn worktree_list_renders_cached_map() {
    let tmp = TempDir::new().unwrap();
    let root = fake_remote_root(&tmp);

    rgit()
        .current_dir(&root)
        .args(["worktree", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("toolbox-wip"))
        .stdout(predicate::str::contains("wip"));
}

#[test]
fn worktree_switch_requires_synced_directory() {
    let tmp = TempDir::new().unwrap();
    let root = fake_remote_root(&tmp);

    // directory missing on this host
    rgit()
        .current_dir(&root)
        .args(["worktree", "switch", "toolbox-wip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));

    fs::create_dir_all(root.join("toolbox-wip")).unwrap();
    rgit()
        .current_dir(&root)
        .args(["worktree", "switch", "toolbox-wip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("toolbox-wip"));
}

#[test]
fn worktree_switch_propagates_install_failure() {
    let tmp = TempDir::new().unwrap();
    let root = fake_remote_root(&tmp);
    fs::create_dir_all(root.join("toolbox-wip")).unwrap();

    rgit()
        .current_dir(&root)
        .env("LSYNC_WORKTREE_INSTALL_CMD", "exit 7")
        .args(["worktree", "switch", "toolbox-wip"])
        .assert()
        .code(7);
}

#[test]
fn worktree_switch_runs_install_command_in_worktree() {
    let tmp = TempDir::new().unwrap();
    let root = fake_remote_root(&tmp);
    fs::create_dir_all(root.join("toolbox-wip")).unwrap();

    rgit()
        .current_dir(&root)
        .env("LSYNC_WORKTREE_INSTALL_CMD", "pwd > installed_here")
        .args(["worktree", "switch", "toolbox-wip"])
        .assert()
        .success();

    let marker = root.join("toolbox-wip/installed_here");
    assert!(marker.exists(), "install command must run in the worktree");
    let recorded = fs::read_to_string(&marker).unwrap();
    assert!(
        Path::new(recorded.trim()).ends_with("toolbox-wip"),
        "got: {recorded}"
    );
}
