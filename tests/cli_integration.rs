//! CLI integration tests.
//!
//! These tests run the built binary against real git repositories. The
//! `diff` tests substitute a shell script for `go` that prints the
//! repository's `bench.txt`, so the comparison sees whatever content the
//! checked-out revision has.

use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for running benchdiff with no user config in scope.
fn benchdiff(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("benchdiff").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("BENCHDIFF_CONFIG");
    cmd
}

fn run_git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A repository with `bench.txt` committed.
fn repo_with_results(results: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    run_git(dir.path(), &["init", "--quiet"]);
    run_git(dir.path(), &["config", "user.email", "test@example.com"]);
    run_git(dir.path(), &["config", "user.name", "Test User"]);
    fs::write(dir.path().join("bench.txt"), results).unwrap();
    run_git(dir.path(), &["add", "bench.txt"]);
    run_git(dir.path(), &["commit", "--quiet", "-m", "results"]);
    dir
}

#[cfg(unix)]
fn fake_go(dir: &Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-go");
    fs::write(&path, "#!/bin/sh\ncat bench.txt\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn help_flag_works() {
    let home = TempDir::new().unwrap();
    benchdiff(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Compare benchmark results between a git ref and the current worktree",
        ));
}

#[test]
fn version_flag_works() {
    let home = TempDir::new().unwrap();
    benchdiff(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("benchdiff "));
}

#[test]
fn completion_generates_script() {
    let home = TempDir::new().unwrap();
    benchdiff(home.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_benchdiff"));
}

#[test]
fn stat_compares_files() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("old.txt"), "BenchmarkA-8 100 10 ns/op\n").unwrap();
    fs::write(dir.path().join("new.txt"), "BenchmarkA-8 100 15 ns/op\n").unwrap();

    benchdiff(home.path())
        .current_dir(dir.path())
        .args(["stat", "old.txt", "new.txt", "--delta-test", "none", "--format", "csv"])
        .assert()
        .success()
        .stdout(
            "name,old time/op (ns/op),±,new time/op (ns/op),±,delta,note\n\
             A-8,10.000000,0%,15.000000,0%,+50.00%,(n=1+1)\n",
        );
}

#[test]
fn stat_writes_output_file() {
    use assert_fs::prelude::*;

    let home = TempDir::new().unwrap();
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("a.txt").write_str("BenchmarkA 1 10 ns/op\n").unwrap();
    dir.child("b.txt").write_str("BenchmarkA 1 10 ns/op\n").unwrap();

    benchdiff(home.path())
        .current_dir(dir.path())
        .args(["stat", "a.txt", "b.txt", "--format", "html", "-o", "out.html"])
        .assert()
        .success()
        .stdout("");

    dir.child("out.html")
        .assert(predicate::str::contains("<table class='benchstat'>"));
}

#[test]
fn stat_missing_file_fails() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();

    benchdiff(home.path())
        .current_dir(dir.path())
        .args(["stat", "nope.txt", "nope2.txt"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("error: Failed to read results from nope.txt"));
}

#[test]
fn config_shows_repo_settings() {
    let home = TempDir::new().unwrap();
    let repo = repo_with_results("");
    fs::write(repo.path().join(".benchdiff.toml"), "base_ref = \"main\"\ngeomean = true\n").unwrap();

    benchdiff(home.path())
        .arg("--cwd")
        .arg(repo.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("base_ref = \"main\"").and(predicate::str::contains("geomean = true")));
}

#[test]
fn config_rejects_unknown_keys() {
    let home = TempDir::new().unwrap();
    let repo = repo_with_results("");
    fs::write(repo.path().join(".benchdiff.toml"), "colour = \"red\"\n").unwrap();

    benchdiff(home.path())
        .arg("--cwd")
        .arg(repo.path())
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}

#[test]
fn diff_outside_repository_fails() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();

    benchdiff(home.path())
        .arg("--cwd")
        .arg(dir.path())
        .args(["-q", "diff"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("not a git repository"));
}

#[cfg(unix)]
#[test]
fn diff_compares_worktree_with_base() {
    let home = TempDir::new().unwrap();
    let tools = TempDir::new().unwrap();
    let go = fake_go(tools.path());
    let repo = repo_with_results("BenchmarkA 1 10 ns/op\n");
    fs::write(repo.path().join("bench.txt"), "BenchmarkA 1 20 ns/op\n").unwrap();

    benchdiff(home.path())
        .arg("--cwd")
        .arg(repo.path())
        .args(["-q", "diff", "--delta-test", "none", "--format", "csv", "--go-cmd"])
        .arg(&go)
        .assert()
        .success()
        .stdout(
            "name,base time/op (ns/op),±,head time/op (ns/op),±,delta,note\n\
             A,10.000000,0%,20.000000,0%,+100.00%,(n=1+1)\n",
        );

    assert_eq!(
        fs::read_to_string(repo.path().join("bench.txt")).unwrap(),
        "BenchmarkA 1 20 ns/op\n"
    );
}

#[cfg(unix)]
#[test]
fn diff_text_report_names_revisions() {
    let home = TempDir::new().unwrap();
    let tools = TempDir::new().unwrap();
    let go = fake_go(tools.path());
    let repo = repo_with_results("BenchmarkA 1 10 ns/op\n");
    fs::write(repo.path().join("bench.txt"), "BenchmarkA 1 5 ns/op\n").unwrap();

    benchdiff(home.path())
        .arg("--cwd")
        .arg(repo.path())
        .args(["-q", "diff", "--delta-test", "none", "--go-cmd"])
        .arg(&go)
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("base: HEAD (")
                .and(predicate::str::contains("+ uncommitted changes"))
                .and(predicate::str::contains("-50.00%")),
        );
}

#[cfg(unix)]
#[test]
fn diff_tolerance_fails_on_regression() {
    let home = TempDir::new().unwrap();
    let tools = TempDir::new().unwrap();
    let go = fake_go(tools.path());
    let repo = repo_with_results("BenchmarkA 1 10 ns/op\n");
    fs::write(repo.path().join("bench.txt"), "BenchmarkA 1 20 ns/op\n").unwrap();

    benchdiff(home.path())
        .arg("--cwd")
        .arg(repo.path())
        .args(["-q", "diff", "--delta-test", "none", "--tolerance", "50", "--go-cmd"])
        .arg(&go)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("+100.00%"))
        .stderr(predicate::str::contains("regression beyond 50%: A time/op: +100.00%"));
}

#[cfg(unix)]
#[test]
fn diff_bad_base_ref_writes_nothing() {
    let home = TempDir::new().unwrap();
    let tools = TempDir::new().unwrap();
    let go = fake_go(tools.path());
    let repo = repo_with_results("BenchmarkA 1 10 ns/op\n");

    benchdiff(home.path())
        .arg("--cwd")
        .arg(repo.path())
        .args(["-q", "diff", "--base-ref", "does-not-exist", "--go-cmd"])
        .arg(&go)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("does-not-exist"));
}
