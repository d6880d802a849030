//! Integration tests for running operations at another revision.
//!
//! These tests use real git repositories created via tempfile and check
//! that the worktree, index, untracked files and HEAD come back exactly as
//! they were, whatever the operation does. Untracked files stay on disk
//! while the operation runs.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use benchdiff::git::{RefRunner, RunAtRefError, Step};
use benchdiff::ui::output::Verbosity;

/// Test fixture that creates a real git repository.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new test repository with `foo` committed.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "--quiet"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        run_git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);

        fs::write(dir.path().join("foo"), "OG content").unwrap();
        run_git(dir.path(), &["add", "foo"]);
        run_git(dir.path(), &["commit", "--quiet", "-m", "Initial commit"]);

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn runner(&self) -> RefRunner {
        RefRunner::with_program("git", self.path(), Verbosity::Quiet)
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).unwrap()
    }

    fn write(&self, name: &str, content: &str) {
        fs::write(self.path().join(name), content).unwrap();
    }

    fn commit_file(&self, name: &str, content: &str) {
        self.write(name, content);
        run_git(self.path(), &["add", name]);
        run_git(self.path(), &["commit", "--quiet", "-m", name]);
    }

    fn git_output(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("git command failed");
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }

    fn head(&self) -> String {
        self.git_output(&["rev-parse", "HEAD"])
    }

    fn branch(&self) -> String {
        self.git_output(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn status(&self) -> String {
        self.git_output(&["status", "--porcelain=v1", "--untracked-files=all"])
    }

    fn stash_count(&self) -> usize {
        self.git_output(&["stash", "list"]).lines().count()
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

#[test]
fn operation_sees_committed_content() {
    let repo = TestRepo::new();
    repo.write("foo", "new content");
    repo.write("untracked", "untracked");
    let status_before = repo.status();

    let seen = repo
        .runner()
        .run_at_ref("HEAD", || -> Result<_, std::io::Error> {
            let foo = fs::read_to_string(repo.path().join("foo"))?;
            let untracked = fs::read_to_string(repo.path().join("untracked"))?;
            Ok((foo, untracked))
        })
        .unwrap();

    assert_eq!(seen, ("OG content".to_string(), "untracked".to_string()));
    assert_eq!(repo.read("foo"), "new content");
    assert_eq!(repo.read("untracked"), "untracked");
    assert_eq!(repo.status(), status_before);
    assert_eq!(repo.branch(), "main");
    assert_eq!(repo.stash_count(), 0);
}

#[test]
fn checks_out_older_revision() {
    let repo = TestRepo::new();
    let first = repo.head();
    repo.commit_file("foo", "second");
    let second = repo.head();

    let seen = repo
        .runner()
        .run_at_ref(&first, || -> Result<_, std::io::Error> {
            fs::read_to_string(repo.path().join("foo"))
        })
        .unwrap();

    assert_eq!(seen, "OG content");
    assert_eq!(repo.read("foo"), "second");
    assert_eq!(repo.head(), second);
    assert_eq!(repo.branch(), "main");
}

#[test]
fn staged_changes_stay_staged() {
    let repo = TestRepo::new();
    repo.write("foo", "staged");
    run_git(repo.path(), &["add", "foo"]);
    repo.write("foo", "staged then edited");
    let status_before = repo.status();
    assert_eq!(status_before, "MM foo");

    repo.runner()
        .run_at_ref("HEAD", || Ok::<_, std::io::Error>(()))
        .unwrap();

    assert_eq!(repo.status(), status_before);
    assert_eq!(repo.read("foo"), "staged then edited");
    assert_eq!(repo.git_output(&["show", ":foo"]), "staged");
}

#[test]
fn operation_error_still_restores() {
    let repo = TestRepo::new();
    repo.write("foo", "dirty");
    repo.write("untracked", "u");

    let err = repo
        .runner()
        .run_at_ref("HEAD", || Err::<(), _>("benchmarks exploded"))
        .unwrap_err();

    match err {
        RunAtRefError::Operation { refname, source } => {
            assert_eq!(refname, "HEAD");
            assert_eq!(source, "benchmarks exploded");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(repo.read("foo"), "dirty");
    assert_eq!(repo.read("untracked"), "u");
    assert_eq!(repo.branch(), "main");
    assert_eq!(repo.stash_count(), 0);
}

#[test]
fn operation_panic_still_restores() {
    let repo = TestRepo::new();
    repo.write("foo", "dirty");
    let runner = repo.runner();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = runner.run_at_ref("HEAD", || -> Result<(), std::io::Error> { panic!("boom") });
    }));

    assert!(result.is_err());
    assert_eq!(repo.read("foo"), "dirty");
    assert_eq!(repo.branch(), "main");
    assert_eq!(repo.stash_count(), 0);
}

#[test]
fn bad_ref_fails_at_checkout_and_restores() {
    let repo = TestRepo::new();
    repo.write("foo", "dirty");
    repo.write("untracked", "u");
    let status_before = repo.status();

    let mut ran = false;
    let err = repo
        .runner()
        .run_at_ref("no-such-ref", || {
            ran = true;
            Ok::<_, std::io::Error>(())
        })
        .unwrap_err();

    assert!(!ran);
    assert_eq!(err.step(), Some(Step::Checkout));
    assert_eq!(repo.status(), status_before);
    assert_eq!(repo.read("foo"), "dirty");
    assert_eq!(repo.branch(), "main");
    assert_eq!(repo.stash_count(), 0);
}

#[test]
fn untracked_file_in_the_way_fails_checkout_and_restores() {
    let repo = TestRepo::new();
    let first = repo.head();
    repo.commit_file("extra", "tracked later");
    let second = repo.head();
    run_git(repo.path(), &["reset", "--quiet", "--hard", &first]);
    repo.write("extra", "mine");
    repo.write("foo", "dirty");
    let status_before = repo.status();

    let mut ran = false;
    let err = repo
        .runner()
        .run_at_ref(&second, || {
            ran = true;
            Ok::<_, std::io::Error>(())
        })
        .unwrap_err();

    assert!(!ran);
    assert_eq!(err.step(), Some(Step::Checkout));
    assert_eq!(repo.read("extra"), "mine");
    assert_eq!(repo.read("foo"), "dirty");
    assert_eq!(repo.status(), status_before);
    assert_eq!(repo.head(), first);
    assert_eq!(repo.stash_count(), 0);
}

#[test]
fn only_untracked_files_creates_no_stash() {
    let repo = TestRepo::new();
    repo.write("untracked", "u");

    let seen = repo
        .runner()
        .run_at_ref("HEAD", || -> Result<_, std::io::Error> {
            fs::read_to_string(repo.path().join("untracked"))
        })
        .unwrap();

    assert_eq!(seen, "u");
    assert_eq!(repo.status(), "?? untracked");
    assert_eq!(repo.stash_count(), 0);
}

#[test]
fn clean_worktree_creates_no_stash() {
    let repo = TestRepo::new();
    repo.commit_file("foo", "second");

    let seen = repo
        .runner()
        .run_at_ref("HEAD~1", || -> Result<_, std::io::Error> {
            fs::read_to_string(repo.path().join("foo"))
        })
        .unwrap();

    assert_eq!(seen, "OG content");
    assert_eq!(repo.read("foo"), "second");
    assert_eq!(repo.status(), "");
    assert_eq!(repo.stash_count(), 0);
}

#[test]
fn existing_stashes_are_left_alone() {
    let repo = TestRepo::new();
    repo.write("foo", "older stash");
    run_git(repo.path(), &["stash", "push", "--quiet", "-m", "mine"]);
    repo.write("foo", "dirty");

    repo.runner()
        .run_at_ref("HEAD", || Ok::<_, std::io::Error>(()))
        .unwrap();

    assert_eq!(repo.read("foo"), "dirty");
    assert_eq!(repo.stash_count(), 1);
    assert!(repo.git_output(&["stash", "list"]).contains("mine"));
}

#[test]
fn detached_head_is_restored() {
    let repo = TestRepo::new();
    let first = repo.head();
    repo.commit_file("foo", "second");
    run_git(repo.path(), &["checkout", "--quiet", "--detach", &first]);
    repo.write("foo", "dirty");

    repo.runner()
        .run_at_ref("main", || -> Result<_, std::io::Error> {
            assert_eq!(fs::read_to_string(repo.path().join("foo"))?, "second");
            Ok(())
        })
        .unwrap();

    assert_eq!(repo.branch(), "HEAD");
    assert_eq!(repo.head(), first);
    assert_eq!(repo.read("foo"), "dirty");
}

#[test]
fn repeated_runs_are_idempotent() {
    let repo = TestRepo::new();
    repo.write("foo", "dirty");
    repo.write("untracked", "u");
    let status_before = repo.status();
    let runner = repo.runner();

    for _ in 0..3 {
        runner
            .run_at_ref("HEAD", || Ok::<_, std::io::Error>(()))
            .unwrap();
        assert_eq!(repo.status(), status_before);
    }
    assert_eq!(repo.stash_count(), 0);
}

#[test]
fn missing_git_fails_before_touching_anything() {
    let repo = TestRepo::new();
    repo.write("foo", "dirty");
    let runner = RefRunner::with_program("benchdiff-no-such-git", repo.path(), Verbosity::Quiet);

    let err = runner
        .run_at_ref("HEAD", || Ok::<_, std::io::Error>(()))
        .unwrap_err();

    assert_eq!(err.step(), Some(Step::ResolveOriginal));
    assert_eq!(repo.read("foo"), "dirty");
}
