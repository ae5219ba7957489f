use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Sandbox {
    _dir: TempDir,
    home: PathBuf,
    project: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = dir.path().join("home");
        let project = dir.path().join("project");
        fs::create_dir_all(&home).expect("failed to create home");
        fs::create_dir_all(&project).expect("failed to create project");
        Sandbox {
            _dir: dir,
            home,
            project,
        }
    }

    // `Command::cargo_bin` is deprecated on newer assert_cmd releases.
    #[allow(deprecated)]
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("git-coauthor").expect("binary not built");
        cmd.current_dir(&self.project)
            .env("HOME", &self.home)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GIT_AUTHOR_NAME", "Tester")
            .env("GIT_AUTHOR_EMAIL", "tester@example.com")
            .env("GIT_COMMITTER_NAME", "Tester")
            .env("GIT_COMMITTER_EMAIL", "tester@example.com")
            .env_remove("GIT_COAUTHOR_LOG");
        cmd
    }

    fn git(&self, args: &[&str]) -> String {
        let out = std::process::Command::new("git")
            .args(args)
            .current_dir(&self.project)
            .env("HOME", &self.home)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GIT_AUTHOR_NAME", "Tester")
            .env("GIT_AUTHOR_EMAIL", "tester@example.com")
            .env("GIT_COMMITTER_NAME", "Tester")
            .env("GIT_COMMITTER_EMAIL", "tester@example.com")
            .output()
            .expect("failed to run git");
        assert!(out.status.success(), "git {:?} failed", args);
        String::from_utf8_lossy(&out.stdout).into_owned()
    }

    fn init_repo(&self, message: &str) {
        self.git(&["init", "--quiet"]);
        fs::write(self.project.join("file.txt"), "hello\n").expect("write failed");
        self.git(&["add", "file.txt"]);
        self.git(&["commit", "--quiet", "--message", message]);
    }
}

fn git_available() -> bool {
    which::which("git").is_ok()
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read failed")
}

#[test]
fn version_flag_prints_version() {
    Sandbox::new()
        .cmd()
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "git-coauthor version {}\n",
            env!("CARGO_PKG_VERSION")
        )))
        .stderr("");
}

#[test]
fn help_flag_prints_help() {
    Sandbox::new()
        .cmd()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Manages Git coauthors."))
        .stderr("");
}

#[test]
fn version_and_help_win_over_later_bad_flags() {
    Sandbox::new()
        .cmd()
        .args(["-v", "--bogus"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "git-coauthor version {}\n",
            env!("CARGO_PKG_VERSION")
        )))
        .stderr("");

    Sandbox::new()
        .cmd()
        .args(["-sh", "--bogus", "--session=1"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Manages Git coauthors."))
        .stderr("");
}

#[test]
fn bad_flag_before_version_is_fatal() {
    Sandbox::new()
        .cmd()
        .args(["--bogus", "-v"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::starts_with("fatal: ").and(predicate::str::contains("--bogus")));
}

#[test]
fn unknown_flag_is_fatal() {
    Sandbox::new()
        .cmd()
        .arg("--foo")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::starts_with("fatal: ").and(predicate::str::contains("--foo")));
}

#[test]
fn flag_with_inline_value_is_fatal() {
    Sandbox::new()
        .cmd()
        .arg("--session=1")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::starts_with("fatal: "));
}

#[test]
fn session_and_config_together_are_fatal() {
    Sandbox::new()
        .cmd()
        .args(["--session", "--config"])
        .assert()
        .code(1)
        .stdout("")
        .stderr("fatal: unexpected arguments or options\n");
}

#[test]
fn global_without_config_is_fatal() {
    Sandbox::new()
        .cmd()
        .args(["--global", "--session"])
        .assert()
        .code(1)
        .stderr("fatal: unexpected arguments or options\n");
}

#[test]
fn local_config_add_list_delete() {
    let sb = Sandbox::new();
    let file = sb.project.join(".git-coauthors");

    sb.cmd()
        .args(["--config", "foo: Foo <foo@bar.com>", "bar: Bar <bar@bar.com>"])
        .assert()
        .success()
        .stdout(".git-coauthors:\n  bar: Bar <bar@bar.com>\n  foo: Foo <foo@bar.com>\n");
    assert_eq!(read(&file), "bar: Bar <bar@bar.com>\nfoo: Foo <foo@bar.com>\n");

    sb.cmd()
        .args(["--config", "--delete", "foo"])
        .assert()
        .success()
        .stdout(".git-coauthors:\n  bar: Bar <bar@bar.com>\n");
    assert_eq!(read(&file), "bar: Bar <bar@bar.com>\n");

    sb.cmd()
        .args(["-c", "-d"])
        .assert()
        .success()
        .stdout(".git-coauthors:\n");
    assert_eq!(read(&file), "\n");

    sb.cmd()
        .arg("--config")
        .assert()
        .success()
        .stdout(".git-coauthors:\n");
}

#[test]
fn invalid_config_pair_writes_nothing() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["--config", "foo: Foo <foo@bar.com>", "bar"])
        .assert()
        .code(1)
        .stdout("")
        .stderr("fatal: invalid config\n");
    assert!(!sb.project.join(".git-coauthors").exists());
}

#[test]
fn global_config_reports_full_path() {
    let sb = Sandbox::new();
    let file = sb.home.join(".git-coauthors");
    sb.cmd()
        .args(["--config", "--global", "foo: Foo <foo@bar.com>"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}:\n  foo: Foo <foo@bar.com>\n",
            file.display()
        )));
    assert_eq!(read(&file), "foo: Foo <foo@bar.com>\n");
    assert!(!sb.project.join(".git-coauthors").exists());
}

#[test]
fn commit_add_list_and_delete() {
    if !git_available() {
        return;
    }
    let sb = Sandbox::new();
    sb.init_repo("Foo\n\nBar");
    fs::write(sb.home.join(".git-coauthors"), "foo: Foo <foo@bar.com>\n").expect("write failed");

    sb.cmd()
        .arg("foo")
        .assert()
        .success()
        .stdout("Commit:\n  Co-authored-by: Foo <foo@bar.com>\n");
    assert_eq!(
        sb.git(&["log", "--format=%B", "--max-count=1"]).trim_end(),
        "Foo\n\nBar\n\nCo-authored-by: Foo <foo@bar.com>"
    );

    sb.cmd()
        .assert()
        .success()
        .stdout("Commit:\n  Co-authored-by: Foo <foo@bar.com>\n");

    sb.cmd().arg("-d").assert().success().stdout("Commit:\n");
    assert_eq!(
        sb.git(&["log", "--format=%B", "--max-count=1"]).trim_end(),
        "Foo\n\nBar"
    );
}

#[test]
fn unknown_alias_leaves_commit_alone() {
    if !git_available() {
        return;
    }
    let sb = Sandbox::new();
    sb.init_repo("Foo");
    let before = sb.git(&["rev-parse", "HEAD"]);

    sb.cmd()
        .arg("nope")
        .assert()
        .code(1)
        .stdout("")
        .stderr("fatal: invalid coauthor: nope\n");
    assert_eq!(sb.git(&["rev-parse", "HEAD"]), before);
}

#[test]
fn session_lifecycle_restores_previous_template() {
    if !git_available() {
        return;
    }
    let sb = Sandbox::new();
    sb.init_repo("Foo");
    fs::write(
        sb.project.join(".git-coauthors"),
        "bar: Bar <bar@bar.com>\nfoo: Foo <foo@bar.com>\n",
    )
    .expect("write failed");
    fs::write(sb.project.join("moo"), "Subject\n").expect("write failed");
    sb.git(&["config", "commit.template", "moo"]);

    sb.cmd()
        .args(["--session", "foo", "bar"])
        .assert()
        .success()
        .stdout("Session:\n  Co-authored-by: Bar <bar@bar.com>\n  Co-authored-by: Foo <foo@bar.com>\n");
    assert_eq!(
        read(&sb.project.join(".git-coauthors-template")),
        "Subject\n\nCo-authored-by: Bar <bar@bar.com>\nCo-authored-by: Foo <foo@bar.com>\n"
    );
    assert_eq!(sb.git(&["config", "commit.template"]).trim(), ".git-coauthors-template");
    assert_eq!(sb.git(&["config", "commit.template.backup"]).trim(), "moo");

    sb.cmd()
        .arg("-s")
        .assert()
        .success()
        .stdout("Session:\n  Co-authored-by: Bar <bar@bar.com>\n  Co-authored-by: Foo <foo@bar.com>\n");

    sb.cmd()
        .args(["--session", "--delete"])
        .assert()
        .success()
        .stdout("Session:\n");
    assert!(!sb.project.join(".git-coauthors-template").exists());
    assert_eq!(sb.git(&["config", "commit.template"]).trim(), "moo");
}
