use std::process::{Command, Stdio};

use tracing::debug;

/// Git config key holding the commit template path.
pub const TEMPLATE_KEY: &str = "commit.template";

/// Git config key recording the template that was active before a session began.
pub const TEMPLATE_BACKUP_KEY: &str = "commit.template.backup";

/// Narrow view of the `git` operations this tool needs.
///
/// Every method reports plain success or failure; callers decide which
/// [`crate::error::Error`] a failure maps to. The trait exists so the
/// transforms can run against an in-memory fake in tests.
pub trait Git {
    /// Reads the full message of the most recent commit.
    ///
    /// # Returns
    ///
    /// * `Some(message)` with the raw, untrimmed message text.
    /// * `None` if there is no commit or `git log` fails.
    fn commit_message(&mut self) -> Option<String>;

    /// Replaces the most recent commit's message without running hooks.
    ///
    /// Only the message changes; staged changes are not folded in.
    ///
    /// # Parameters
    ///
    /// * `message`: The complete new commit message.
    ///
    /// # Returns
    ///
    /// * `true` if the amend succeeded, `false` otherwise.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// if !git.amend_commit_message("Subject\n\nCo-authored-by: Foo <foo@bar.com>\n") {
    ///     return Err(Error::AmendCommit);
    /// }
    /// ```
    fn amend_commit_message(&mut self, message: &str) -> bool;

    /// Looks up a git config value.
    ///
    /// # Parameters
    ///
    /// * `key`: Config key, e.g. `commit.template`.
    ///
    /// # Returns
    ///
    /// * `Some(value)` with surrounding whitespace trimmed.
    /// * `None` when the key is unset or git fails.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// match git.config_get(TEMPLATE_KEY) {
    ///     Some(path) => println!("template: {path}"),
    ///     None => println!("no template"),
    /// }
    /// ```
    fn config_get(&mut self, key: &str) -> Option<String>;

    /// Sets a git config value in the repository's config.
    ///
    /// # Parameters
    ///
    /// * `key`: Config key to write.
    /// * `value`: Value to store, passed to git as a single argument.
    ///
    /// # Returns
    ///
    /// * `true` if git accepted the write, `false` otherwise.
    fn config_set(&mut self, key: &str, value: &str) -> bool;

    /// Removes a git config value from the repository's config.
    ///
    /// # Parameters
    ///
    /// * `key`: Config key to remove.
    ///
    /// # Returns
    ///
    /// * `true` if the key existed and was removed, `false` otherwise.
    fn config_unset(&mut self, key: &str) -> bool;

    /// Registers the global `git coauthor` alias.
    fn install_alias(&mut self) -> bool;
}

/// [`Git`] implementation that runs the `git` executable found on `PATH`.
///
/// Arguments are always passed as separate argv entries, never through a
/// shell, so identities and paths containing shell metacharacters are safe.
pub struct SystemGit;

/// Runs a git (or other) command and reports only whether it succeeded.
///
/// Spawn failures are treated the same as a non-zero exit. The command and
/// its exit status are logged at `debug` level.
///
/// # Parameters
///
/// * `cmd`: A fully configured [`std::process::Command`] to run.
///
/// # Returns
///
/// * `true` if the command started and exited with status `0`.
/// * `false` otherwise.
///
/// # Examples
///
/// ```ignore
/// let cmd = git(&["config", "--unset", "commit.template"]);
/// if !run_status(cmd) {
///     return Err(Error::UnsetTemplate);
/// }
/// ```
fn run_status(mut cmd: Command) -> bool {
    debug!(command = ?cmd, "running git");
    match cmd.status() {
        Ok(status) => {
            debug!(%status, "git finished");
            status.success()
        }
        Err(e) => {
            debug!(error = %e, "git failed to start");
            false
        }
    }
}

/// Runs a command and returns its standard output when it exits successfully.
///
/// Output is converted lossily to UTF-8 and left untrimmed; callers decide
/// how much surrounding whitespace matters.
///
/// # Parameters
///
/// * `cmd`: A fully configured [`std::process::Command`] ready to execute.
///
/// # Returns
///
/// * `Some(stdout)` if the command exited with status `0`.
/// * `None` if it exited non-zero or failed to start.
///
/// # Examples
///
/// ```ignore
/// let message = run_output(git(&["log", "--format=%B", "--max-count=1", "HEAD"]));
/// assert!(message.is_some());
/// ```
fn run_output(mut cmd: Command) -> Option<String> {
    debug!(command = ?cmd, "running git");
    match cmd.output() {
        Ok(out) => {
            debug!(status = %out.status, "git finished");
            if out.status.success() {
                Some(String::from_utf8_lossy(&out.stdout).into_owned())
            } else {
                None
            }
        }
        Err(e) => {
            debug!(error = %e, "git failed to start");
            None
        }
    }
}

/// Builds a `git` command with quiet output streams.
fn git(args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    cmd.args(args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::null());
    cmd
}

impl Git for SystemGit {
    fn commit_message(&mut self) -> Option<String> {
        run_output(git(&["log", "--format=%B", "--max-count=1", "HEAD"]))
    }

    fn amend_commit_message(&mut self, message: &str) -> bool {
        let mut cmd = git(&["commit", "--amend", "--only", "--no-verify", "--message"]);
        cmd.arg(message);
        cmd.stdout(Stdio::null());
        run_status(cmd)
    }

    fn config_get(&mut self, key: &str) -> Option<String> {
        run_output(git(&["config", "--get", key])).map(|value| value.trim().to_string())
    }

    fn config_set(&mut self, key: &str, value: &str) -> bool {
        let mut cmd = git(&["config", key, value]);
        cmd.stdout(Stdio::null());
        run_status(cmd)
    }

    fn config_unset(&mut self, key: &str) -> bool {
        let mut cmd = git(&["config", "--unset", key]);
        cmd.stdout(Stdio::null());
        run_status(cmd)
    }

    fn install_alias(&mut self) -> bool {
        let mut cmd = git(&["config", "--global", "alias.coauthor", "!git-coauthor"]);
        cmd.stdout(Stdio::null());
        run_status(cmd)
    }
}
