use crate::command::{Flags, Operation};
use crate::config::Locations;
use crate::error::{Error, Result};
use crate::git::{Git, SystemGit};

use clap::Parser;
use console::style;
use std::env;
use std::ffi::OsString;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the `tracing` filter, e.g. `debug`.
pub const LOG_ENV: &str = "GIT_COAUTHOR_LOG";

/// Raw command-line flags.
///
/// clap's own help and version flags are disabled so `-h` and `-v` can
/// print exactly what this tool promises.
#[derive(Parser, Debug)]
#[command(
    name = "git-coauthor",
    disable_help_flag = true,
    disable_version_flag = true,
    color = clap::ColorChoice::Never
)]
struct Args {
    /// Aliases, or `alias: Name <email>` pairs with `--config`.
    args: Vec<String>,

    #[arg(short, long)]
    delete: bool,

    #[arg(short, long)]
    session: bool,

    #[arg(short, long)]
    config: bool,

    #[arg(short, long)]
    global: bool,

    #[arg(short, long)]
    version: bool,

    #[arg(short = 'h')]
    help: bool,

    #[arg(long)]
    install: bool,
}

/// What a parsed command line asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Version,
    Install,
    Run(Operation),
}

/// Parses `argv` (program name first) into an [`Invocation`].
///
/// `-h`, `-v` and `--install` win over everything else. A `-h` or `-v`
/// takes effect as soon as it is seen, so flags after it are never checked.
/// Parser failures become [`Error::Usage`] carrying clap's one-line reason.
///
/// # Parameters
///
/// * `argv`: The full argument vector, program name first.
///
/// # Returns
///
/// * `Ok(Invocation)` describing what to run.
/// * `Err(Error::Usage)` for flags clap rejects.
/// * `Err(Error::UnexpectedArguments)` for flag combinations no operation
///   accepts.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse(["git-coauthor", "-v", "--bogus"])?, Invocation::Version);
/// assert!(parse(["git-coauthor", "--bogus", "-v"]).is_err());
/// ```
pub fn parse<I, T>(argv: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    if let Some(early) = early_exit(&argv) {
        return Ok(early);
    }

    let args = Args::try_parse_from(argv).map_err(|e| Error::Usage(usage_reason(&e)))?;

    if args.help {
        return Ok(Invocation::Help);
    }
    if args.version {
        return Ok(Invocation::Version);
    }
    if args.install {
        return Ok(Invocation::Install);
    }

    let flags = Flags {
        delete: args.delete,
        session: args.session,
        config: args.config,
        global: args.global,
    };
    Operation::resolve(flags, args.args).map(Invocation::Run)
}

/// Scans flags in order for `-h` or `-v`, stopping at the first token the
/// parser would reject and at `--`.
///
/// Short flags may be clustered (`-sv`); letters are read left to right.
fn early_exit(argv: &[OsString]) -> Option<Invocation> {
    for arg in argv.iter().skip(1) {
        let arg = arg.to_str()?;
        match arg {
            "--" => return None,
            "--version" => return Some(Invocation::Version),
            "--delete" | "--session" | "--config" | "--global" | "--install" => {}
            long if long.starts_with("--") => return None,
            short if short.len() > 1 && short.starts_with('-') => {
                for flag in short.chars().skip(1) {
                    match flag {
                        'v' => return Some(Invocation::Version),
                        'h' => return Some(Invocation::Help),
                        'd' | 's' | 'c' | 'g' => {}
                        _ => return None,
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// Extracts the first line of a clap error without its `error: ` prefix.
fn usage_reason(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).trim().to_string()
}

/// Registers `git coauthor` as a global git alias.
pub fn install<G: Git>(git: &mut G) -> Result<String> {
    if git.install_alias() {
        Ok(String::new())
    } else {
        Err(Error::Install)
    }
}

/// Full help text printed by `-h`.
pub fn help_text() -> String {
    format!(
        "\
Manages Git coauthors.

Usage: git coauthor <args>

Installation:
    git-coauthor --install

Example Usage:
    git coauthor alias...                                   # Add one or more coauthors to the previous commit
    git coauthor                                            # List the coauthors on the previous commit
    git coauthor --delete                                   # Delete all coauthors from the previous commit
    git coauthor --delete alias...                          # Delete one or more coauthors from the previous commit

    git coauthor --config \"alias: Name <email>\"...          # Add a coauthor to the local config
    git coauthor --config --global \"alias: Name <email>\"... # Add a coauthor to the global config
    git coauthor --config                                   # List the local config
    git coauthor --config --global                          # List the global config
    git coauthor --config --delete                          # Delete the local config
    git coauthor --config --delete --global                 # Delete the global config
    git coauthor --config --delete alias...                 # Delete one or more coauthors from the local config
    git coauthor --config --delete --global alias...        # Delete one or more coauthors from the global config

    git coauthor --session alias...                         # Add one or more coauthors to the current session
    git coauthor --session                                  # List the coauthors in the current session
    git coauthor --session --delete                         # Delete the current session
    git coauthor --session --delete alias...                # Delete one or more coauthors from the current session

Options:
    -d, --delete       Delete coauthors
    -s, --session      Update, delete or print the session
    -c, --config       Update, delete or print configuration
    -g, --global       Update or print the global coauthor configuration
    -v, --version      Print version
    -h                 Print help
        --install      Register the `git coauthor` alias globally

Environment:
    {LOG_ENV}   tracing filter for diagnostics on stderr (default: off)
"
    )
}

/// Version line printed by `-v`.
pub fn version_text() -> String {
    format!("git-coauthor version {}\n", env!("CARGO_PKG_VERSION"))
}

/// Verifies `git` is available before shelling out to it.
fn verify_git() -> Result<()> {
    match which::which("git") {
        Ok(_) => Ok(()),
        Err(_) => Err(Error::GitNotFound),
    }
}

/// Installs the stderr `tracing` subscriber, filtered by [`LOG_ENV`].
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(console::colors_enabled_stderr())
        .with_target(false)
        .try_init();
}

/// Parses `argv`, runs the requested operation against the real environment,
/// and returns the text to print.
fn run(argv: Vec<String>) -> Result<String> {
    match parse(argv)? {
        Invocation::Help => Ok(help_text()),
        Invocation::Version => Ok(version_text()),
        Invocation::Install => {
            verify_git()?;
            install(&mut SystemGit)
        }
        Invocation::Run(op) => {
            if op.needs_git() {
                verify_git()?;
            }
            let locations = Locations::detect()?;
            op.execute(&mut SystemGit, &locations)
        }
    }
}

/// Main CLI entry point for `git-coauthor`.
///
/// Prints the report of the resolved operation to stdout and returns
/// `Ok(0)`. On any failure prints a single `fatal: <reason>` line to stderr
/// and returns `Err(())`; nothing is written to stdout in that case.
pub fn entry() -> std::result::Result<i32, ()> {
    init_logging();

    let argv: Vec<String> = env::args().collect();
    match run(argv) {
        Ok(report) => {
            print!("{report}");
            Ok(0)
        }
        Err(e) => {
            eprintln!("{}", style(format!("fatal: {e}")).for_stderr().red().bold());
            Err(())
        }
    }
}
