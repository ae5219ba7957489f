use std::path::PathBuf;

use thiserror::Error;

/// Every way a `git-coauthor` invocation can fail.
///
/// All variants are fatal: the CLI prints `fatal: <message>` and exits with
/// status 1. The `Display` text of each variant is that message.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Usage(String),

    #[error("unexpected arguments or options")]
    UnexpectedArguments,

    #[error("invalid config")]
    InvalidConfig,

    #[error("invalid config file {path}: {reason}")]
    MalformedConfigFile { path: PathBuf, reason: String },

    #[error("invalid coauthor: {0}")]
    InvalidCoauthor(String),

    #[error("cannot read the previous commit message")]
    ReadCommit,

    #[error("cannot amend the previous commit message")]
    AmendCommit,

    #[error("commit template not found: {0}")]
    TemplateNotFound(String),

    #[error("git commit template does not exist: {0}")]
    SessionTemplateMissing(String),

    #[error("failed to set commit.template.backup to {0}")]
    SetTemplateBackup(String),

    #[error("cannot set git commit template")]
    SetTemplate,

    #[error("failed to restore git commit template to {0}")]
    RestoreTemplate(String),

    #[error("failed to unset git commit template backup")]
    UnsetTemplateBackup,

    #[error("failed to unset git commit template")]
    UnsetTemplate,

    #[error("could not install git-coauthor")]
    Install,

    #[error("`git` not found in PATH")]
    GitNotFound,

    #[error("cannot determine home directory")]
    HomeNotFound,

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot remove {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot determine working directory: {0}")]
    WorkingDirectory(std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
