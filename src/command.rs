use tracing::debug;

use crate::config::{AliasBook, AliasFile, Locations};
use crate::error::{Error, Result};
use crate::git::Git;
use crate::{commit, session};

/// Which alias file a `--config` operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// `.git-coauthors` in the working directory.
    Local,
    /// `.git-coauthors` in the user's home directory.
    Global,
}

/// Flags that select an operation, as parsed from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub delete: bool,
    pub session: bool,
    pub config: bool,
    pub global: bool,
}

/// A fully resolved invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListCommit,
    AddToCommit(Vec<String>),
    ClearCommit,
    RemoveFromCommit(Vec<String>),
    ListConfig(Target),
    AddToConfig(Target, Vec<String>),
    ClearConfig(Target),
    RemoveFromConfig(Target, Vec<String>),
    ListSession,
    AddToSession(Vec<String>),
    ClearSession,
    RemoveFromSession(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Commit,
    Config,
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    List,
    Delete,
}

impl Operation {
    /// Classifies flags and positional arguments into one operation.
    ///
    /// `--session` and `--config` are mutually exclusive, and `--global` is
    /// only accepted together with `--config`.
    pub fn resolve(flags: Flags, args: Vec<String>) -> Result<Operation> {
        let scope = match (flags.session, flags.config) {
            (false, false) => Scope::Commit,
            (true, false) => Scope::Session,
            (false, true) => Scope::Config,
            (true, true) => return Err(Error::UnexpectedArguments),
        };
        let action = match (flags.delete, args.is_empty()) {
            (true, _) => Action::Delete,
            (false, false) => Action::Add,
            (false, true) => Action::List,
        };
        let target = if flags.global {
            Target::Global
        } else {
            Target::Local
        };

        let op = match (scope, action, target, args.is_empty()) {
            (Scope::Commit, Action::List, Target::Local, true) => Operation::ListCommit,
            (Scope::Commit, Action::Add, Target::Local, false) => Operation::AddToCommit(args),
            (Scope::Commit, Action::Delete, Target::Local, true) => Operation::ClearCommit,
            (Scope::Commit, Action::Delete, Target::Local, false) => {
                Operation::RemoveFromCommit(args)
            }
            (Scope::Config, Action::List, t, true) => Operation::ListConfig(t),
            (Scope::Config, Action::Add, t, false) => Operation::AddToConfig(t, args),
            (Scope::Config, Action::Delete, t, true) => Operation::ClearConfig(t),
            (Scope::Config, Action::Delete, t, false) => Operation::RemoveFromConfig(t, args),
            (Scope::Session, Action::List, Target::Local, true) => Operation::ListSession,
            (Scope::Session, Action::Add, Target::Local, false) => Operation::AddToSession(args),
            (Scope::Session, Action::Delete, Target::Local, true) => Operation::ClearSession,
            (Scope::Session, Action::Delete, Target::Local, false) => {
                Operation::RemoveFromSession(args)
            }
            _ => return Err(Error::UnexpectedArguments),
        };
        debug!(?op, "resolved operation");
        Ok(op)
    }

    /// Returns `true` if running this operation invokes `git`.
    pub fn needs_git(&self) -> bool {
        !matches!(
            self,
            Operation::ListConfig(_)
                | Operation::AddToConfig(..)
                | Operation::ClearConfig(_)
                | Operation::RemoveFromConfig(..)
        )
    }

    /// Runs the operation and returns the report to print on success.
    ///
    /// Nothing is printed here; a failure leaves stdout untouched.
    pub fn execute<G: Git>(self, git: &mut G, locations: &Locations) -> Result<String> {
        match self {
            Operation::ListCommit => commit::list(git),
            Operation::AddToCommit(aliases) => {
                commit::add(git, &AliasBook::load(locations)?, &aliases)
            }
            Operation::ClearCommit => commit::clear(git),
            Operation::RemoveFromCommit(aliases) => {
                commit::remove(git, &AliasBook::load(locations)?, &aliases)
            }
            Operation::ListConfig(target) => Ok(AliasFile::load(locations, target)?.report()),
            Operation::AddToConfig(target, pairs) => {
                let mut file = AliasFile::load(locations, target)?;
                file.add(&pairs)?;
                Ok(file.report())
            }
            Operation::ClearConfig(target) => {
                let mut file = AliasFile::load(locations, target)?;
                file.clear()?;
                Ok(file.report())
            }
            Operation::RemoveFromConfig(target, aliases) => {
                let mut file = AliasFile::load(locations, target)?;
                file.remove(&aliases)?;
                Ok(file.report())
            }
            Operation::ListSession => session::list(git, locations),
            Operation::AddToSession(aliases) => {
                session::add(git, locations, &AliasBook::load(locations)?, &aliases)
            }
            Operation::ClearSession => session::clear(git, locations),
            Operation::RemoveFromSession(aliases) => {
                session::remove(git, locations, &AliasBook::load(locations)?, &aliases)
            }
        }
    }
}
