//! # git-coauthor
//!
//! Manages `Co-authored-by:` trailers for Git commits.
//!
//! This crate provides functionality to:
//! - Add, list or delete coauthor trailers on the most recent commit
//! - Keep alias-to-identity maps in a repository or user `.git-coauthors` file
//! - Run a coauthor session that pre-fills the commit template until cleared
//!
//! ## Usage
//!
//! ```bash
//! # Add coauthors to the previous commit
//! git coauthor foo bar
//!
//! # Configure an alias for the current repository
//! git coauthor --config "foo: Foo <foo@bar.com>"
//!
//! # Pre-fill every following commit until the session is deleted
//! git coauthor --session foo
//! git coauthor --session --delete
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface and main entry point
//! - [`command`] - Flag resolution and operation dispatch
//! - [`commit`] - Trailer edits on the previous commit
//! - [`config`] - Alias files and alias resolution
//! - [`session`] - Session commit template management
//! - [`trailer`] - Trailer detection, sorting and rendering
//! - [`git`] - Git command wrappers
//! - [`error`] - Error type shared by all modules

pub mod cli;
pub mod command;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod session;
pub mod trailer;
