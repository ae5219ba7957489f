use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::config::{AliasBook, Locations, write_file};
use crate::error::{Error, Result};
use crate::git::{Git, TEMPLATE_BACKUP_KEY, TEMPLATE_KEY};
use crate::trailer;

/// Name of the commit template file a session writes into the working directory.
pub const TEMPLATE_FILE_NAME: &str = ".git-coauthors-template";

const HEADER: &str = "Session";

/// What `commit.template` currently points at.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplateState {
    /// `commit.template` is unset.
    Unset,
    /// Some other template is configured.
    Foreign(String),
    /// The session template is configured.
    Active,
}

fn template_state<G: Git>(git: &mut G) -> TemplateState {
    let state = match git.config_get(TEMPLATE_KEY) {
        None => TemplateState::Unset,
        Some(path) if path == TEMPLATE_FILE_NAME => TemplateState::Active,
        Some(path) => TemplateState::Foreign(path),
    };
    debug!(?state, "commit template state");
    state
}

/// Resolves a template path the way git does for `commit.template`.
fn template_path(locations: &Locations, configured: &str) -> PathBuf {
    match configured.strip_prefix("~/") {
        Some(rest) => locations.home.join(rest),
        None => locations.cwd.join(configured),
    }
}

fn session_path(locations: &Locations) -> PathBuf {
    locations.cwd.join(TEMPLATE_FILE_NAME)
}

/// Reads a template file, mapping a missing file to `missing(configured)`.
fn read_template(
    locations: &Locations,
    configured: &str,
    missing: fn(String) -> Error,
) -> Result<String> {
    let path = template_path(locations, configured);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(missing(configured.to_string())),
        Err(source) => Err(Error::Read { path, source }),
    }
}

/// Splits template content into its non-trailer preamble and its trailers.
///
/// The preamble always has at least two lines: a subject slot and a blank line.
fn split_template(content: &str) -> (Vec<String>, BTreeSet<String>) {
    let lines = trailer::template_lines(content);
    let trailers = trailer::extract(content);
    let preamble = lines.into_iter().filter(|l| !trailer::is_trailer(l)).collect();
    (pad(preamble), trailers)
}

fn pad(mut preamble: Vec<String>) -> Vec<String> {
    while preamble.len() < 2 {
        preamble.push(String::new());
    }
    preamble
}

fn render(preamble: &[String], trailers: &BTreeSet<String>) -> String {
    let lines: Vec<&str> = preamble
        .iter()
        .chain(trailers.iter())
        .map(String::as_str)
        .collect();
    format!("{}\n", lines.join("\n"))
}

/// Reports the coauthors of the active session, if any.
pub fn list<G: Git>(git: &mut G, locations: &Locations) -> Result<String> {
    if template_state(git) != TemplateState::Active {
        return Ok(trailer::report(HEADER, &BTreeSet::<String>::new()));
    }
    let content = read_template(locations, TEMPLATE_FILE_NAME, Error::SessionTemplateMissing)?;
    Ok(trailer::report(HEADER, &trailer::extract(&content)))
}

/// Adds the coauthors behind `aliases` to the session, starting one if needed.
///
/// Starting a session over another template keeps that template's content as
/// the preamble and records its path in `commit.template.backup`.
///
/// # Parameters
///
/// * `git`: Git access used for the `commit.template` keys.
/// * `locations`: Working and home directories; the session file lives in
///   the working directory.
/// * `book`: Merged alias view used to resolve `aliases`.
/// * `aliases`: Aliases to add.
///
/// # Returns
///
/// * `Ok(report)` with the `Session:` report of every session trailer.
/// * `Err(Error::InvalidCoauthor)` for the first unknown alias; git config
///   and the working directory are left untouched.
/// * `Err(Error::TemplateNotFound)` if the configured template file is gone.
/// * `Err(Error::SetTemplateBackup)` or `Err(Error::SetTemplate)` if git
///   rejects a config write.
///
/// # Examples
///
/// ```ignore
/// let book = AliasBook::load(&locations)?;
/// let report = session::add(&mut SystemGit, &locations, &book, &["foo".to_string()])?;
/// print!("{report}");
/// ```
pub fn add<G: Git>(
    git: &mut G,
    locations: &Locations,
    book: &AliasBook,
    aliases: &[String],
) -> Result<String> {
    let resolved = book.resolve(aliases)?;

    let (preamble, mut trailers) = match template_state(git) {
        TemplateState::Unset => (pad(Vec::new()), BTreeSet::new()),
        TemplateState::Foreign(configured) => {
            let content = read_template(locations, &configured, Error::TemplateNotFound)?;
            if !git.config_set(TEMPLATE_BACKUP_KEY, &configured) {
                return Err(Error::SetTemplateBackup(configured));
            }
            debug!(backup = %configured, "saved previous commit template");
            (pad(trailer::template_lines(&content)), BTreeSet::new())
        }
        TemplateState::Active => {
            let content = read_template(locations, TEMPLATE_FILE_NAME, Error::TemplateNotFound)?;
            split_template(&content)
        }
    };
    trailers.extend(resolved);

    write_file(&session_path(locations), &render(&preamble, &trailers))?;
    if !git.config_set(TEMPLATE_KEY, TEMPLATE_FILE_NAME) {
        return Err(Error::SetTemplate);
    }
    Ok(trailer::report(HEADER, &trailers))
}

/// Ends the active session, if any.
pub fn clear<G: Git>(git: &mut G, locations: &Locations) -> Result<String> {
    if template_state(git) == TemplateState::Active {
        end(git, locations)?;
    }
    Ok(trailer::report(HEADER, &BTreeSet::<String>::new()))
}

/// Removes the coauthors behind `aliases` from the active session.
///
/// The session ends once its last coauthor is removed, and a session whose
/// file has disappeared is ended outright. Without an active session this
/// does nothing.
///
/// # Parameters
///
/// * `git`: Git access used for the `commit.template` keys.
/// * `locations`: Working and home directories.
/// * `book`: Merged alias view used to resolve `aliases`.
/// * `aliases`: Aliases to remove.
///
/// # Returns
///
/// * `Ok(report)` with the `Session:` report of the remaining trailers.
/// * `Err(Error::InvalidCoauthor)` for the first unknown alias; the session
///   file and git config are left untouched.
/// * Any session-end error (`RestoreTemplate`, `UnsetTemplateBackup`,
///   `UnsetTemplate`, `Remove`) when the session ends.
///
/// # Examples
///
/// ```ignore
/// let report = session::remove(&mut SystemGit, &locations, &book, &["foo".to_string()])?;
/// if report == "Session:\n" {
///     println!("session ended");
/// }
/// ```
pub fn remove<G: Git>(
    git: &mut G,
    locations: &Locations,
    book: &AliasBook,
    aliases: &[String],
) -> Result<String> {
    let empty = trailer::report(HEADER, &BTreeSet::<String>::new());
    if template_state(git) != TemplateState::Active {
        return Ok(empty);
    }

    let path = session_path(locations);
    if !path.exists() {
        end(git, locations)?;
        return Ok(empty);
    }

    let unwanted: BTreeSet<String> = book.resolve(aliases)?.into_iter().collect();
    let content = fs::read_to_string(&path).map_err(|source| Error::Read {
        path: path.clone(),
        source,
    })?;
    let (preamble, trailers) = split_template(&content);
    let remaining: BTreeSet<String> = trailers.difference(&unwanted).cloned().collect();

    if remaining.is_empty() {
        end(git, locations)?;
    } else {
        write_file(&path, &render(&preamble, &remaining))?;
    }
    Ok(trailer::report(HEADER, &remaining))
}

/// Restores the template saved before the session, or unsets
/// `commit.template`, then deletes the session file.
///
/// Each git step stops the transition on failure, so a failed restore leaves
/// the backup key in place.
///
/// # Parameters
///
/// * `git`: Git access used for the `commit.template` keys.
/// * `locations`: Working directory holding the session file.
///
/// # Returns
///
/// * `Ok(())` once git config is restored and the file is gone (a file that
///   is already missing is fine).
/// * `Err(Error::RestoreTemplate)` if the backup cannot be set back.
/// * `Err(Error::UnsetTemplateBackup)` if the backup key cannot be removed.
/// * `Err(Error::UnsetTemplate)` if `commit.template` cannot be removed.
/// * `Err(Error::Remove)` if the session file cannot be deleted.
///
/// # Examples
///
/// ```ignore
/// if template_state(git) == TemplateState::Active {
///     end(git, locations)?;
/// }
/// ```
fn end<G: Git>(git: &mut G, locations: &Locations) -> Result<()> {
    match git.config_get(TEMPLATE_BACKUP_KEY) {
        Some(backup) => {
            if !git.config_set(TEMPLATE_KEY, &backup) {
                return Err(Error::RestoreTemplate(backup));
            }
            if !git.config_unset(TEMPLATE_BACKUP_KEY) {
                return Err(Error::UnsetTemplateBackup);
            }
            debug!(%backup, "restored previous commit template");
        }
        None => {
            if !git.config_unset(TEMPLATE_KEY) {
                return Err(Error::UnsetTemplate);
            }
        }
    }

    let path = session_path(locations);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(Error::Remove { path, source }),
    }
}
