use std::collections::BTreeSet;

use tracing::debug;

use crate::config::AliasBook;
use crate::error::{Error, Result};
use crate::git::Git;
use crate::trailer;

const HEADER: &str = "Commit";

fn read_message<G: Git>(git: &mut G) -> Result<String> {
    git.commit_message().ok_or(Error::ReadCommit)
}

fn amend<G: Git>(git: &mut G, message: &str) -> Result<()> {
    debug!(bytes = message.len(), "amending previous commit message");
    if git.amend_commit_message(message) {
        Ok(())
    } else {
        Err(Error::AmendCommit)
    }
}

/// Reports the trailers of the previous commit without changing it.
pub fn list<G: Git>(git: &mut G) -> Result<String> {
    let message = read_message(git)?;
    Ok(trailer::report(HEADER, &trailer::extract(&message)))
}

/// Adds the coauthors behind `aliases` to the previous commit.
///
/// Existing trailers are kept; the result is deduplicated and sorted and
/// appended after a blank line below the message body.
///
/// # Parameters
///
/// * `git`: Git access used to read and amend the commit.
/// * `book`: Merged alias view used to resolve `aliases`.
/// * `aliases`: Aliases to add, in command-line order.
///
/// # Returns
///
/// * `Ok(report)` with the `Commit:` report of the amended trailers.
/// * `Err(Error::ReadCommit)` if the previous commit cannot be read.
/// * `Err(Error::InvalidCoauthor)` for the first unknown alias; nothing is
///   amended.
/// * `Err(Error::AmendCommit)` if git rejects the amend.
///
/// # Examples
///
/// ```ignore
/// let book = AliasBook::load(&locations)?;
/// let report = commit::add(&mut SystemGit, &book, &["foo".to_string()])?;
/// print!("{report}");
/// ```
pub fn add<G: Git>(git: &mut G, book: &AliasBook, aliases: &[String]) -> Result<String> {
    let message = read_message(git)?;
    let mut trailers = trailer::extract(&message);
    trailers.extend(book.resolve(aliases)?);

    amend(git, &trailer::attach(&trailer::strip(&message), &trailers))?;
    Ok(trailer::report(HEADER, &trailers))
}

/// Removes every trailer from the previous commit.
pub fn clear<G: Git>(git: &mut G) -> Result<String> {
    let message = read_message(git)?;
    amend(git, &trailer::strip(&message))?;
    Ok(trailer::report(HEADER, &BTreeSet::<String>::new()))
}

/// Removes the coauthors behind `aliases` from the previous commit.
///
/// Trailers that are not present are ignored. The commit is amended even
/// when nothing was removed, so the remaining trailers end up sorted.
///
/// # Parameters
///
/// * `git`: Git access used to read and amend the commit.
/// * `book`: Merged alias view used to resolve `aliases`.
/// * `aliases`: Aliases to remove.
///
/// # Returns
///
/// * `Ok(report)` with the `Commit:` report of the remaining trailers.
/// * `Err(Error::ReadCommit)`, `Err(Error::InvalidCoauthor)` or
///   `Err(Error::AmendCommit)` as for [`add`].
///
/// # Examples
///
/// ```ignore
/// let report = commit::remove(&mut SystemGit, &book, &["foo".to_string()])?;
/// assert!(report.starts_with("Commit:\n"));
/// ```
pub fn remove<G: Git>(git: &mut G, book: &AliasBook, aliases: &[String]) -> Result<String> {
    let message = read_message(git)?;
    let unwanted: BTreeSet<String> = book.resolve(aliases)?.into_iter().collect();
    let remaining: BTreeSet<String> = trailer::extract(&message)
        .difference(&unwanted)
        .cloned()
        .collect();

    amend(git, &trailer::attach(&trailer::strip(&message), &remaining))?;
    Ok(trailer::report(HEADER, &remaining))
}
