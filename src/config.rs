use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::command::Target;
use crate::error::{Error, Result};
use crate::trailer;

/// File name of both the repository and the user alias files.
pub const CONFIG_FILE_NAME: &str = ".git-coauthors";

/// Directories an invocation works against, resolved once up front.
#[derive(Debug, Clone)]
pub struct Locations {
    /// Working directory; holds the local alias file and the session template.
    pub cwd: PathBuf,
    /// User home directory; holds the global alias file.
    pub home: PathBuf,
}

impl Locations {
    /// Resolves the current directory and the user's home directory.
    pub fn detect() -> Result<Locations> {
        let cwd = std::env::current_dir().map_err(Error::WorkingDirectory)?;
        let home = dirs::home_dir().ok_or(Error::HomeNotFound)?;
        Ok(Locations { cwd, home })
    }
}

/// One alias file and its parsed contents.
#[derive(Debug, Clone)]
pub struct AliasFile {
    path: PathBuf,
    label: String,
    entries: BTreeMap<String, String>,
}

impl AliasFile {
    /// Loads the alias file for `target`; a missing file is an empty map.
    ///
    /// The local file is labelled by its bare name in reports, the global one
    /// by its full path.
    pub fn load(locations: &Locations, target: Target) -> Result<AliasFile> {
        let (path, label) = match target {
            Target::Local => (
                locations.cwd.join(CONFIG_FILE_NAME),
                CONFIG_FILE_NAME.to_string(),
            ),
            Target::Global => {
                let path = locations.home.join(CONFIG_FILE_NAME);
                let label = path.display().to_string();
                (path, label)
            }
        };
        let entries = read_entries(&path)?;
        debug!(path = %path.display(), count = entries.len(), "loaded alias file");
        Ok(AliasFile {
            path,
            label,
            entries,
        })
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// Renders the `--config` report for the current entries.
    pub fn report(&self) -> String {
        render_report(&self.label, &self.entries)
    }

    /// Merges `alias: identity` arguments into the file and writes it.
    ///
    /// Every argument is validated before anything is written; later
    /// arguments win over earlier ones with the same alias.
    ///
    /// # Parameters
    ///
    /// * `args`: Raw `alias: identity` arguments, split on their first colon.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once the merged file has been written.
    /// * `Err(Error::InvalidConfig)` if any argument is malformed; the file is
    ///   left untouched.
    /// * `Err(Error::Write)` if the file cannot be written.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut file = AliasFile::load(&locations, Target::Local)?;
    /// file.add(&["foo: Foo <foo@bar.com>".to_string()])?;
    /// print!("{}", file.report());
    /// ```
    pub fn add(&mut self, args: &[String]) -> Result<()> {
        let pairs = args
            .iter()
            .map(|a| parse_pair(a))
            .collect::<Result<Vec<(String, String)>>>()?;
        for (alias, identity) in pairs {
            self.entries.insert(alias, identity);
        }
        self.save()
    }

    /// Removes the named aliases; unknown names are ignored.
    pub fn remove(&mut self, aliases: &[String]) -> Result<()> {
        self.entries.retain(|k, _| !aliases.contains(k));
        self.save()
    }

    /// Empties the file, leaving a single blank line behind.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }

    fn save(&self) -> Result<()> {
        write_file(&self.path, &serialize(&self.entries)?)
    }
}

/// Merged alias view used to turn aliases into trailers.
///
/// Local entries take precedence over global ones.
#[derive(Debug, Clone, Default)]
pub struct AliasBook {
    merged: BTreeMap<String, String>,
}

impl AliasBook {
    pub fn load(locations: &Locations) -> Result<AliasBook> {
        let global = AliasFile::load(locations, Target::Global)?;
        let local = AliasFile::load(locations, Target::Local)?;
        Ok(AliasBook::merge(global.entries, local.entries))
    }

    /// Builds a book where `local` overrides `global` on key collision.
    pub fn merge(global: BTreeMap<String, String>, local: BTreeMap<String, String>) -> AliasBook {
        let mut merged = global;
        merged.extend(local);
        AliasBook { merged }
    }

    /// Maps each alias to its `Co-authored-by:` trailer.
    ///
    /// Fails on the first alias that is not configured.
    pub fn resolve(&self, aliases: &[String]) -> Result<Vec<String>> {
        aliases
            .iter()
            .map(|alias| match self.merged.get(alias) {
                Some(identity) => Ok(trailer::from_identity(identity)),
                None => Err(Error::InvalidCoauthor(alias.clone())),
            })
            .collect()
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(Error::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    parse_entries(&content).map_err(|reason| Error::MalformedConfigFile {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parses alias file content; an empty document is an empty map.
fn parse_entries(content: &str) -> std::result::Result<BTreeMap<String, String>, String> {
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    match serde_yaml::from_str::<Option<BTreeMap<String, String>>>(content) {
        Ok(entries) => Ok(entries.unwrap_or_default()),
        Err(e) => Err(e.to_string()),
    }
}

/// Splits `alias: identity` on the first colon.
///
/// Both halves are trimmed and must be non-empty. Everything after the first
/// colon is the identity, even when it holds further colons, a `#` or
/// brackets; such values are quoted when the file is written.
///
/// # Parameters
///
/// * `arg`: One raw command-line argument.
///
/// # Returns
///
/// * `Ok((alias, identity))` with both halves trimmed.
/// * `Err(Error::InvalidConfig)` if there is no colon, either half is empty,
///   or the pair cannot be stored as a single alias file entry.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     parse_pair("foo: Foo <foo@bar.com>")?,
///     ("foo".to_string(), "Foo <foo@bar.com>".to_string())
/// );
/// assert!(parse_pair("foo").is_err());
/// ```
pub fn parse_pair(arg: &str) -> Result<(String, String)> {
    let (alias, identity) = arg.split_once(':').ok_or(Error::InvalidConfig)?;
    let alias = alias.trim();
    let identity = identity.trim();
    if alias.is_empty() || identity.is_empty() {
        return Err(Error::InvalidConfig);
    }

    let line = render_line(alias, identity)?;
    let reread = parse_entries(&line).map_err(|_| Error::InvalidConfig)?;
    if reread.len() != 1 || reread.get(alias).map(String::as_str) != Some(identity) {
        return Err(Error::InvalidConfig);
    }

    Ok((alias.to_string(), identity.to_string()))
}

/// Renders one entry as a `key: value` line.
///
/// The plain form is used when it reads back as the same entry; otherwise
/// both halves are emitted as YAML-quoted scalars.
fn render_line(alias: &str, identity: &str) -> Result<String> {
    let plain = format!("{alias}: {identity}\n");
    let reads_back = parse_entries(&plain)
        .map(|entries| {
            entries.len() == 1 && entries.get(alias).map(String::as_str) == Some(identity)
        })
        .unwrap_or(false);
    if reads_back {
        return Ok(plain);
    }
    debug!(alias, "quoting alias file entry");
    Ok(format!("{}: {}\n", quote(alias)?, quote(identity)?))
}

fn quote(value: &str) -> Result<String> {
    serde_yaml::to_string(value)
        .map(|s| s.trim_end().to_string())
        .map_err(|_| Error::InvalidConfig)
}

/// Serializes entries as sorted `key: value` lines; an empty map is `"\n"`.
fn serialize(entries: &BTreeMap<String, String>) -> Result<String> {
    let body = entries
        .iter()
        .map(|(k, v)| render_line(k, v).map(|line| line.trim_end().to_string()))
        .collect::<Result<Vec<String>>>()?
        .join("\n");
    Ok(format!("{body}\n"))
}

/// Renders a config report with aliases padded to a common width.
///
/// Each alias, with its colon, is left-aligned to the longest alias plus one.
/// Identities are printed as stored, never quoted.
///
/// # Parameters
///
/// * `label`: Heading printed before the entries (`.git-coauthors` or the
///   full path of the global file).
/// * `entries`: Alias to identity map, already sorted by alias.
///
/// # Returns
///
/// The report text, one `  alias: identity` line per entry after the
/// `label:` heading.
///
/// # Examples
///
/// ```ignore
/// let entries = BTreeMap::from([("a".to_string(), "A <a@x>".to_string())]);
/// assert_eq!(render_report("x", &entries), "x:\n  a: A <a@x>\n");
/// ```
pub fn render_report(label: &str, entries: &BTreeMap<String, String>) -> String {
    let mut out = format!("{label}:\n");
    let width = entries.keys().map(|k| k.chars().count()).max().unwrap_or(0) + 1;
    for (alias, identity) in entries {
        let key = format!("{alias}:");
        out.push_str(&format!("  {key:<width$} {identity}\n"));
    }
    out
}

pub(crate) fn write_file(path: &Path, content: &str) -> Result<()> {
    debug!(path = %path.display(), bytes = content.len(), "writing file");
    fs::write(path, content).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}
