use std::collections::BTreeSet;

/// Prefix shared by every coauthor trailer line.
pub const PREFIX: &str = "Co-authored-by:";

/// Returns `true` if `line` is a coauthor trailer, ignoring leading whitespace.
pub fn is_trailer(line: &str) -> bool {
    line.trim_start().starts_with(PREFIX)
}

/// Formats a coauthor identity (`Name <email>`) as a trailer line.
pub fn from_identity(identity: &str) -> String {
    format!("{PREFIX} {identity}")
}

/// Collects the trailer lines of `text`, trimmed, deduplicated and sorted.
pub fn extract(text: &str) -> BTreeSet<String> {
    text.lines()
        .filter(|l| is_trailer(l))
        .map(|l| l.trim().to_string())
        .collect()
}

/// Removes every trailer line from `message`.
///
/// The remaining text is trimmed and terminated with a single newline, so
/// `"Foo\n\nBar\n\nCo-authored-by: X\n"` becomes `"Foo\n\nBar\n"`.
pub fn strip(message: &str) -> String {
    let body = message
        .lines()
        .filter(|l| !is_trailer(l))
        .collect::<Vec<&str>>()
        .join("\n");
    format!("{}\n", body.trim())
}

/// Rebuilds a message from a stripped body and a trailer set.
///
/// With no trailers the body is returned untouched. Otherwise the trailers
/// follow the body after exactly one blank line.
pub fn attach(body: &str, trailers: &BTreeSet<String>) -> String {
    if trailers.is_empty() {
        return body.to_string();
    }
    format!("{}\n{}\n", body, join(trailers))
}

/// Joins trailers one per line, in ascending order, without a final newline.
pub fn join(trailers: &BTreeSet<String>) -> String {
    trailers
        .iter()
        .map(String::as_str)
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Renders a `Header:` report followed by one indented line per trailer.
pub fn report<'a, I>(header: &str, trailers: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let mut out = format!("{header}:\n");
    for t in trailers {
        out.push_str("  ");
        out.push_str(t);
        out.push('\n');
    }
    out
}

/// Splits a template file into lines, dropping trailing empty lines.
pub fn template_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}
