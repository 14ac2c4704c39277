use super::ManifestParser;
use super::pep508::Requirement;
use super::vcs;
use crate::diagnostics::ParseOutcome;
use depmine_core::{Category, Dependency, DependencyType};
use regex::Regex;
use std::sync::LazyLock;

/// Per-requirement pip options such as `--hash=sha256:...`
static TRAILING_OPTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s--[A-Za-z]").expect("option pattern is valid"));

/// Marker separator for lines that are not requirement strings
static MARKER_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s;").expect("marker pattern is valid"));

/// Options that point at other requirement or constraint files
const INCLUDE_FLAGS: [&str; 4] = ["--requirement", "--constraint", "-r", "-c"];

const EDITABLE_FLAGS: [&str; 2] = ["--editable", "-e"];

/// Parser for pip requirements files
pub struct RequirementsParser;

/// What a single logical line turned into
enum LineOutcome {
    Skipped,
    Parsed(Dependency),
    Noted(String),
    Rejected(String),
}

impl RequirementsParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a single logical line from a requirements file
    fn parse_line(line: &str, line_number: usize, source_file: &str) -> LineOutcome {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            return LineOutcome::Skipped;
        }

        if let Some(target) = option_value(line, &EDITABLE_FLAGS) {
            return Self::parse_editable(target, line_number, source_file);
        }

        // Don't follow -r/-c includes, the referenced file isn't available here
        if let Some(reference) = option_value(line, &INCLUDE_FLAGS) {
            let reference = strip_comment(reference);
            return LineOutcome::Noted(format!("not following reference to '{reference}'"));
        }

        // --index-url and other pip options
        if line.starts_with('-') {
            tracing::debug!(file = source_file, line = line_number, "skipping option: {line}");
            return LineOutcome::Skipped;
        }

        let line = strip_trailing_options(strip_comment(line));
        if line.is_empty() {
            return LineOutcome::Skipped;
        }

        // VCS URLs go straight to the VCS handling, otherwise the scheme
        // would be read as the package name
        if vcs::is_vcs_reference(line) {
            let (location, marker) = split_marker(line);
            let dependency = vcs::dependency_from_url(None, location, source_file, Category::Main)
                .with_marker(marker)
                .with_line_number(line_number);
            return LineOutcome::Parsed(dependency);
        }

        match Requirement::parse(line) {
            Ok(requirement) => LineOutcome::Parsed(
                requirement
                    .into_dependency(source_file, Category::Main)
                    .with_line_number(line_number),
            ),
            Err(err) => Self::parse_location(line, line_number, source_file).unwrap_or_else(|| {
                LineOutcome::Rejected(format!("invalid requirement '{line}': {err}"))
            }),
        }
    }

    /// Fallback for lines that are a bare URL or a local path
    fn parse_location(line: &str, line_number: usize, source_file: &str) -> Option<LineOutcome> {
        let (location, marker) = split_marker(line);

        let is_url = vcs::is_remote_url(location) || vcs::strip_file_scheme(location).is_some();
        let dependency = if is_url {
            vcs::dependency_from_url(None, location, source_file, Category::Main)
        } else if vcs::looks_like_path(location) {
            Dependency::new(
                &vcs::name_from_location(location),
                source_file,
                DependencyType::Path,
                Category::Main,
            )
            .with_source_path(location)
        } else {
            return None;
        };

        Some(LineOutcome::Parsed(
            dependency.with_marker(marker).with_line_number(line_number),
        ))
    }

    /// `-e <path or VCS URL>`
    fn parse_editable(target: &str, line_number: usize, source_file: &str) -> LineOutcome {
        let target = strip_trailing_options(strip_comment(target));
        if target.is_empty() {
            return LineOutcome::Rejected("editable flag without a target".to_string());
        }

        let (name, extras, path) = if vcs::is_vcs_reference(target) {
            let (name, extras) = vcs::vcs_name(None, target);
            let (path, _) = vcs::split_fragment(target);
            (name, extras, path)
        } else {
            let (path, extras) = split_path_extras(target);
            let path = vcs::strip_file_scheme(path).unwrap_or(path);
            (vcs::name_from_location(path), extras, path)
        };

        LineOutcome::Parsed(
            Dependency::new(&name, source_file, DependencyType::Editable, Category::Main)
                .with_source_path(path)
                .with_extras(extras)
                .with_line_number(line_number),
        )
    }
}

impl Default for RequirementsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser for RequirementsParser {
    fn parse(&self, content: &str, filename: &str) -> ParseOutcome {
        logical_lines(content)
            .into_iter()
            .fold(ParseOutcome::new(), |mut outcome, (line_number, line)| {
                match Self::parse_line(&line, line_number, filename) {
                    LineOutcome::Skipped => {}
                    LineOutcome::Parsed(dependency) => outcome.push(dependency),
                    LineOutcome::Noted(message) => {
                        outcome.info(filename, Some(line_number), message);
                    }
                    LineOutcome::Rejected(message) => {
                        outcome.warn(filename, Some(line_number), message);
                    }
                }
                outcome
            })
    }
}

/// Join backslash continuations; each logical line keeps the number of
/// its first physical line (1-indexed). A line carrying a comment never
/// continues.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let (start, mut buffer) = pending.take().unwrap_or_else(|| (idx + 1, String::new()));
        let continued = raw
            .trim_end()
            .strip_suffix('\\')
            .filter(|head| !has_comment(head));
        match continued {
            Some(head) => {
                buffer.push_str(head);
                buffer.push(' ');
                pending = Some((start, buffer));
            }
            None => {
                buffer.push_str(raw);
                lines.push((start, buffer));
            }
        }
    }

    if let Some(last) = pending {
        lines.push(last);
    }

    lines
}

/// Value of a leading option (`-e .`, `--editable=.`, `-rbase.txt`)
fn option_value<'a>(line: &'a str, flags: &[&str]) -> Option<&'a str> {
    flags.iter().find_map(|flag| {
        let rest = line.strip_prefix(flag)?;
        if rest.is_empty() {
            return Some(rest);
        }
        if let Some(value) = rest.strip_prefix('=') {
            return Some(value.trim());
        }
        if rest.starts_with(char::is_whitespace) || !flag.starts_with("--") {
            return Some(rest.trim());
        }
        None
    })
}

/// Drop an inline comment. A `#` that starts an `egg=` or `subdirectory=`
/// fragment belongs to the URL.
fn strip_comment(line: &str) -> &str {
    let mut from = 0;
    while let Some(pos) = line[from..].find('#') {
        let idx = from + pos;
        let after = &line[idx + 1..];
        if after.starts_with("egg=") || after.starts_with("subdirectory=") {
            from = idx + 1;
            continue;
        }
        return line[..idx].trim();
    }
    line.trim()
}

fn has_comment(line: &str) -> bool {
    strip_comment(line) != line.trim()
}

fn strip_trailing_options(line: &str) -> &str {
    match TRAILING_OPTIONS.find(line) {
        Some(m) => line[..m.start()].trim(),
        None => line,
    }
}

/// Split `location ; marker`
fn split_marker(line: &str) -> (&str, Option<String>) {
    match MARKER_SEPARATOR.find(line) {
        Some(m) => {
            let marker = line[m.end()..].trim();
            (line[..m.start()].trim(), Some(marker.to_string()))
        }
        None => (line, None),
    }
}

/// `./pkg[dev,test]` -> (`./pkg`, [dev, test])
fn split_path_extras(target: &str) -> (&str, Vec<String>) {
    if let Some(head) = target.strip_suffix(']') {
        if let Some((path, extras)) = head.rsplit_once('[') {
            let extras = extras
                .split(',')
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect();
            return (path.trim(), extras);
        }
    }
    (target, Vec::new())
}
