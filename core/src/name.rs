use regex::Regex;
use std::sync::LazyLock;

static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("separator pattern is valid"));

/// Canonicalize a package name (PEP 503).
///
/// Lowercases the name and collapses every run of `-`, `_` and `.` into a
/// single `-`, so `Foo.Bar_Baz` and `foo-bar-baz` compare equal.
pub fn canonicalize_name(name: &str) -> String {
    SEPARATOR_RUN
        .replace_all(name.trim(), "-")
        .to_lowercase()
}
