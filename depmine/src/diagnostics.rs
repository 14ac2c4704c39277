//! Diagnostics collected while parsing a manifest.
//!
//! Parsers never fail across their public boundary. Problems with a line,
//! an entry or a whole document are recorded here instead and mirrored to
//! `tracing` so they also reach whatever subscriber the caller installed.

use depmine_core::Dependency;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One problem found in a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub file: String,
    /// 1-indexed line, when the format has lines
    pub line: Option<usize>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}: {}:{line}: {}", self.severity, self.file, self.message),
            None => write!(f, "{}: {}: {}", self.severity, self.file, self.message),
        }
    }
}

/// Result of parsing one manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub dependencies: Vec<Dependency>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, dependency: Dependency) {
        self.dependencies.push(dependency);
    }

    pub fn info(&mut self, file: &str, line: Option<usize>, message: impl Into<String>) {
        self.record(Severity::Info, file, line, message.into());
    }

    pub fn warn(&mut self, file: &str, line: Option<usize>, message: impl Into<String>) {
        self.record(Severity::Warning, file, line, message.into());
    }

    pub fn error(&mut self, file: &str, line: Option<usize>, message: impl Into<String>) {
        self.record(Severity::Error, file, line, message.into());
    }

    /// Append another outcome, keeping order
    pub fn merge(&mut self, other: ParseOutcome) {
        self.dependencies.extend(other.dependencies);
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity >= Severity::Warning)
    }

    fn record(&mut self, severity: Severity, file: &str, line: Option<usize>, message: String) {
        let line_str = line.as_ref().map(ToString::to_string).unwrap_or_default();
        match severity {
            Severity::Info => {
                tracing::info!(target: "depmine::parser", file, line = %line_str, "{message}");
            }
            Severity::Warning => {
                tracing::warn!(target: "depmine::parser", file, line = %line_str, "{message}");
            }
            Severity::Error => {
                tracing::error!(target: "depmine::parser", file, line = %line_str, "{message}");
            }
        }

        self.diagnostics.push(Diagnostic {
            severity,
            file: file.to_string(),
            line,
            message,
        });
    }
}

impl From<Vec<Dependency>> for ParseOutcome {
    fn from(dependencies: Vec<Dependency>) -> Self {
        Self {
            dependencies,
            diagnostics: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depmine_core::{Category, DependencyType};

    #[test]
    fn test_records_diagnostics_in_order() {
        let mut outcome = ParseOutcome::new();
        outcome.info("requirements.txt", Some(1), "skipping -r base.txt");
        outcome.warn("requirements.txt", Some(4), "invalid requirement");

        assert_eq!(outcome.diagnostics.len(), 2);
        assert_eq!(outcome.diagnostics[0].severity, Severity::Info);
        assert_eq!(outcome.diagnostics[1].line, Some(4));
        assert!(outcome.has_warnings());
    }

    #[test]
    fn test_info_is_not_a_warning() {
        let mut outcome = ParseOutcome::new();
        outcome.info("requirements.txt", None, "note");
        assert!(!outcome.has_warnings());
    }

    #[test]
    fn test_display() {
        let mut outcome = ParseOutcome::new();
        outcome.error("pyproject.toml", None, "invalid TOML");
        outcome.warn("requirements.txt", Some(3), "bad line");
        assert_eq!(outcome.diagnostics[0].to_string(), "error: pyproject.toml: invalid TOML");
        assert_eq!(outcome.diagnostics[1].to_string(), "warning: requirements.txt:3: bad line");
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut first = ParseOutcome::from(vec![Dependency::new(
            "a",
            "pyproject.toml",
            DependencyType::Package,
            Category::Main,
        )]);
        let second = ParseOutcome::from(vec![Dependency::new(
            "b",
            "pyproject.toml",
            DependencyType::Package,
            Category::Dev,
        )]);
        first.merge(second);

        let names: Vec<&str> = first.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
