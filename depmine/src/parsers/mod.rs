pub mod lockfile;
pub mod pep508;
pub mod pyproject;
pub mod requirements;
pub mod vcs;

pub use pep508::{Requirement, RequirementError};
pub use pyproject::PyProjectParser;
pub use requirements::RequirementsParser;

use crate::diagnostics::ParseOutcome;
use depmine_core::Dependency;
use std::path::Path;

/// Trait for dependency file parsers
pub trait ManifestParser: Sync {
    /// Parse file content; malformed input becomes diagnostics, never an error
    fn parse(&self, content: &str, filename: &str) -> ParseOutcome;
}

/// Which parser a manifest file goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// requirements*.txt / requirements*.pip
    Requirements,
    /// pyproject.toml and poetry.lock
    StructuredConfig,
}

static REQUIREMENTS_PARSER: RequirementsParser = RequirementsParser;
static PYPROJECT_PARSER: PyProjectParser = PyProjectParser;

impl ManifestKind {
    /// Recognize a manifest by its final path component
    pub fn detect(filename: &str) -> Option<Self> {
        let basename = Path::new(filename).file_name()?.to_str()?;

        if basename.contains("requirements")
            && (basename.ends_with(".txt") || basename.ends_with(".pip"))
        {
            return Some(ManifestKind::Requirements);
        }

        match basename {
            "pyproject.toml" | "poetry.lock" => Some(ManifestKind::StructuredConfig),
            _ => None,
        }
    }

    pub fn parser(self) -> &'static dyn ManifestParser {
        match self {
            ManifestKind::Requirements => &REQUIREMENTS_PARSER,
            ManifestKind::StructuredConfig => &PYPROJECT_PARSER,
        }
    }
}

pub fn is_dependency_file(filename: &str) -> bool {
    ManifestKind::detect(filename).is_some()
}

/// Parse a manifest. `None` content means the file is gone and is not parsed.
pub fn parse(filename: &str, content: Option<&str>) -> ParseOutcome {
    let (Some(content), Some(kind)) = (content, ManifestKind::detect(filename)) else {
        return ParseOutcome::new();
    };

    tracing::debug!(file = filename, kind = ?kind, "parsing manifest");
    kind.parser().parse(content, filename)
}

/// Like [`parse`], keeping only the dependencies
pub fn parse_dependency_file(filename: &str, content: Option<&str>) -> Vec<Dependency> {
    parse(filename, content).dependencies
}

#[cfg(test)]
mod tests {
    use super::*;
    use depmine_core::DependencyType;

    #[test]
    fn test_detect_requirements_variants() {
        assert_eq!(ManifestKind::detect("requirements.txt"), Some(ManifestKind::Requirements));
        assert_eq!(ManifestKind::detect("requirements-dev.txt"), Some(ManifestKind::Requirements));
        assert_eq!(ManifestKind::detect("dev-requirements.pip"), Some(ManifestKind::Requirements));
        assert_eq!(ManifestKind::detect("requirements.in"), None);
        assert_eq!(ManifestKind::detect("reqs.txt"), None);
    }

    #[test]
    fn test_detect_structured_config() {
        assert_eq!(ManifestKind::detect("pyproject.toml"), Some(ManifestKind::StructuredConfig));
        assert_eq!(ManifestKind::detect("poetry.lock"), Some(ManifestKind::StructuredConfig));
        assert_eq!(ManifestKind::detect("setup.py"), None);
        assert_eq!(ManifestKind::detect("Pipfile"), None);
    }

    #[test]
    fn test_detect_uses_basename() {
        assert_eq!(
            ManifestKind::detect("services/api/requirements/base-requirements.txt"),
            Some(ManifestKind::Requirements)
        );
        assert_eq!(
            ManifestKind::detect("backend/pyproject.toml"),
            Some(ManifestKind::StructuredConfig)
        );
        assert_eq!(ManifestKind::detect("requirements/pyproject.toml.bak"), None);
        assert!(!is_dependency_file("requirements/README.md"));
    }

    #[test]
    fn test_parse_dispatches_requirements() {
        let deps = parse_dependency_file("requirements.txt", Some("requests==2.0.0\nflask==2.2.0"));
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "requests");
        assert_eq!(deps[0].pinned_version(), Some("2.0.0"));
        assert_eq!(deps[1].name, "flask");
        assert_eq!(deps[1].pinned_version(), Some("2.2.0"));
        assert!(deps.iter().all(|d| d.dependency_type == DependencyType::Package));
    }

    #[test]
    fn test_parse_keeps_caller_path_as_source_file() {
        let deps = parse_dependency_file("app/requirements.txt", Some("requests==2.0.0"));
        assert_eq!(deps[0].source_file, "app/requirements.txt");
    }

    #[test]
    fn test_parse_dispatches_lockfile() {
        let content = "[[package]]\nname = \"certifi\"\nversion = \"2022.12.7\"\n";
        let deps = parse_dependency_file("poetry.lock", Some(content));
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].pinned_version(), Some("2022.12.7"));
    }

    #[test]
    fn test_parse_none_content_short_circuits() {
        let outcome = parse("requirements.txt", None);
        assert!(outcome.dependencies.is_empty());
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_parse_unknown_file_is_empty() {
        let outcome = parse("setup.cfg", Some("[options]\ninstall_requires = requests\n"));
        assert!(outcome.dependencies.is_empty());
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_parse_empty_content_still_parses() {
        let outcome = parse("pyproject.toml", Some(""));
        assert!(outcome.dependencies.is_empty());
        assert!(outcome.diagnostics.is_empty());
    }
}
