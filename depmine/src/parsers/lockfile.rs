use crate::diagnostics::ParseOutcome;
use depmine_core::{Category, Dependency, DependencyType, Operator, VersionRule};
use serde::Deserialize;
use toml::{Table, Value};

/// One `[[package]]` entry of a poetry.lock file
#[derive(Debug, Deserialize)]
struct LockedPackage {
    name: Option<String>,
    version: Option<String>,
    /// Poetry 1.x: "main" or "dev"
    category: Option<String>,
    /// Poetry 2.x: groups the package is installed for
    groups: Option<Vec<String>>,
    /// Requested extras as a list; the table form lists declared extras
    extras: Option<Value>,
}

impl LockedPackage {
    fn category(&self) -> Category {
        match (&self.category, &self.groups) {
            (Some(category), _) if category == "main" => Category::Main,
            (Some(_), _) => Category::Dev,
            (None, Some(groups)) if !groups.is_empty() && !groups.iter().any(|g| g == "main") => {
                Category::Dev
            }
            (None, _) => Category::Main,
        }
    }

    fn requested_extras(&self) -> Vec<String> {
        match &self.extras {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// The top-level `package` array, when the document has the lockfile shape
pub fn package_list(document: &Table) -> Option<&Vec<Value>> {
    document
        .get("package")
        .and_then(Value::as_array)
        .filter(|packages| packages.iter().all(Value::is_table))
}

/// Turn lockfile entries into exactly pinned dependencies
pub fn parse_packages(packages: &[Value], filename: &str) -> ParseOutcome {
    packages
        .iter()
        .enumerate()
        .fold(ParseOutcome::new(), |mut outcome, (idx, entry)| {
            let package: LockedPackage = match entry.clone().try_into() {
                Ok(package) => package,
                Err(e) => {
                    let message = format!("invalid [[package]] entry #{}: {e}", idx + 1);
                    outcome.warn(filename, None, message);
                    return outcome;
                }
            };

            let Some(name) = package.name.as_deref().filter(|n| !n.trim().is_empty()) else {
                outcome.warn(filename, None, format!("[[package]] entry #{} has no name", idx + 1));
                return outcome;
            };

            let (raw, rules) = match package.version.as_deref().filter(|v| !v.trim().is_empty()) {
                Some(version) => (
                    Some(format!("=={version}")),
                    vec![VersionRule::new(Operator::Eq, version)],
                ),
                None => (None, Vec::new()),
            };

            outcome.push(
                Dependency::new(name, filename, DependencyType::Package, package.category())
                    .with_specifier(raw, rules)
                    .with_extras(package.requested_extras()),
            );
            outcome
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ParseOutcome {
        let document: Table = toml::from_str(content).unwrap();
        let packages = package_list(&document).unwrap();
        parse_packages(packages, "poetry.lock")
    }

    #[test]
    fn test_parse_poetry_lock() {
        let outcome = parse(
            r#"
[[package]]
name = "certifi"
version = "2022.12.7"
description = "Python package for providing Mozilla's CA Bundle."
category = "main"
optional = false
python-versions = ">=3.6"

[[package]]
name = "pytest"
version = "7.2.0"
category = "dev"
"#,
        );
        let deps = &outcome.dependencies;
        assert_eq!(deps.len(), 2);

        let certifi = &deps[0];
        assert_eq!(certifi.name, "certifi");
        assert_eq!(certifi.dependency_type, DependencyType::Package);
        assert_eq!(certifi.category, Category::Main);
        assert_eq!(certifi.raw_specifier.as_deref(), Some("==2022.12.7"));
        assert_eq!(certifi.version_rules, vec![VersionRule::new(Operator::Eq, "2022.12.7")]);
        assert_eq!(certifi.pinned_version(), Some("2022.12.7"));
        assert!(certifi.line_number.is_none());

        let pytest = &deps[1];
        assert_eq!(pytest.category, Category::Dev);
        assert_eq!(pytest.raw_specifier.as_deref(), Some("==7.2.0"));
    }

    #[test]
    fn test_non_main_categories_collapse_to_dev() {
        let outcome = parse(
            r#"
[[package]]
name = "sphinx"
version = "6.0.0"
category = "docs"
"#,
        );
        assert_eq!(outcome.dependencies[0].category, Category::Dev);
    }

    #[test]
    fn test_poetry2_groups() {
        let outcome = parse(
            r#"
[[package]]
name = "requests"
version = "2.31.0"
groups = ["main"]

[[package]]
name = "mypy"
version = "1.8.0"
groups = ["dev", "lint"]

[[package]]
name = "Django"
version = "4.2.0"
"#,
        );
        let deps = &outcome.dependencies;
        assert_eq!(deps[0].category, Category::Main);
        assert_eq!(deps[1].category, Category::Dev);
        assert_eq!(deps[2].name, "django");
        assert_eq!(deps[2].category, Category::Main);
    }

    #[test]
    fn test_missing_name_is_skipped() {
        let outcome = parse(
            r#"
[[package]]
version = "1.0.0"

[[package]]
name = "click"
version = "8.1.3"
"#,
        );
        assert_eq!(outcome.dependencies.len(), 1);
        assert_eq!(outcome.dependencies[0].name, "click");
        assert!(outcome.has_warnings());
    }

    #[test]
    fn test_malformed_entry_is_skipped() {
        let outcome = parse(
            r#"
[[package]]
name = 42
version = "1.0"

[[package]]
name = "flask"
version = "2.3.0"
"#,
        );
        assert_eq!(outcome.dependencies.len(), 1);
        assert_eq!(outcome.dependencies[0].name, "flask");
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[test]
    fn test_missing_version_has_no_rule() {
        let outcome = parse(
            r#"
[[package]]
name = "local-pkg"
"#,
        );
        let dep = &outcome.dependencies[0];
        assert!(dep.version_rules.is_empty());
        assert!(dep.raw_specifier.is_none());
        assert!(dep.pinned_version().is_none());
    }

    #[test]
    fn test_extras_only_from_list_form() {
        let outcome = parse(
            r#"
[[package]]
name = "uvicorn"
version = "0.20.0"
extras = ["standard"]

[[package]]
name = "requests"
version = "2.31.0"

[package.extras]
socks = ["PySocks (>=1.5.6,!=1.5.7)"]
"#,
        );
        let deps = &outcome.dependencies;
        assert_eq!(deps[0].extras_requested, vec!["standard"]);
        assert!(deps[1].extras_requested.is_empty());
    }
}
