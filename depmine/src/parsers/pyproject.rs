use super::ManifestParser;
use super::lockfile;
use super::pep508::Requirement;
use crate::diagnostics::ParseOutcome;
use depmine_core::{Category, Dependency, DependencyType, parse_specifier};
use toml::{Table, Value};

/// Poetry keys that pick a VCS revision, most specific first
const GIT_REF_KEYS: [&str; 3] = ["rev", "tag", "branch"];

/// Parser for pyproject.toml (PEP 621, PEP 735, Poetry, PDM) and poetry.lock
pub struct PyProjectParser;

impl PyProjectParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse PEP 621 format dependencies
    fn parse_pep621_dependencies(&self, document: &Table, filename: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::new();
        let Some(project) = document.get("project") else {
            return outcome;
        };

        // [project.dependencies] - array of strings
        if let Some(deps) = project.get("dependencies").and_then(Value::as_array) {
            outcome.merge(self.parse_requirement_list(
                deps,
                filename,
                Category::Main,
                "project.dependencies",
            ));
        }

        // [project.optional-dependencies] - tables of arrays
        if let Some(groups) = project.get("optional-dependencies").and_then(Value::as_table) {
            for (group_name, deps_value) in groups {
                let Some(deps) = deps_value.as_array() else {
                    let message = format!("optional dependency group '{group_name}' is not a list");
                    outcome.warn(filename, None, message);
                    continue;
                };
                outcome.merge(self.parse_requirement_list(
                    deps,
                    filename,
                    Category::from_group(group_name),
                    "project.optional-dependencies",
                ));
            }
        }

        outcome
    }

    /// Parse PEP 735 dependency-groups format
    fn parse_dependency_groups(&self, document: &Table, filename: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::new();

        if let Some(groups) = document.get("dependency-groups").and_then(Value::as_table) {
            for (group_name, deps_value) in groups {
                if let Some(deps) = deps_value.as_array() {
                    // {include-group = "..."} entries reference other groups
                    let strings: Vec<Value> = deps.iter().filter(|d| d.is_str()).cloned().collect();
                    outcome.merge(self.parse_requirement_list(
                        &strings,
                        filename,
                        Category::from_group(group_name),
                        "dependency-groups",
                    ));
                }
            }
        }

        outcome
    }

    /// Parse PDM format dev dependencies
    fn parse_pdm_dependencies(&self, document: &Table, filename: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::new();

        // [tool.pdm.dev-dependencies] - table of arrays
        if let Some(dev_deps) = document
            .get("tool")
            .and_then(|t| t.get("pdm"))
            .and_then(|p| p.get("dev-dependencies"))
            .and_then(Value::as_table)
        {
            for deps_value in dev_deps.values() {
                if let Some(deps) = deps_value.as_array() {
                    outcome.merge(self.parse_requirement_list(
                        deps,
                        filename,
                        Category::Dev,
                        "tool.pdm.dev-dependencies",
                    ));
                }
            }
        }

        outcome
    }

    /// Parse Poetry format dependencies
    fn parse_poetry_dependencies(&self, document: &Table, filename: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::new();
        let Some(poetry) = document
            .get("tool")
            .and_then(|t| t.get("poetry"))
            .and_then(Value::as_table)
        else {
            return outcome;
        };

        // [tool.poetry.dependencies]
        if let Some(deps) = poetry.get("dependencies").and_then(Value::as_table) {
            outcome.merge(self.parse_poetry_table(deps, filename, Category::Main));
        }

        // [tool.poetry.dev-dependencies] (legacy)
        if let Some(deps) = poetry.get("dev-dependencies").and_then(Value::as_table) {
            outcome.merge(self.parse_poetry_table(deps, filename, Category::Dev));
        }

        // [tool.poetry.group.*.dependencies]
        if let Some(groups) = poetry.get("group").and_then(Value::as_table) {
            for (group_name, group_value) in groups {
                if let Some(deps) = group_value.get("dependencies").and_then(Value::as_table) {
                    let category = Category::from_group(group_name);
                    outcome.merge(self.parse_poetry_table(deps, filename, category));
                }
            }
        }

        outcome
    }

    /// Parse a list of requirement strings; bad entries are skipped
    fn parse_requirement_list(
        &self,
        entries: &[Value],
        filename: &str,
        category: Category,
        section: &str,
    ) -> ParseOutcome {
        entries.iter().fold(ParseOutcome::new(), |mut outcome, entry| {
            let Some(line) = entry.as_str() else {
                outcome.warn(filename, None, format!("non-string entry in {section}: {entry}"));
                return outcome;
            };
            match Requirement::parse(line) {
                Ok(requirement) => outcome.push(requirement.into_dependency(filename, category)),
                Err(e) => outcome.warn(
                    filename,
                    None,
                    format!("invalid dependency in TOML {section} '{line}': {e}"),
                ),
            }
            outcome
        })
    }

    /// Parse a Poetry dependency table (name -> string, inline table or list)
    fn parse_poetry_table(
        &self,
        table: &Table,
        filename: &str,
        category: Category,
    ) -> ParseOutcome {
        let mut outcome = ParseOutcome::new();

        for (name, value) in table {
            // Skip python itself
            if name.eq_ignore_ascii_case("python") {
                continue;
            }

            match value {
                // Simple string version: package = "^1.0"
                Value::String(spec) => outcome.push(
                    Dependency::new(name, filename, DependencyType::Package, category)
                        .with_specifier(Some(spec.clone()), parse_specifier(spec)),
                ),
                // Inline table: package = {version = "^1.0", extras = [...]}
                Value::Table(entry) => {
                    match Self::parse_poetry_entry(name, entry, filename, category) {
                        Some(dep) => outcome.push(dep),
                        None => outcome.warn(
                            filename,
                            None,
                            format!("unrecognized dependency entry for '{name}'"),
                        ),
                    }
                }
                // Multiple constraint sets: package = [{version = ..., python = ...}, ...]
                Value::Array(entries) => {
                    for entry in entries {
                        let dependency = entry
                            .as_table()
                            .and_then(|t| Self::parse_poetry_entry(name, t, filename, category));
                        match dependency {
                            Some(dep) => outcome.push(dep),
                            None => outcome.warn(
                                filename,
                                None,
                                format!("unrecognized constraint entry for '{name}'"),
                            ),
                        }
                    }
                }
                _ => outcome.warn(
                    filename,
                    None,
                    format!("unsupported value for dependency '{name}'"),
                ),
            }
        }

        outcome
    }

    /// Inline table form; `None` when it names no version and no origin
    fn parse_poetry_entry(
        name: &str,
        entry: &Table,
        filename: &str,
        category: Category,
    ) -> Option<Dependency> {
        let get_str = |key: &str| entry.get(key).and_then(Value::as_str);
        let version = get_str("version");

        let dependency = if let Some(git) = get_str("git") {
            let git_ref = GIT_REF_KEYS.into_iter().find_map(get_str).map(str::to_string);
            Dependency::new(name, filename, DependencyType::Git, category)
                .with_source_url(git)
                .with_git_ref(git_ref)
        } else if let Some(path) = get_str("path") {
            Dependency::new(name, filename, DependencyType::Path, category).with_source_path(path)
        } else if let Some(url) = get_str("url") {
            Dependency::new(name, filename, DependencyType::Url, category).with_source_url(url)
        } else if version.is_some() {
            Dependency::new(name, filename, DependencyType::Package, category)
        } else {
            return None;
        };

        let extras: Vec<&str> = entry
            .get("extras")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let rules = parse_specifier(version.unwrap_or_default());
        Some(
            dependency
                .with_specifier(version.map(str::to_string), rules)
                .with_marker(get_str("markers").map(str::to_string))
                .with_extras(extras),
        )
    }
}

impl Default for PyProjectParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser for PyProjectParser {
    fn parse(&self, content: &str, filename: &str) -> ParseOutcome {
        let document: Table = match toml::from_str(content) {
            Ok(document) => document,
            Err(e) => {
                let mut outcome = ParseOutcome::new();
                outcome.error(filename, None, format!("invalid TOML in {filename}: {e}"));
                return outcome;
            }
        };

        // A lockfile is only ever a lockfile
        if let Some(packages) = lockfile::package_list(&document) {
            return lockfile::parse_packages(packages, filename);
        }

        // Try parsing all formats - a file might have multiple formats
        let mut outcome = self.parse_pep621_dependencies(&document, filename);
        outcome.merge(self.parse_dependency_groups(&document, filename));
        outcome.merge(self.parse_pdm_dependencies(&document, filename));
        outcome.merge(self.parse_poetry_dependencies(&document, filename));
        outcome
    }
}
