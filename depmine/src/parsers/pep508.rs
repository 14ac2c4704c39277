//! Requirement strings: `name[extras] specifiers ; marker` or `name @ url`.

use super::vcs;
use depmine_core::{Category, Dependency, DependencyType, parse_specifier};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?").expect("name pattern is valid")
});

static EXTRA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?$").expect("extra pattern is valid")
});

static CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(===|==|~=|!=|<=|>=|<|>)\s*([A-Za-z0-9_.*+!-]+)")
        .expect("clause pattern is valid")
});

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequirementError {
    #[error("empty requirement")]
    Empty,
    #[error("expected package name at '{0}'")]
    InvalidName(String),
    #[error("unterminated extras list")]
    UnterminatedExtras,
    #[error("invalid extra name '{0}'")]
    InvalidExtra(String),
    #[error("invalid version specifier '{0}'")]
    InvalidSpecifier(String),
    #[error("expected URL after '@'")]
    MissingUrl,
    #[error("empty environment marker")]
    EmptyMarker,
    #[error("unexpected text '{0}'")]
    TrailingInput(String),
}

/// A parsed requirement string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Name as written
    pub name: String,
    pub extras: Vec<String>,
    /// Specifier clauses joined by commas, whitespace removed
    pub specifier: Option<String>,
    /// Direct reference (`name @ url`)
    pub url: Option<String>,
    pub marker: Option<String>,
}

impl Requirement {
    pub fn parse(input: &str) -> Result<Self, RequirementError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RequirementError::Empty);
        }

        let name = NAME
            .find(input)
            .ok_or_else(|| RequirementError::InvalidName(input.to_string()))?;
        let mut rest = input[name.end()..].trim_start();

        let mut extras = Vec::new();
        if let Some(after) = rest.strip_prefix('[') {
            let close = after.find(']').ok_or(RequirementError::UnterminatedExtras)?;
            extras = parse_extras(&after[..close])?;
            rest = after[close + 1..].trim_start();
        }

        let mut requirement = Requirement {
            name: name.as_str().to_string(),
            extras,
            specifier: None,
            url: None,
            marker: None,
        };

        if let Some(after) = rest.strip_prefix('@') {
            let after = after.trim_start();
            let end = after.find(char::is_whitespace).unwrap_or(after.len());
            if end == 0 {
                return Err(RequirementError::MissingUrl);
            }
            requirement.url = Some(after[..end].to_string());
            rest = after[end..].trim_start();
        } else if let Some(after) = rest.strip_prefix('(') {
            let close = after
                .find(')')
                .ok_or_else(|| RequirementError::InvalidSpecifier(rest.to_string()))?;
            let (clauses, leftover) = parse_clauses(&after[..close])?;
            if !leftover.trim().is_empty() {
                return Err(RequirementError::InvalidSpecifier(after[..close].to_string()));
            }
            requirement.specifier = clauses;
            rest = after[close + 1..].trim_start();
        } else {
            let (clauses, leftover) = parse_clauses(rest)?;
            requirement.specifier = clauses;
            rest = leftover.trim_start();
        }

        if let Some(marker) = rest.strip_prefix(';') {
            let marker = marker.trim();
            if marker.is_empty() {
                return Err(RequirementError::EmptyMarker);
            }
            requirement.marker = Some(marker.to_string());
        } else if !rest.is_empty() {
            return Err(RequirementError::TrailingInput(rest.to_string()));
        }

        Ok(requirement)
    }

    /// Build the dependency record this requirement declares
    pub fn into_dependency(self, source_file: &str, category: Category) -> Dependency {
        let dependency = match &self.url {
            Some(url) => vcs::dependency_from_url(Some(&self.name), url, source_file, category),
            None => Dependency::new(&self.name, source_file, DependencyType::Package, category),
        };

        let rules = parse_specifier(self.specifier.as_deref().unwrap_or_default());
        let mut extras = dependency.extras_requested.clone();
        extras.extend(self.extras);

        dependency
            .with_specifier(self.specifier, rules)
            .with_marker(self.marker)
            .with_extras(extras)
    }
}

fn parse_extras(list: &str) -> Result<Vec<String>, RequirementError> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }

    list.split(',')
        .map(str::trim)
        .map(|extra| {
            if EXTRA.is_match(extra) {
                Ok(extra.to_string())
            } else {
                Err(RequirementError::InvalidExtra(extra.to_string()))
            }
        })
        .collect()
}

/// Parse `op version` clauses separated by commas.
/// Returns the joined clauses and whatever text follows them.
fn parse_clauses(text: &str) -> Result<(Option<String>, &str), RequirementError> {
    let mut clauses = Vec::new();
    let mut rest = text.trim_start();

    while let Some(caps) = CLAUSE.captures(rest) {
        clauses.push(format!("{}{}", &caps[1], &caps[2]));
        rest = rest[caps[0].len()..].trim_start();

        match rest.strip_prefix(',') {
            Some(after) => {
                rest = after.trim_start();
                if !CLAUSE.is_match(rest) {
                    return Err(RequirementError::InvalidSpecifier(text.trim().to_string()));
                }
            }
            None => break,
        }
    }

    if clauses.is_empty() && rest.starts_with(['=', '<', '>', '!', '~', '^']) {
        let end = rest.find(';').unwrap_or(rest.len());
        return Err(RequirementError::InvalidSpecifier(rest[..end].trim().to_string()));
    }

    let joined = (!clauses.is_empty()).then(|| clauses.join(","));
    Ok((joined, rest))
}
