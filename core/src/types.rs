use crate::name::canonicalize_name;
use crate::version::pinned_version;
use serde::{Serialize, Serializer};
use std::fmt;

/// Comparison operator of a single version constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// ==1.2.3
    Eq,
    /// >=1.2.3
    Ge,
    /// <=1.2.3
    Le,
    /// !=1.2.3
    Ne,
    /// >1.2.3
    Gt,
    /// <1.2.3
    Lt,
    /// ~=1.2.3 (compatible release - Python)
    Compatible,
    /// ^1.2.3 (caret - same major)
    Caret,
    /// ~1.2.3 (tilde - same minor)
    Tilde,
}

impl Operator {
    /// Matching order: longer tokens before their prefixes, so `>=` is
    /// never read as `>` and `~=` never as `~`.
    pub const PRIORITY: [Operator; 9] = [
        Operator::Eq,
        Operator::Ge,
        Operator::Le,
        Operator::Ne,
        Operator::Gt,
        Operator::Lt,
        Operator::Compatible,
        Operator::Caret,
        Operator::Tilde,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Compatible => "~=",
            Operator::Caret => "^",
            Operator::Tilde => "~",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

/// One atomic version constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VersionRule {
    pub operator: Operator,
    pub version: String,
}

impl VersionRule {
    pub fn new(operator: Operator, version: impl Into<String>) -> Self {
        Self {
            operator,
            version: version.into(),
        }
    }
}

impl fmt::Display for VersionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

/// Where the artifact of a dependency comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    Package,
    Git,
    Url,
    Path,
    Editable,
}

impl DependencyType {
    pub fn as_str(self) -> &'static str {
        match self {
            DependencyType::Package => "package",
            DependencyType::Git => "git",
            DependencyType::Url => "url",
            DependencyType::Path => "path",
            DependencyType::Editable => "editable",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical grouping of a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Main,
    Dev,
    Optional,
    Test,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Main => "main",
            Category::Dev => "dev",
            Category::Optional => "optional",
            Category::Test => "test",
        }
    }

    /// Category for a named dependency group: `dev` and `test` groups are
    /// development-only, every other group is an optional feature.
    pub fn from_group(group: &str) -> Self {
        match group {
            "dev" | "test" => Category::Dev,
            _ => Category::Optional,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dependency as declared in a manifest, uniform across file formats
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    /// Canonical package name
    pub name: String,
    /// File this dependency was parsed from
    pub source_file: String,
    pub dependency_type: DependencyType,
    pub category: Category,
    /// Constraint text as written, if any
    pub raw_specifier: Option<String>,
    /// Normalized constraints in the order they were written
    pub version_rules: Vec<VersionRule>,
    /// Environment marker, verbatim
    pub marker: Option<String>,
    pub extras_requested: Vec<String>,
    pub source_url: Option<String>,
    pub source_path: Option<String>,
    pub git_ref: Option<String>,
    /// Line number in the source file (1-indexed, line manifests only)
    pub line_number: Option<usize>,
    /// Extra of a parent package that pulled this one in (not tracked yet)
    pub required_by_extra: Option<String>,
}

impl Dependency {
    /// Create a bare dependency; `name` is canonicalized.
    pub fn new(
        name: &str,
        source_file: impl Into<String>,
        dependency_type: DependencyType,
        category: Category,
    ) -> Self {
        Self {
            name: canonicalize_name(name),
            source_file: source_file.into(),
            dependency_type,
            category,
            raw_specifier: None,
            version_rules: Vec::new(),
            marker: None,
            extras_requested: Vec::new(),
            source_url: None,
            source_path: None,
            git_ref: None,
            line_number: None,
            required_by_extra: None,
        }
    }

    /// Set the raw specifier together with the rules normalized from it
    pub fn with_specifier(mut self, raw: Option<String>, rules: Vec<VersionRule>) -> Self {
        self.raw_specifier = raw.filter(|s| !s.is_empty());
        self.version_rules = rules;
        self
    }

    pub fn with_marker(mut self, marker: Option<String>) -> Self {
        self.marker = marker.filter(|m| !m.is_empty());
        self
    }

    /// Set requested extras, dropping duplicates but keeping first-seen order
    pub fn with_extras<I, S>(mut self, extras: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = Vec::new();
        for extra in extras {
            let extra: String = extra.into();
            let extra = extra.trim().to_string();
            if !extra.is_empty() && !seen.contains(&extra) {
                seen.push(extra);
            }
        }
        self.extras_requested = seen;
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_source_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    pub fn with_git_ref(mut self, git_ref: Option<String>) -> Self {
        self.git_ref = git_ref;
        self
    }

    pub fn with_line_number(mut self, line_number: usize) -> Self {
        self.line_number = Some(line_number);
        self
    }

    /// Version of the exact-equality rule, if there is one
    pub fn pinned_version(&self) -> Option<&str> {
        pinned_version(&self.version_rules)
    }

    /// Flatten into primitive fields for tabular output
    pub fn to_record(&self) -> DependencyRecord {
        DependencyRecord {
            name: sanitize(&self.name),
            source_file: sanitize(&self.source_file),
            pinned_version: self.pinned_version().map(sanitize),
            raw_specifier: self.raw_specifier.as_deref().map(sanitize),
            dependency_type: self.dependency_type.as_str(),
            category: self.category.as_str(),
            source_url: self.source_url.as_deref().map(sanitize),
            source_path: self.source_path.as_deref().map(sanitize),
            git_ref: self.git_ref.as_deref().map(sanitize),
            marker: self.marker.as_deref().map(sanitize),
            line_number: self.line_number,
            extras_requested: self
                .extras_requested
                .iter()
                .map(String::as_str)
                .map(sanitize)
                .collect(),
        }
    }
}

/// Flat view of a [`Dependency`] for CSV/JSON style consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRecord {
    pub name: String,
    pub source_file: String,
    pub pinned_version: Option<String>,
    pub raw_specifier: Option<String>,
    pub dependency_type: &'static str,
    pub category: &'static str,
    pub source_url: Option<String>,
    pub source_path: Option<String>,
    pub git_ref: Option<String>,
    pub marker: Option<String>,
    pub line_number: Option<usize>,
    pub extras_requested: Vec<String>,
}

impl DependencyRecord {
    /// Extras flattened into one text cell
    pub fn extras_joined(&self, separator: &str) -> String {
        self.extras_requested.join(separator)
    }
}

/// Keep a value on one line so it fits in a single cell
fn sanitize(value: &str) -> String {
    value
        .replace(['\n', '\t'], " ")
        .replace('\r', "")
        .trim()
        .to_string()
}
