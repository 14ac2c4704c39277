pub mod cli;
pub mod detector;
pub mod diagnostics;
pub mod parsers;

pub use cli::Args;
pub use detector::ManifestDetector;
pub use diagnostics::{Diagnostic, ParseOutcome, Severity};
pub use parsers::{ManifestKind, is_dependency_file, parse, parse_dependency_file};

// Re-export core types for convenience
pub use depmine_core::{
    Category, Dependency, DependencyRecord, DependencyType, Operator, TableRenderer, VersionRule,
    canonicalize_name, parse_specifier,
};
