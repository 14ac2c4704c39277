pub mod name;
pub mod output;
pub mod types;
pub mod version;

// Re-export commonly used types at crate root
pub use name::canonicalize_name;
pub use output::TableRenderer;
pub use types::{Category, Dependency, DependencyRecord, DependencyType, Operator, VersionRule};
pub use version::{parse_specifier, pinned_version};
