use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a temporary project directory
pub struct TempProject {
    pub dir: TempDir,
}

impl TempProject {
    /// Create a new temporary project
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        Self { dir }
    }

    /// Get the path to the project directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a file in the project with the given content
    pub fn create_file(&self, relative_path: &str, content: &str) {
        let file_path = self.dir.path().join(relative_path);

        // Create parent directories if needed
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Get the absolute path to a file in the project
    pub fn file_path(&self, relative_path: &str) -> PathBuf {
        self.dir.path().join(relative_path)
    }
}

/// requirements.txt mixing pins, ranges, VCS and editable lines
pub fn sample_requirements_txt() -> &'static str {
    r#"# Sample requirements.txt
requests==2.28.1
Django>=4.0,<5.0
uvicorn[standard]==0.20.0 ; python_version < '3.11'
git+https://github.com/django/django.git@main#egg=django-dev
-e ./libs/internal-lib
-r requirements-dev.txt
"#
}

/// pyproject.toml with PEP 621 and Poetry sections side by side
pub fn sample_pyproject() -> &'static str {
    r#"[project]
name = "test-project"
version = "0.1.0"
dependencies = [
    "fastapi>=0.100",
]

[project.optional-dependencies]
test = ["pytest>=7.0"]
docs = ["mkdocs"]

[tool.poetry.dependencies]
python = "^3.10"
numpy = "^1.24"
"#
}

/// poetry.lock with a main and a dev package
pub fn sample_poetry_lock() -> &'static str {
    r#"[[package]]
name = "certifi"
version = "2022.12.7"
category = "main"

[[package]]
name = "pytest"
version = "7.2.0"
category = "dev"
"#
}

/// Project containing all three manifest kinds
pub fn create_full_project() -> TempProject {
    let project = TempProject::new();
    project.create_file("requirements.txt", sample_requirements_txt());
    project.create_file("pyproject.toml", sample_pyproject());
    project.create_file("poetry.lock", sample_poetry_lock());
    project
}
