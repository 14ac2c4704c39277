use crate::detector::DEFAULT_MAX_FILE_SIZE;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// How records are written to stdout
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned, colored table
    #[default]
    Table,
    /// One JSON object per line
    Json,
}

/// Extract dependency declarations from Python manifests
#[derive(Parser, Debug, Clone)]
#[command(name = "depmine")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Project directory or manifest file (defaults to current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Skip manifests larger than this many bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u64,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Print parse diagnostics to stderr
    #[arg(short, long)]
    pub diagnostics: bool,
}

impl Args {
    /// Get the project path, defaulting to current directory
    pub fn project_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
