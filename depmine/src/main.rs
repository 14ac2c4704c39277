use anyhow::Result;
use clap::Parser;
use depmine::cli::{Args, OutputFormat};
use depmine::detector::{ManifestDetector, load};
use depmine::{Dependency, DependencyRecord, ParseOutcome, TableRenderer, parse};
use rayon::prelude::*;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Logs go to stderr so they never mix with JSON output (controlled by RUST_LOG)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.no_color {
        colored::control::set_override(false);
    }

    let detector = ManifestDetector::new(args.project_path());
    let files = detector.detect()?;
    tracing::info!(count = files.len(), "found manifest files");

    // Each file parses independently; collect() keeps the sorted file order
    let outcomes: Vec<ParseOutcome> = files
        .par_iter()
        .map(|path| parse_file(detector.root(), path, args.max_file_size))
        .collect();

    let outcome = outcomes.into_iter().fold(ParseOutcome::new(), |mut all, outcome| {
        all.merge(outcome);
        all
    });

    if args.diagnostics {
        for diagnostic in &outcome.diagnostics {
            eprintln!("{diagnostic}");
        }
    }

    let records: Vec<DependencyRecord> =
        outcome.dependencies.iter().map(Dependency::to_record).collect();

    match args.format {
        OutputFormat::Table => TableRenderer::new(!args.no_color).render(&records),
        OutputFormat::Json => {
            for record in &records {
                println!("{}", serde_json::to_string(record)?);
            }
        }
    }

    Ok(())
}

/// Load and parse one manifest; unreadable files become an error diagnostic
fn parse_file(root: &Path, path: &Path, max_bytes: u64) -> ParseOutcome {
    let name = display_name(root, path);

    match load(path, max_bytes) {
        Ok(content) => parse(&name, content.as_deref()),
        Err(e) => {
            let mut outcome = ParseOutcome::new();
            outcome.error(&name, None, format!("{e:#}"));
            outcome
        }
    }
}

/// Path relative to the project root, or the path itself when the root is the file
fn display_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).ok().filter(|p| !p.as_os_str().is_empty());
    relative.unwrap_or(path).to_string_lossy().into_owned()
}
