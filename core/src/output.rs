use crate::types::DependencyRecord;
use colored::Colorize;

/// Renders dependency records in a table format
pub struct TableRenderer {
    show_colors: bool,
}

struct Widths {
    name: usize,
    version: usize,
    kind: usize,
    category: usize,
}

impl TableRenderer {
    pub fn new(show_colors: bool) -> Self {
        Self { show_colors }
    }

    /// Render all records grouped in the order given
    pub fn render(&self, records: &[DependencyRecord]) {
        if records.is_empty() {
            println!("No dependencies found.");
            return;
        }

        for line in self.lines(records) {
            println!("{line}");
        }
    }

    /// Build the table rows without printing them
    pub fn lines(&self, records: &[DependencyRecord]) -> Vec<String> {
        let widths = Widths {
            name: records.iter().map(|r| r.name.len()).max().unwrap_or(0),
            version: records.iter().map(|r| version_cell(r).len()).max().unwrap_or(0),
            kind: records.iter().map(|r| r.dependency_type.len()).max().unwrap_or(0),
            category: records.iter().map(|r| r.category.len()).max().unwrap_or(0),
        };

        records.iter().map(|r| self.format_row(r, &widths)).collect()
    }

    fn format_row(&self, record: &DependencyRecord, widths: &Widths) -> String {
        let location = match record.line_number {
            Some(line) => format!("{}:{line}", record.source_file),
            None => record.source_file.clone(),
        };

        let origin = record
            .source_url
            .as_deref()
            .or(record.source_path.as_deref())
            .map(|o| match &record.git_ref {
                Some(git_ref) => format!("  {o}@{git_ref}"),
                None => format!("  {o}"),
            })
            .unwrap_or_default();

        // Pad before colouring so escape codes don't skew the alignment
        let category = format!("{:<w$}", record.category, w = widths.category);

        format!(
            "  {:<name_w$}  {:<version_w$}  {:<kind_w$}  {}  {}{}",
            record.name,
            version_cell(record),
            record.dependency_type,
            self.format_category(&category, record.category),
            location,
            origin,
            name_w = widths.name,
            version_w = widths.version,
            kind_w = widths.kind,
        )
    }

    /// Format a category cell with optional colors
    fn format_category(&self, cell: &str, category: &str) -> String {
        if !self.show_colors {
            return cell.to_string();
        }
        match category {
            "main" => cell.green().to_string(),
            "dev" | "test" => cell.yellow().to_string(),
            _ => cell.cyan().to_string(),
        }
    }
}

fn version_cell(record: &DependencyRecord) -> &str {
    record
        .pinned_version
        .as_deref()
        .or(record.raw_specifier.as_deref())
        .unwrap_or("*")
}
