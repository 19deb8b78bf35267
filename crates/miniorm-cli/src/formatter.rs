//! Output formatters for demo sections.

use crate::demo::Section;
use clap::ValueEnum;
use comfy_table::{Cell, Table};
use miniorm_core::Value;
use serde::Serialize;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter {
    /// Format every section into one document.
    fn format_sections(&self, sections: &[Section]) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_sections(&self, sections: &[Section]) -> String {
        let mut output = String::new();
        for section in sections {
            if !output.is_empty() {
                output.push_str("\n\n");
            }
            output.push_str(section.title);
            output.push('\n');
            if section.rows.is_empty() {
                output.push_str("No results");
                continue;
            }

            let mut table = Table::new();
            table.set_header(section.columns.iter().copied());
            for row in &section.rows {
                table.add_row(row.iter().map(|v| Cell::new(cell_text(v))));
            }
            output.push_str(&table.to_string());
        }
        output
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON formatter.
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonSection<'a> {
    title: &'a str,
    rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl Formatter for JsonFormatter {
    fn format_sections(&self, sections: &[Section]) -> String {
        let sections: Vec<JsonSection<'_>> = sections
            .iter()
            .map(|section| JsonSection {
                title: section.title,
                rows: section
                    .rows
                    .iter()
                    .map(|row| {
                        section
                            .columns
                            .iter()
                            .zip(row)
                            .map(|(column, value)| {
                                let value = serde_json::to_value(value)
                                    .unwrap_or(serde_json::Value::Null);
                                (column.to_string(), value)
                            })
                            .collect()
                    })
                    .collect(),
            })
            .collect();

        serde_json::to_string_pretty(&sections).unwrap_or_else(|_| "[]".to_string())
    }
}
