//! Terminal output helpers shared by the commands

use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use serde::Serialize;

use bankcat_core::{Amount, OperationResult};

pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error to stderr with an `error:` prefix
pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Condensed table with the given header row
pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

/// Print `data` inside a successful `OperationResult` as pretty JSON
pub fn print_ok<T: Serialize>(data: T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&OperationResult::ok(data))?);
    Ok(())
}

/// Amount cell; amounts that raised a warning are marked with `!`
pub fn amount_cell(amount: &Amount, flagged: bool) -> String {
    if flagged {
        format!("{} !", amount).yellow().to_string()
    } else {
        amount.to_string()
    }
}

pub fn category_cell(category: Option<&str>) -> String {
    match category {
        Some(c) => c.to_string(),
        None => "-".dimmed().to_string(),
    }
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["bytes", "KB", "MB"] {
        if size < 1024.0 {
            return if unit == "bytes" {
                format!("{} bytes", bytes)
            } else {
                format!("{:.1} {}", size, unit)
            };
        }
        size /= 1024.0;
    }
    format!("{:.1} GB", size)
}
