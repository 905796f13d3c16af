//! Categorize command - ingest, categorize, apply overrides, export

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;

use super::ingest::{print_transactions, print_warnings};
use super::{get_context, get_logger, log_event, open_session, session_event, upload_statement};
use crate::output;
use bankcat_core::services::{merge, Quoting, UncategorizedStyle, EXPORT_FILE_NAME};
use bankcat_core::services::export;

pub struct CategorizeArgs {
    pub file: PathBuf,
    pub bank: Option<String>,
    pub file_type: Option<String>,
    pub overrides: Vec<String>,
    pub output: Option<PathBuf>,
    pub blank_uncategorized: bool,
    pub quote: bool,
    pub verify: bool,
    pub json: bool,
}

/// Parse a `ROW=CATEGORY` override; rows are 1-based
fn parse_override(arg: &str) -> Result<(usize, String)> {
    let (row, category) = arg
        .split_once('=')
        .with_context(|| format!("Invalid override '{}': expected ROW=CATEGORY", arg))?;
    let row: usize = row
        .trim()
        .parse()
        .with_context(|| format!("Invalid row number in '{}'", arg))?;
    if row == 0 {
        anyhow::bail!("Row numbers start at 1 (got '{}')", arg);
    }
    Ok((row, category.trim().to_string()))
}

pub fn run(args: CategorizeArgs) -> Result<()> {
    let ctx = get_context()?;
    let overrides = args
        .overrides
        .iter()
        .map(|s| parse_override(s))
        .collect::<Result<Vec<_>>>()?;

    let mut session = open_session(&ctx, args.bank, args.file_type)
        .with_verification(ctx.config.verify_categorization || args.verify);
    let count = upload_statement(&ctx, &mut session, &args.file)?;

    let categorizer = ctx.categorizer()?;
    if !args.json {
        output::info(&format!(
            "Categorizing {} transactions via {}",
            count,
            categorizer.endpoint()
        ));
    }
    let logger = get_logger();
    log_event(&logger, session_event("categorization_started", "categorize", &session));
    session.categorize(&categorizer)?;

    for (row, category) in &overrides {
        let id = session
            .transactions()
            .get(row - 1)
            .map(|tx| tx.id)
            .with_context(|| format!("Row {} does not exist ({} transactions)", row, count))?;
        session.edit_category(id, category);
    }

    let mut options = ctx.export_options();
    if args.blank_uncategorized {
        options.uncategorized = UncategorizedStyle::Blank;
    }
    if args.quote {
        options.quoting = Quoting::Rfc4180;
    }

    let output_path = args.output.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
    export::write_export(&output_path, session.transactions(), &options)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    let categorized = merge::categorized_count(session.transactions());
    log_event(&logger, session_event("export_written", "categorize", &session));

    if args.json {
        let data = json!({
            "output": output_path.to_string_lossy(),
            "transactions": session.transactions(),
            "warnings": session.warnings(),
            "categorized": categorized,
            "total": session.transactions().len(),
        });
        return output::print_ok(data);
    }

    print_transactions(&session);
    print_warnings(&session);
    println!();
    output::success(&format!(
        "Wrote {} ({} of {} categorized)",
        output_path.display().to_string().bold(),
        categorized,
        session.transactions().len()
    ));

    Ok(())
}
