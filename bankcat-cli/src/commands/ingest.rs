//! Ingest command - preview how a statement is read

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use uuid::Uuid;

use super::{get_context, get_logger, log_event, open_session, session_event, short_id, upload_statement};
use crate::output;
use bankcat_core::services::Session;

/// Print the session's records as a table, flagging unreadable amounts
pub fn print_transactions(session: &Session) {
    let flagged: HashSet<Uuid> = session.warnings().iter().map(|w| w.id).collect();

    let mut table = output::table(&["#", "ID", "Date", "Description", "Amount", "Category"]);

    for (i, tx) in session.transactions().iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            short_id(&tx.id),
            tx.date.clone(),
            tx.description.clone(),
            output::amount_cell(&tx.amount, flagged.contains(&tx.id)),
            output::category_cell(tx.category.as_deref()),
        ]);
    }

    println!("{}", table);
}

/// Print one line per row whose amount could not be read
pub fn print_warnings(session: &Session) {
    for w in session.warnings() {
        output::warning(&format!(
            "Row {}: could not read {} value '{}' as an amount",
            w.row, w.column, w.raw
        ));
    }
}

pub fn run(file: PathBuf, bank: Option<String>, file_type: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let mut session = open_session(&ctx, bank, file_type);

    let count = upload_statement(&ctx, &mut session, &file)?;
    log_event(
        &get_logger(),
        session_event("statement_ingested", "ingest", &session)
            .with_error_details(format!("{} records, {} warnings", count, session.warnings().len())),
    );

    if json {
        let data = json!({
            "bank": session.bank(),
            "fileType": session.file_type(),
            "transactions": session.transactions(),
            "warnings": session.warnings(),
            "excluded": session.excluded(),
        });
        return output::print_ok(data);
    }

    if count == 0 {
        output::warning("No transactions found in statement.");
    } else {
        print_transactions(&session);
    }

    println!();
    println!(
        "{} transactions read, {} rows excluded by account type",
        count.to_string().bold(),
        session.excluded()
    );
    print_warnings(&session);

    Ok(())
}
