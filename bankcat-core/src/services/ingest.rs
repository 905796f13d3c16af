//! Ingest service - bank statement CSV to transactions
//!
//! Rows are keyed by header name, filtered on the profile's account-type
//! rule, and turned into uncategorized [`Transaction`]s in source order.
//! An amount that can't be read does not stop the batch; it is reported
//! as a [`RowCoercionWarning`] next to the record it belongs to.

use std::path::Path;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Amount, BankProfile, Transaction, CSV_MIME};

pub const PDF_MIME: &str = "application/pdf";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A row whose amount column could not be read as a number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowCoercionWarning {
    /// 1-based data row, header excluded
    pub row: usize,
    /// Id of the transaction built from the row
    pub id: Uuid,
    pub column: String,
    pub raw: String,
}

/// Result of ingesting one statement
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestOutcome {
    pub transactions: Vec<Transaction>,
    pub warnings: Vec<RowCoercionWarning>,
    /// Rows dropped by the account-type filter
    pub excluded: usize,
}

/// Column positions resolved against the header row
struct HeaderIndex {
    date: usize,
    description: Vec<usize>,
    amount: usize,
    account_type: Option<usize>,
}

impl HeaderIndex {
    fn resolve(headers: &csv::StringRecord, profile: &BankProfile) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<&str> = profile
            .columns
            .required()
            .filter(|name| find(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::malformed(format!(
                "missing column(s) for {} statements: {}",
                profile.bank,
                missing.join(", ")
            )));
        }

        let columns = &profile.columns;
        Ok(Self {
            date: find(columns.date.as_str()).unwrap_or_default(),
            description: columns
                .description
                .iter()
                .map(|name| find(name.as_str()).unwrap_or_default())
                .collect(),
            amount: find(columns.amount.as_str()).unwrap_or_default(),
            account_type: find(profile.account_type_column.as_str()),
        })
    }
}

/// Fail on a quoted field that is never closed
///
/// The flexible reader would otherwise fold every following line into that
/// field. A quote only opens a field at its start, as in the reader itself.
fn check_quotes(text: &str) -> Result<()> {
    let mut chars = text.chars().peekable();
    let mut line = 1;
    let mut opened_on = 0;
    let mut in_quotes = false;
    let mut at_field_start = true;

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }
        if c == '"' && at_field_start {
            in_quotes = true;
            opened_on = line;
        }
        at_field_start = matches!(c, ',' | '\n' | '\r');
    }

    if in_quotes {
        return Err(Error::malformed(format!(
            "unterminated quoted field starting on line {}",
            opened_on
        )));
    }
    Ok(())
}

/// Parse statement text with the given profile
pub fn ingest(raw: &str, profile: &BankProfile) -> Result<IngestOutcome> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    if text.trim().is_empty() {
        return Ok(IngestOutcome::default());
    }
    check_quotes(text)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::malformed(format!("unreadable header row: {}", e)))?
        .clone();
    let index = HeaderIndex::resolve(&headers, profile)?;

    let mut outcome = IngestOutcome::default();
    let mut row = 0;

    for result in reader.records() {
        let record = result.map_err(|e| Error::malformed(e.to_string()))?;

        // Blank line
        if record.len() == 1 && record.get(0) == Some("") {
            continue;
        }
        row += 1;

        let field = |idx: usize| record.get(idx).unwrap_or("");

        let account_type = index.account_type.and_then(|idx| record.get(idx));
        if !profile.account_filter.admits(account_type) {
            outcome.excluded += 1;
            continue;
        }

        let description = index
            .description
            .iter()
            .map(|&idx| field(idx))
            .collect::<Vec<_>>()
            .join(" ");

        let amount = Amount::parse(field(index.amount));
        let tx = Transaction::new(field(index.date), description, amount);

        if let Amount::Unparsed(raw) = &tx.amount {
            outcome.warnings.push(RowCoercionWarning {
                row,
                id: tx.id,
                column: profile.columns.amount.clone(),
                raw: raw.clone(),
            });
        }

        outcome.transactions.push(tx);
    }

    Ok(outcome)
}

/// MIME type for a file name, from its extension
///
/// Only the extensions the statement picker accepts are known.
pub fn detect_file_type(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(CSV_MIME),
        "pdf" => Some(PDF_MIME),
        "xlsx" => Some(XLSX_MIME),
        _ => None,
    }
}

/// Check an uploaded file against the selected file type
///
/// Returns the detected MIME type when it matches the selection and a
/// processing path exists for it.
pub fn check_file_type(file_name: &str, expected: &str) -> Result<&'static str> {
    let actual = detect_file_type(file_name);
    match actual {
        Some(mime) if mime == expected => {
            if mime == CSV_MIME {
                Ok(mime)
            } else {
                Err(Error::UnsupportedFormat(mime.to_string()))
            }
        }
        _ => Err(Error::InvalidFileType {
            expected: expected.to_string(),
            actual: actual.unwrap_or("unknown").to_string(),
        }),
    }
}
