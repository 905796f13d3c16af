//! Export service - categorized transactions back to CSV
//!
//! The default options reproduce the legacy download byte for byte:
//! fields joined with bare commas, `undefined` for records without a
//! category, lines joined with `\n` and no trailing newline. Descriptions
//! containing commas don't survive a re-import in that mode; use
//! [`Quoting::Rfc4180`] when the file has to be read back.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::Transaction;

/// Default name of the exported file
pub const EXPORT_FILE_NAME: &str = "categorized_transactions.csv";

pub const EXPORT_HEADER: [&str; 4] = ["Date", "Description", "Amount", "Category"];

/// How a missing category is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UncategorizedStyle {
    /// Literal `undefined`
    #[default]
    Undefined,
    /// Empty field
    Blank,
}

impl UncategorizedStyle {
    fn placeholder(&self) -> &'static str {
        match self {
            UncategorizedStyle::Undefined => "undefined",
            UncategorizedStyle::Blank => "",
        }
    }
}

impl FromStr for UncategorizedStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "undefined" => Ok(Self::Undefined),
            "blank" => Ok(Self::Blank),
            other => Err(Error::Config(format!(
                "unknown uncategorized style '{}' (expected undefined or blank)",
                other
            ))),
        }
    }
}

/// Field quoting mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quoting {
    /// Bare comma join, no escaping
    #[default]
    None,
    /// Quote fields containing delimiters, quotes or line breaks
    Rfc4180,
}

impl FromStr for Quoting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Self::None),
            "rfc4180" => Ok(Self::Rfc4180),
            other => Err(Error::Config(format!(
                "unknown quoting mode '{}' (expected none or rfc4180)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    #[serde(default)]
    pub uncategorized: UncategorizedStyle,
    #[serde(default)]
    pub quoting: Quoting,
}

fn fields<'a>(tx: &'a Transaction, options: &ExportOptions) -> [std::borrow::Cow<'a, str>; 4] {
    [
        tx.date.as_str().into(),
        tx.description.as_str().into(),
        tx.amount.to_string().into(),
        tx.category
            .as_deref()
            .unwrap_or(options.uncategorized.placeholder())
            .into(),
    ]
}

/// Render a collection as CSV text
pub fn serialize(collection: &[Transaction], options: &ExportOptions) -> Result<String> {
    match options.quoting {
        Quoting::None => Ok(serialize_plain(collection, options)),
        Quoting::Rfc4180 => serialize_quoted(collection, options),
    }
}

fn serialize_plain(collection: &[Transaction], options: &ExportOptions) -> String {
    std::iter::once(EXPORT_HEADER.join(","))
        .chain(collection.iter().map(|tx| fields(tx, options).join(",")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn serialize_quoted(collection: &[Transaction], options: &ExportOptions) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADER).map_err(std::io::Error::from)?;
    for tx in collection {
        let row = fields(tx, options);
        writer
            .write_record(row.iter().map(|f| f.as_bytes()))
            .map_err(std::io::Error::from)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let text = String::from_utf8(bytes).map_err(|e| Error::malformed(e.to_string()))?;
    Ok(text.strip_suffix('\n').unwrap_or(&text).to_string())
}

/// Serialize a collection and write it to `path`
pub fn write_export(path: &Path, collection: &[Transaction], options: &ExportOptions) -> Result<()> {
    let content = serialize(collection, options)?;
    std::fs::write(path, content)?;
    Ok(())
}
