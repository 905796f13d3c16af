//! Bank profiles
//!
//! A profile says how one bank's export maps onto a [`Transaction`]:
//! which columns hold the date, description parts and amount, and which
//! account types to leave out. Profiles are keyed by (bank, file type).
//!
//! [`Transaction`]: super::Transaction

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// MIME type of CSV statement exports
pub const CSV_MIME: &str = "text/csv";

/// Column names used to build a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMappings {
    pub date: String,
    /// Joined with a single space, in this order
    pub description: Vec<String>,
    pub amount: String,
}

impl ColumnMappings {
    /// Every column a row needs to become a transaction
    pub fn required(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.date.as_str())
            .chain(self.description.iter().map(String::as_str))
            .chain(std::iter::once(self.amount.as_str()))
    }
}

/// Which account types survive ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "rule", content = "accountTypes")]
pub enum AccountFilter {
    /// Keep everything except these
    Exclude(BTreeSet<String>),
    /// Keep only these
    AllowOnly(BTreeSet<String>),
}

impl AccountFilter {
    pub fn exclude<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exclude(types.into_iter().map(Into::into).collect())
    }

    pub fn allow_only<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AllowOnly(types.into_iter().map(Into::into).collect())
    }

    /// Whether a row with this account type is kept
    ///
    /// `None` means the row has no account type at all; such rows always pass.
    pub fn admits(&self, account_type: Option<&str>) -> bool {
        let Some(value) = account_type.filter(|v| !v.is_empty()) else {
            return true;
        };
        match self {
            AccountFilter::Exclude(types) => !types.contains(value),
            AccountFilter::AllowOnly(types) => types.contains(value),
        }
    }
}

/// Extraction rules for one (bank, file type) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankProfile {
    pub bank: String,
    pub file_type: String,
    pub columns: ColumnMappings,
    pub account_type_column: String,
    pub account_filter: AccountFilter,
}

impl BankProfile {
    /// Royal Bank of Canada CSV export
    ///
    /// Expenses come from credit accounts, so chequing and savings rows
    /// are dropped.
    pub fn rbc_csv() -> Self {
        Self {
            bank: "RBC".to_string(),
            file_type: CSV_MIME.to_string(),
            columns: ColumnMappings {
                date: "Transaction Date".to_string(),
                description: vec!["Description 1".to_string(), "Description 2".to_string()],
                amount: "CAD$".to_string(),
            },
            account_type_column: "Account Type".to_string(),
            account_filter: AccountFilter::exclude(["Chequing", "Savings"]),
        }
    }
}

/// Lookup table of supported profiles
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<BankProfile>,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileRegistry {
    /// The profiles bankcat ships with
    pub fn builtin() -> Self {
        Self {
            profiles: vec![BankProfile::rbc_csv()],
        }
    }

    /// Find the profile for a bank and file type
    pub fn resolve(&self, bank: &str, file_type: &str) -> Result<&BankProfile> {
        self.profiles
            .iter()
            .find(|p| p.bank == bank && p.file_type == file_type)
            .ok_or_else(|| Error::UnsupportedProfile {
                bank: bank.to_string(),
                file_type: file_type.to_string(),
            })
    }

    pub fn profiles(&self) -> &[BankProfile] {
        &self.profiles
    }

    /// Selectable banks, in registration order
    pub fn banks(&self) -> Vec<&str> {
        let mut banks: Vec<&str> = Vec::new();
        for p in &self.profiles {
            if !banks.contains(&p.bank.as_str()) {
                banks.push(&p.bank);
            }
        }
        banks
    }

    /// Selectable file types, in registration order
    pub fn file_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for p in &self.profiles {
            if !types.contains(&p.file_type.as_str()) {
                types.push(&p.file_type);
            }
        }
        types
    }
}
