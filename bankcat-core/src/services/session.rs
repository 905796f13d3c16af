//! Upload session - the statement workflow state
//!
//! A session holds the bank and file-type selection, the uploaded file,
//! and the single in-memory transaction collection. Changing either
//! selection, re-uploading, or clearing discards the collection.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{BankProfile, ProfileRegistry, Transaction};
use crate::ports::Categorizer;
use crate::services::export::{self, ExportOptions};
use crate::services::ingest::{self, RowCoercionWarning};
use crate::services::merge;

#[derive(Debug, Clone, Default)]
pub struct Session {
    registry: Arc<ProfileRegistry>,
    bank: Option<String>,
    file_type: Option<String>,
    file_name: Option<String>,
    transactions: Vec<Transaction>,
    warnings: Vec<RowCoercionWarning>,
    excluded: usize,
    pending: bool,
    verify: bool,
}

impl Session {
    pub fn new(registry: Arc<ProfileRegistry>) -> Self {
        Self {
            registry,
            ..Default::default()
        }
    }

    /// Check categorizer output against the request before accepting it
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn select_bank(&mut self, bank: impl Into<String>) {
        self.bank = Some(bank.into());
        self.clear();
    }

    pub fn select_file_type(&mut self, file_type: impl Into<String>) {
        self.file_type = Some(file_type.into());
        self.clear();
    }

    pub fn bank(&self) -> Option<&str> {
        self.bank.as_deref()
    }

    pub fn file_type(&self) -> Option<&str> {
        self.file_type.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn warnings(&self) -> &[RowCoercionWarning] {
        &self.warnings
    }

    /// Rows the account-type filter dropped from the last upload
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    /// True while a categorization call is in flight
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Profile for the current selection
    pub fn profile(&self) -> Result<&BankProfile> {
        match (&self.bank, &self.file_type) {
            (Some(bank), Some(file_type)) => self.registry.resolve(bank, file_type),
            _ => Err(Error::NoSelection),
        }
    }

    /// Whether the current selection resolves to a profile
    pub fn can_upload(&self) -> bool {
        self.profile().is_ok()
    }

    /// Validate and ingest a statement file
    ///
    /// The file's type is checked against the selection before the
    /// profile is resolved, so a PDF or spreadsheet fails as an
    /// unsupported format rather than an unsupported profile.
    ///
    /// Replaces the collection wholesale. On any failure the session is
    /// left with no upload and an empty collection.
    pub fn upload(&mut self, file_name: &str, bytes: &[u8]) -> Result<usize> {
        self.clear();

        let Some(file_type) = self.file_type.as_deref().filter(|_| self.bank.is_some()) else {
            return Err(Error::NoSelection);
        };
        ingest::check_file_type(file_name, file_type)?;
        let profile = self.profile()?.clone();

        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::malformed(format!("statement is not valid UTF-8: {}", e)))?;
        let outcome = ingest::ingest(text, &profile)?;

        self.file_name = Some(file_name.to_string());
        self.transactions = outcome.transactions;
        self.warnings = outcome.warnings;
        self.excluded = outcome.excluded;

        Ok(self.transactions.len())
    }

    /// Send the collection to the categorizer and take its result
    ///
    /// On failure the collection is left as it was before the call.
    pub fn categorize(&mut self, categorizer: &dyn Categorizer) -> Result<usize> {
        if self.file_name.is_none() {
            return Err(Error::NoUpload);
        }
        self.profile()?;

        self.pending = true;
        let result = categorizer.categorize(&self.transactions);
        self.pending = false;

        let categorized = result?;
        if self.verify {
            merge::verify_categorization(&self.transactions, &categorized)?;
        }

        self.transactions = merge::apply_bulk_categories(&self.transactions, categorized);
        Ok(merge::categorized_count(&self.transactions))
    }

    /// Manually set one record's category
    pub fn edit_category(&mut self, id: Uuid, category: &str) {
        self.transactions = merge::apply_user_edit(&self.transactions, id, category);
    }

    /// Drop the uploaded file and its records
    pub fn clear(&mut self) {
        self.file_name = None;
        self.transactions.clear();
        self.warnings.clear();
        self.excluded = 0;
    }

    pub fn export(&self, options: &ExportOptions) -> Result<String> {
        export::serialize(&self.transactions, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CSV_MIME;

    const STATEMENT: &str = "Account Type,Transaction Date,Description 1,Description 2,CAD$\n\
        Visa,2023-06-01,Grocery Store,,-50.00\n\
        Savings,2023-06-01,Interest,,1.00\n\
        Visa,2023-06-02,Gas Station,,-30.00";

    struct StubCategorizer {
        fail: bool,
    }

    impl StubCategorizer {
        fn ok() -> Self {
            Self { fail: false }
        }

        fn failing() -> Self {
            Self { fail: true }
        }
    }

    impl Categorizer for StubCategorizer {
        fn name(&self) -> &str {
            "stub"
        }

        fn categorize(&self, transactions: &[Transaction]) -> Result<Vec<Transaction>> {
            if self.fail {
                return Err(Error::categorization("service unavailable"));
            }
            Ok(transactions.iter().map(|tx| tx.with_category("Misc")).collect())
        }
    }

    fn rbc_session() -> Session {
        let mut session = Session::new(Arc::new(ProfileRegistry::builtin()));
        session.select_bank("RBC");
        session.select_file_type(CSV_MIME);
        session
    }

    #[test]
    fn test_cannot_upload_without_selection() {
        let mut session = Session::new(Arc::new(ProfileRegistry::builtin()));
        assert!(!session.can_upload());
        assert!(matches!(
            session.upload("june.csv", STATEMENT.as_bytes()),
            Err(Error::NoSelection)
        ));

        session.select_bank("TD");
        session.select_file_type(CSV_MIME);
        assert!(!session.can_upload());
        assert!(matches!(
            session.upload("june.csv", STATEMENT.as_bytes()),
            Err(Error::UnsupportedProfile { .. })
        ));
    }

    #[test]
    fn test_upload_ingests_statement() {
        let mut session = rbc_session();
        assert!(session.can_upload());

        let count = session.upload("june.csv", STATEMENT.as_bytes()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(session.file_name(), Some("june.csv"));
        assert_eq!(session.excluded(), 1);
        assert_eq!(session.transactions()[0].description, "Grocery Store ");
    }

    #[test]
    fn test_mismatched_file_type_clears_upload() {
        let mut session = rbc_session();
        session.upload("june.csv", STATEMENT.as_bytes()).unwrap();

        let err = session.upload("june.pdf", b"%PDF-1.4").unwrap_err();
        assert!(matches!(err, Error::InvalidFileType { .. }));
        assert!(session.file_name().is_none());
        assert!(session.transactions().is_empty());
    }

    #[test]
    fn test_pdf_and_xlsx_uploads_are_unsupported_formats() {
        let mut session = Session::new(Arc::new(ProfileRegistry::builtin()));
        session.select_bank("RBC");

        session.select_file_type(ingest::PDF_MIME);
        assert!(matches!(
            session.upload("june.pdf", b"%PDF-1.4"),
            Err(Error::UnsupportedFormat(_))
        ));

        session.select_file_type(ingest::XLSX_MIME);
        assert!(matches!(
            session.upload("june.xlsx", b"PK"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(session.file_name().is_none());
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let mut session = rbc_session();
        let err = session.upload("june.csv", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
        assert!(session.transactions().is_empty());
    }

    #[test]
    fn test_changing_selection_discards_collection() {
        let mut session = rbc_session();
        session.upload("june.csv", STATEMENT.as_bytes()).unwrap();

        session.select_bank("RBC");
        assert!(session.transactions().is_empty());
        assert!(session.file_name().is_none());

        session.upload("june.csv", STATEMENT.as_bytes()).unwrap();
        session.select_file_type(CSV_MIME);
        assert!(session.transactions().is_empty());
    }

    #[test]
    fn test_categorize_requires_upload() {
        let mut session = rbc_session();
        assert!(matches!(
            session.categorize(&StubCategorizer::ok()),
            Err(Error::NoUpload)
        ));
    }

    #[test]
    fn test_categorize_replaces_collection() {
        let mut session = rbc_session();
        session.upload("june.csv", STATEMENT.as_bytes()).unwrap();
        let ids: Vec<Uuid> = session.transactions().iter().map(|t| t.id).collect();

        let count = session.categorize(&StubCategorizer::ok()).unwrap();
        assert_eq!(count, 2);
        assert!(!session.is_pending());

        let after: Vec<Uuid> = session.transactions().iter().map(|t| t.id).collect();
        assert_eq!(after, ids);
        assert!(session.transactions().iter().all(|t| t.category.as_deref() == Some("Misc")));
    }

    #[test]
    fn test_failed_categorize_keeps_collection_and_clears_pending() {
        let mut session = rbc_session();
        session.upload("june.csv", STATEMENT.as_bytes()).unwrap();
        let before = session.transactions().to_vec();

        let err = session.categorize(&StubCategorizer::failing()).unwrap_err();

        assert!(matches!(err, Error::Categorization(_)));
        assert!(!session.is_pending());
        assert_eq!(session.transactions(), before.as_slice());
    }

    #[test]
    fn test_verification_rejects_short_result() {
        struct Short;
        impl Categorizer for Short {
            fn name(&self) -> &str {
                "short"
            }
            fn categorize(&self, transactions: &[Transaction]) -> Result<Vec<Transaction>> {
                Ok(transactions[..1].to_vec())
            }
        }

        let mut session = rbc_session().with_verification(true);
        session.upload("june.csv", STATEMENT.as_bytes()).unwrap();
        let before = session.transactions().to_vec();

        assert!(matches!(
            session.categorize(&Short),
            Err(Error::CategorizationMismatch(_))
        ));
        assert_eq!(session.transactions(), before.as_slice());

        // Without verification the short result is taken as-is
        let mut trusting = rbc_session();
        trusting.upload("june.csv", STATEMENT.as_bytes()).unwrap();
        trusting.categorize(&Short).unwrap();
        assert_eq!(trusting.transactions().len(), 1);
    }

    #[test]
    fn test_edit_and_export() {
        let mut session = rbc_session();
        session.upload("june.csv", STATEMENT.as_bytes()).unwrap();
        let id = session.transactions()[0].id;

        session.edit_category(id, "Groceries");
        let out = session.export(&ExportOptions::default()).unwrap();
        assert_eq!(
            out,
            "Date,Description,Amount,Category\n\
             2023-06-01,Grocery Store ,-50,Groceries\n\
             2023-06-02,Gas Station ,-30,undefined"
        );
    }

    #[test]
    fn test_clear() {
        let mut session = rbc_session();
        session.upload("june.csv", STATEMENT.as_bytes()).unwrap();
        session.clear();

        assert!(session.file_name().is_none());
        assert!(session.transactions().is_empty());
        assert!(session.warnings().is_empty());
        assert_eq!(session.bank(), Some("RBC"));
        assert!(session.can_upload());
    }
}
