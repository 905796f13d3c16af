//! Transaction domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::amount::Amount;

/// A normalized statement line
///
/// `date` is kept verbatim from the statement; bank exports disagree on
/// date formats and nothing downstream needs a parsed date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Generated at ingestion time; the merge key for category edits
    pub id: Uuid,
    pub date: String,
    pub description: String,
    pub amount: Amount,
    /// Unset until the categorization service or the user assigns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Transaction {
    /// Create an uncategorized transaction with a fresh id
    pub fn new(date: impl Into<String>, description: impl Into<String>, amount: Amount) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: date.into(),
            description: description.into(),
            amount,
            category: None,
        }
    }

    /// Copy of this transaction with the category replaced
    pub fn with_category(&self, category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..self.clone()
        }
    }

    pub fn is_categorized(&self) -> bool {
        self.category.is_some()
    }
}
