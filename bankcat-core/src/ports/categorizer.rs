//! Categorizer port
//!
//! Defines the interface to the external service that assigns categories
//! to transactions.

use crate::domain::result::Result;
use crate::domain::Transaction;

/// Categorization service
///
/// Implementations receive the full collection and return it with
/// categories filled in. The session trusts the returned records as-is
/// unless verification is turned on.
pub trait Categorizer: Send + Sync {
    /// Service name (e.g., "http")
    fn name(&self) -> &str;

    /// Categorize a batch of transactions
    ///
    /// Any failure is reported as `Error::Categorization`; implementations
    /// don't retry.
    fn categorize(&self, transactions: &[Transaction]) -> Result<Vec<Transaction>>;
}
