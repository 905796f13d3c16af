//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O or external
//! dependencies.

mod amount;
mod transaction;
pub mod profile;
pub mod result;

pub use amount::Amount;
pub use profile::{AccountFilter, BankProfile, ColumnMappings, ProfileRegistry, CSV_MIME};
pub use transaction::Transaction;
