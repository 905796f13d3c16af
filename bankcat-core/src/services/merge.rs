//! Category merge
//!
//! Collections are never mutated in place: every operation returns a new
//! sequence in the same order as its input.

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::Transaction;

/// Replace a collection with the categorizer's output
///
/// The categorizer is trusted: its records are taken as-is. Call
/// [`verify_categorization`] first to check that they line up.
pub fn apply_bulk_categories(
    _original: &[Transaction],
    categorized: Vec<Transaction>,
) -> Vec<Transaction> {
    categorized
}

/// Check that categorized records correspond one-to-one with the request
///
/// Same length, same ids, same order.
pub fn verify_categorization(original: &[Transaction], categorized: &[Transaction]) -> Result<()> {
    if original.len() != categorized.len() {
        return Err(Error::CategorizationMismatch(format!(
            "sent {} transactions, received {}",
            original.len(),
            categorized.len()
        )));
    }

    if let Some((pos, (sent, got))) = original
        .iter()
        .zip(categorized)
        .enumerate()
        .find(|(_, (sent, got))| sent.id != got.id)
    {
        return Err(Error::CategorizationMismatch(format!(
            "record {} has id {}, expected {}",
            pos + 1,
            got.id,
            sent.id
        )));
    }

    Ok(())
}

/// Set the category of one record
///
/// Unknown ids leave the collection unchanged.
pub fn apply_user_edit(collection: &[Transaction], id: Uuid, category: &str) -> Vec<Transaction> {
    collection
        .iter()
        .map(|tx| {
            if tx.id == id {
                tx.with_category(category)
            } else {
                tx.clone()
            }
        })
        .collect()
}

pub fn categorized_count(collection: &[Transaction]) -> usize {
    collection.iter().filter(|tx| tx.is_categorized()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Amount;

    fn sample() -> Vec<Transaction> {
        vec![
            Transaction::new("2023-06-01", "Grocery Store", Amount::parse("-50.00")),
            Transaction::new("2023-06-02", "Gas Station", Amount::parse("-30.00")),
            Transaction::new("2023-06-03", "Restaurant", Amount::parse("-25.00")),
        ]
    }

    fn categorize_all(txs: &[Transaction], category: &str) -> Vec<Transaction> {
        txs.iter().map(|tx| tx.with_category(category)).collect()
    }

    #[test]
    fn test_bulk_result_is_categorizer_output() {
        let original = sample();
        let categorized = categorize_all(&original, "Misc");
        let merged = apply_bulk_categories(&original, categorized.clone());
        assert_eq!(merged, categorized);
    }

    #[test]
    fn test_verify_accepts_matching_ids() {
        let original = sample();
        let categorized = categorize_all(&original, "Misc");
        assert!(verify_categorization(&original, &categorized).is_ok());
    }

    #[test]
    fn test_verify_rejects_length_mismatch() {
        let original = sample();
        let categorized = categorize_all(&original[..2], "Misc");
        let err = verify_categorization(&original, &categorized).unwrap_err();
        assert!(matches!(err, Error::CategorizationMismatch(_)));
        assert!(err.to_string().contains("sent 3"));
    }

    #[test]
    fn test_verify_rejects_reordered_ids() {
        let original = sample();
        let mut categorized = categorize_all(&original, "Misc");
        categorized.swap(0, 2);
        assert!(matches!(
            verify_categorization(&original, &categorized),
            Err(Error::CategorizationMismatch(_))
        ));
    }

    #[test]
    fn test_user_edit_changes_only_target() {
        let original = sample();
        let target = original[1].id;
        let edited = apply_user_edit(&original, target, "Transportation");

        assert_eq!(edited.len(), original.len());
        assert_eq!(edited[1].category.as_deref(), Some("Transportation"));
        assert_eq!(edited[0], original[0]);
        assert_eq!(edited[2], original[2]);
        assert!(original[1].category.is_none());
    }

    #[test]
    fn test_user_edit_is_idempotent() {
        let original = sample();
        let target = original[0].id;
        let once = apply_user_edit(&original, target, "Groceries");
        let twice = apply_user_edit(&once, target, "Groceries");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_user_edit_unknown_id_is_noop() {
        let original = sample();
        let edited = apply_user_edit(&original, Uuid::new_v4(), "Groceries");
        assert_eq!(edited, original);
    }

    #[test]
    fn test_user_edit_overrides_existing_category() {
        let original = categorize_all(&sample(), "Dining");
        let target = original[2].id;
        let edited = apply_user_edit(&original, target, "Entertainment");
        assert_eq!(edited[2].category.as_deref(), Some("Entertainment"));
        assert_eq!(categorized_count(&edited), 3);
    }

    #[test]
    fn test_categorized_count() {
        let original = sample();
        assert_eq!(categorized_count(&original), 0);
        let edited = apply_user_edit(&original, original[0].id, "Groceries");
        assert_eq!(categorized_count(&edited), 1);
    }
}
