//! The reconciliation diff.
//!
//! Pure and store-independent: given what should exist and what does exist,
//! say what to add and what to remove. Both sides are sorted sets, so the
//! output is lexicographically ordered and deterministic.

use std::collections::BTreeSet;

/// Operations needed to turn `existing` into `desired`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDiff<T> {
    /// In `desired` but not in `existing`, ascending.
    pub to_upload: Vec<T>,
    /// In `existing` but not in `desired`, ascending.
    pub to_delete: Vec<T>,
}

impl<T> KeyDiff<T> {
    /// True when the two sets already match.
    pub fn is_empty(&self) -> bool {
        self.to_upload.is_empty() && self.to_delete.is_empty()
    }
}

/// Compute `desired - existing` and `existing - desired`.
///
/// The two output lists are always disjoint.
pub fn diff_keys<T: Ord + Clone>(desired: &BTreeSet<T>, existing: &BTreeSet<T>) -> KeyDiff<T> {
    KeyDiff {
        to_upload: desired.difference(existing).cloned().collect(),
        to_delete: existing.difference(desired).cloned().collect(),
    }
}
