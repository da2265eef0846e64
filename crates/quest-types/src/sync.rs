//! Outcome of a single reconciliation run.

use serde::{Deserialize, Serialize};

/// What one reconciliation run changed under a prefix.
///
/// Both lists hold bare names (no prefix) in the order the operations were
/// applied, which is lexicographic. A run that found nothing to do yields an
/// empty result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncResult {
    /// Names written to the store.
    pub uploaded: Vec<String>,
    /// Names removed from the store.
    pub deleted: Vec<String>,
}

impl SyncResult {
    /// True when the run neither uploaded nor deleted anything.
    pub fn is_empty(&self) -> bool {
        self.uploaded.is_empty() && self.deleted.is_empty()
    }
}
