//! Bulk reset of all user data.

use tracing::info;

use super::schema::TABLES_CHILDREN_FIRST;
use super::{Database, Result};
use crate::photos::PhotoStore;

/// What a reset removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetSummary {
    pub rows_deleted: usize,
    pub photos_removed: usize,
}

impl Database {
    /// Delete every row from every table, children before parents, then the
    /// whole photo tree. An absent photo root is fine.
    pub fn reset_all_data(&self, photos: &PhotoStore) -> Result<ResetSummary> {
        let tx = self.conn.unchecked_transaction()?;
        let mut rows_deleted = 0;
        for table in TABLES_CHILDREN_FIRST {
            rows_deleted += tx.execute(&format!("DELETE FROM {}", table), [])?;
        }
        tx.commit()?;

        let photos_removed = photos.remove_all()?;

        info!(rows_deleted, photos_removed, "All data reset");
        Ok(ResetSummary {
            rows_deleted,
            photos_removed,
        })
    }
}
