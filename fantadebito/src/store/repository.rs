//! Whole-table read/write over the object store.
//!
//! Every mutation is a full table replace: callers read the complete row set,
//! transform it in memory, and write everything back - unmodified rows
//! included. There is no append path and no partial update path, and nothing
//! is cached between operations.
//!
//! There is also no cross-operation mutual exclusion. Two concurrent
//! operations on the same table both read the pre-mutation state and the
//! later write silently discards the earlier one (last writer wins). See the
//! lost-update test below.

use crate::store::codec::{self, TableRow};
use crate::store::errors::{Result, StoreError};
use crate::store::object::ObjectStore;
use std::sync::Arc;
use tracing::instrument;

/// Generic table access, one object per logical table.
///
/// Owns its object-store client; constructed once from configuration and
/// shared behind the application state.
pub struct TableRepository {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl TableRepository {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: String) -> Self {
        Self { store, prefix }
    }

    fn object_key<T: TableRow>(&self) -> String {
        format!("{}{}.bin", self.prefix, T::TABLE_NAME)
    }

    /// Read the full row set of a table.
    ///
    /// A missing object is a recoverable "nothing yet" condition and
    /// normalizes to an empty vector; every other error propagates.
    #[instrument(skip(self), fields(table = T::TABLE_NAME), err)]
    pub async fn read_table<T: TableRow>(&self) -> Result<Vec<T>> {
        match self.store.get(&self.object_key::<T>()).await {
            Ok(bytes) => codec::decode(&bytes),
            Err(StoreError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Encode the full row set and overwrite the table object unconditionally.
    #[instrument(skip(self, rows), fields(table = T::TABLE_NAME, rows = rows.len()), err)]
    pub async fn write_table<T: TableRow>(&self, rows: &[T]) -> Result<()> {
        let bytes = codec::encode(rows)?;
        self.store.put(&self.object_key::<T>(), bytes).await
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::temp_repository;
    use crate::store::models::users::UserRow;

    #[tokio::test]
    async fn test_missing_table_reads_as_empty() {
        let (repo, _dir) = temp_repository();
        let rows: Vec<UserRow> = repo.read_table().await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (repo, _dir) = temp_repository();

        let rows = vec![UserRow::new("1".to_string(), "alice".to_string(), "pw".to_string())];
        repo.write_table(&rows).await.unwrap();

        let read: Vec<UserRow> = repo.read_table().await.unwrap();
        assert_eq!(read, rows);
    }

    #[tokio::test]
    async fn test_write_replaces_whole_table() {
        let (repo, _dir) = temp_repository();

        repo.write_table(&[
            UserRow::new("1".to_string(), "alice".to_string(), "pw".to_string()),
            UserRow::new("2".to_string(), "bob".to_string(), "pw".to_string()),
        ])
        .await
        .unwrap();

        // A shrunk row set overwrites everything previously stored
        repo.write_table(&[UserRow::new("2".to_string(), "bob".to_string(), "pw".to_string())])
            .await
            .unwrap();

        let read: Vec<UserRow> = repo.read_table().await.unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].username, "bob");
    }

    /// Demonstrates the documented lost-update hazard: two writers that both
    /// start from the same snapshot; the later write wins and the earlier
    /// mutation disappears.
    #[tokio::test]
    async fn test_concurrent_writers_last_one_wins() {
        let (repo, _dir) = temp_repository();
        repo.write_table::<UserRow>(&[]).await.unwrap();

        let snapshot_a: Vec<UserRow> = repo.read_table().await.unwrap();
        let snapshot_b: Vec<UserRow> = repo.read_table().await.unwrap();

        let mut with_alice = snapshot_a;
        with_alice.push(UserRow::new("1".to_string(), "alice".to_string(), "pw".to_string()));
        repo.write_table(&with_alice).await.unwrap();

        let mut with_bob = snapshot_b;
        with_bob.push(UserRow::new("2".to_string(), "bob".to_string(), "pw".to_string()));
        repo.write_table(&with_bob).await.unwrap();

        let read: Vec<UserRow> = repo.read_table().await.unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].username, "bob");
    }
}
