use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use betweenlines_shared::{ids, Letter, NewLetter};
use chrono::Utc;
use tracing::debug;

use super::LetterStore;
use crate::database::Database;
use crate::error::{Result, StoreError};

/// Durable backend: letters are rows in the `letters` table.
///
/// The connection sits behind a mutex and every call runs on the blocking
/// pool so the async runtime never waits on disk I/O.
#[derive(Clone)]
pub struct SqliteLetterStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteLetterStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Database::open_at(path)?))
    }

    async fn with_db<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("Lock poisoned: {e}")))?;
            op(&guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("Database task failed: {e}")))?
    }
}

#[async_trait]
impl LetterStore for SqliteLetterStore {
    async fn create(&self, letter: NewLetter) -> Result<String> {
        let id = ids::durable_id();
        let created_at = Utc::now();

        let row_id = id.clone();
        self.with_db(move |db| db.insert_letter(&row_id, &letter, created_at))
            .await?;

        debug!(id = %id, "Stored letter");
        Ok(id)
    }

    async fn fetch(&self, id: &str) -> Result<Option<Letter>> {
        let id = id.to_string();
        self.with_db(move |db| db.get_letter(&id)).await
    }

    async fn mark_opened(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.with_db(move |db| db.mark_letter_opened(&id)).await
    }
}

#[cfg(test)]
mod tests {
    use betweenlines_shared::LetterDraft;

    use super::*;

    #[tokio::test]
    async fn test_letters_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letters.db");

        let id = {
            let store = SqliteLetterStore::open(&path).unwrap();
            store
                .create(LetterDraft::new("kept").into_new_letter(None))
                .await
                .unwrap()
        };

        let store = SqliteLetterStore::open(&path).unwrap();
        let letter = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(letter.body, "kept");
    }
}
