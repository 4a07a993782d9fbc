use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use betweenlines_shared::{ids, Letter, LetterDocument, NewLetter};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::LetterStore;
use crate::error::Result;

/// Local-only fallback: documents kept in process memory.
///
/// Records are held in their stored form (timestamp as an RFC 3339 string)
/// and decoded on every fetch, exactly like the durable backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryLetterStore {
    documents: Arc<RwLock<HashMap<String, LetterDocument>>>,
}

impl MemoryLetterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl LetterStore for MemoryLetterStore {
    async fn create(&self, letter: NewLetter) -> Result<String> {
        let now = Utc::now();
        let mut documents = self.documents.write().await;

        let mut id = ids::local_id(now.timestamp_millis());
        while documents.contains_key(&id) {
            id = ids::local_id(now.timestamp_millis());
        }

        documents.insert(id.clone(), LetterDocument::new(letter, now));

        debug!(id = %id, "Stored letter in memory");
        Ok(id)
    }

    async fn fetch(&self, id: &str) -> Result<Option<Letter>> {
        let documents = self.documents.read().await;
        let letter = documents
            .get(id)
            .map(|doc| doc.to_letter(id))
            .transpose()?;
        Ok(letter)
    }

    async fn mark_opened(&self, id: &str) -> Result<bool> {
        let mut documents = self.documents.write().await;
        match documents.get_mut(id) {
            Some(doc) => {
                doc.opened = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use betweenlines_shared::LetterDraft;

    use super::*;

    #[tokio::test]
    async fn test_len_tracks_creates() {
        let store = MemoryLetterStore::new();
        assert!(store.is_empty().await);

        store
            .create(LetterDraft::new("one").into_new_letter(None))
            .await
            .unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_local_id_starts_with_timestamp() {
        let store = MemoryLetterStore::new();
        let id = store
            .create(LetterDraft::new("one").into_new_letter(None))
            .await
            .unwrap();
        assert_eq!(id.len(), 8 + ids::LOCAL_SUFFIX_LEN);
    }
}
