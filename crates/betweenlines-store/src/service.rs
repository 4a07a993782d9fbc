//! The letter service: one create/get contract over whichever document store
//! and blob uploader the process was configured with.

use std::sync::Arc;

use betweenlines_shared::{shareable_url, AudioAttachment, Letter, LetterDraft};
use tracing::{info, warn};

use crate::blobs::BlobUploader;
use crate::document::LetterStore;
use crate::error::{Result, StoreError};

#[derive(Clone)]
pub struct LetterService {
    store: Arc<dyn LetterStore>,
    uploader: Arc<dyn BlobUploader>,
    origin: String,
}

impl LetterService {
    /// `origin` is the deployment's own origin, used for shareable links.
    pub fn new(
        store: Arc<dyn LetterStore>,
        uploader: Arc<dyn BlobUploader>,
        origin: impl Into<String>,
    ) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        Self {
            store,
            uploader,
            origin,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Create a letter, uploading the audio attachment first if there is one.
    ///
    /// A failed upload aborts before anything is written to the document
    /// store, so no letter ever points at missing audio.
    pub async fn create(
        &self,
        draft: LetterDraft,
        audio: Option<AudioAttachment>,
    ) -> Result<String> {
        if !draft.has_body() {
            return Err(StoreError::Validation("Letter body is required".to_string()));
        }

        let audio_url = match audio {
            Some(audio) => {
                let url = self
                    .uploader
                    .upload(&audio.content, &audio.file_name)
                    .await
                    .map_err(|e| {
                        warn!(error = %e, file = %audio.file_name, "Audio upload failed");
                        e
                    })?;
                Some(url)
            }
            None => None,
        };

        let has_audio = audio_url.is_some();
        let id = self.store.create(draft.into_new_letter(audio_url)).await?;

        info!(id = %id, has_audio, "Letter created");
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Letter>> {
        self.store.fetch(id).await
    }

    pub async fn mark_opened(&self, id: &str) -> Result<bool> {
        self.store.mark_opened(id).await
    }

    pub fn shareable_url(&self, id: &str) -> String {
        shareable_url(&self.origin, id)
    }

    /// Read back an uploaded audio blob by key.
    pub async fn audio(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.uploader.fetch(key).await
    }
}
