//! Wires the configured backend into a [`LetterService`].

use std::sync::Arc;

use betweenlines_store::{
    BlobUploader, FsBlobStore, LetterService, LetterStore, MemoryBlobStore, MemoryLetterStore,
    SqliteLetterStore, StoreError,
};
use tracing::{info, warn};

use crate::config::{ServerConfig, StoreBackend};

pub async fn letter_service(config: &ServerConfig) -> Result<LetterService, StoreError> {
    let (store, uploader): (Arc<dyn LetterStore>, Arc<dyn BlobUploader>) = match config.backend
    {
        StoreBackend::Durable => {
            let store = SqliteLetterStore::open(&config.database_path)?;
            let uploader = FsBlobStore::new(
                config.blob_storage_path.clone(),
                config.public_origin.clone(),
                config.max_audio_size,
            )
            .await?;

            info!(
                database = %config.database_path.display(),
                blobs = %config.blob_storage_path.display(),
                "Using durable letter store"
            );
            (Arc::new(store), Arc::new(uploader))
        }
        StoreBackend::Local => {
            warn!("Using local-only letter store, letters are lost on restart");
            (
                Arc::new(MemoryLetterStore::new()),
                Arc::new(MemoryBlobStore::new(
                    config.public_origin.clone(),
                    config.max_audio_size,
                )),
            )
        }
    };

    Ok(LetterService::new(
        store,
        uploader,
        config.public_origin.clone(),
    ))
}
