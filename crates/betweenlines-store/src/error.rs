use betweenlines_shared::SharedError;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Required input missing (e.g. an empty letter body).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Writing an audio blob failed.
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Blob too large: {size} bytes (max {max})")]
    BlobTooLarge { size: usize, max: usize },

    /// The backend could not be reached or refused to work.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A stored record could not be decoded.
    #[error("Corrupt record: {0}")]
    Corrupt(#[from] SharedError),
}

impl StoreError {
    /// `true` for failures of the backend itself, as opposed to bad input or
    /// a failed upload. Callers may offer a retry for these.
    pub fn is_unavailable(&self) -> bool {
        !matches!(
            self,
            StoreError::Validation(_) | StoreError::Upload(_) | StoreError::BlobTooLarge { .. }
        )
    }

    pub fn is_upload_failure(&self) -> bool {
        matches!(self, StoreError::Upload(_) | StoreError::BlobTooLarge { .. })
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(!StoreError::Validation("body".into()).is_unavailable());
        assert!(StoreError::Upload("disk full".into()).is_upload_failure());
        assert!(StoreError::BlobTooLarge { size: 2, max: 1 }.is_upload_failure());
        assert!(StoreError::Unavailable("down".into()).is_unavailable());
        assert!(StoreError::Sqlite(rusqlite::Error::InvalidQuery).is_unavailable());
        assert!(!StoreError::Sqlite(rusqlite::Error::InvalidQuery).is_upload_failure());
    }
}
