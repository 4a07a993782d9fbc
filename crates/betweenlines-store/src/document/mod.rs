//! Document stores: where letters live.
//!
//! [`LetterStore`] is the single contract the letter service is written
//! against. Two backends implement it and one of them is picked when the
//! process is configured:
//!
//! - [`SqliteLetterStore`]: durable, one row per letter in SQLite.
//! - [`MemoryLetterStore`]: local-only fallback, gone with the process.

mod memory;
mod sqlite;

use async_trait::async_trait;
use betweenlines_shared::{Letter, NewLetter};

use crate::error::Result;

pub use memory::MemoryLetterStore;
pub use sqlite::SqliteLetterStore;

#[async_trait]
pub trait LetterStore: Send + Sync {
    /// Persist a new letter and return its freshly assigned identifier.
    /// The store sets `createdAt` and starts `opened` at `false`.
    async fn create(&self, letter: NewLetter) -> Result<String>;

    /// Look a letter up. An unknown identifier is `Ok(None)`, not an error.
    async fn fetch(&self, id: &str) -> Result<Option<Letter>>;

    /// Flip `opened` to `true`. Returns `false` when no such letter exists.
    async fn mark_opened(&self, id: &str) -> Result<bool>;
}
