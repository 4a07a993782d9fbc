//! # betweenlines-store
//!
//! Persistence for Between Lines letters.
//!
//! - [`document`]: the [`LetterStore`] contract with a durable SQLite backend
//!   and an in-memory local-only fallback.
//! - [`blobs`]: the [`BlobUploader`] contract for audio attachments, backed by
//!   the filesystem or by memory.
//! - [`service`]: [`LetterService`], which composes the two behind a single
//!   create/get contract.
//! - [`history`]: the client-local [`HistoryLedger`] of letters this device
//!   created, persisted through [`LocalStorage`].
//!
//! The SQLite [`Database`] wraps a `rusqlite::Connection` and runs schema
//! migrations on open.

pub mod blobs;
pub mod database;
pub mod document;
pub mod history;
pub mod letters;
pub mod local_storage;
pub mod migrations;
pub mod service;

mod error;

pub use blobs::{BlobUploader, FsBlobStore, MemoryBlobStore};
pub use database::Database;
pub use document::{LetterStore, MemoryLetterStore, SqliteLetterStore};
pub use error::{Result, StoreError};
pub use history::{Clock, HistoryLedger, ManualClock, SystemClock};
pub use local_storage::{LocalStorage, MemoryStorage};
pub use service::LetterService;
