//! # betweenlines-shared
//!
//! Types and constants shared by the store, the HTTP server and the CLI
//! client: the letter data model, history ledger entries, identifier
//! generation and the shareable link format.

pub mod constants;
pub mod error;
pub mod ids;
pub mod link;
pub mod types;

pub use error::SharedError;
pub use link::shareable_url;
pub use types::*;
