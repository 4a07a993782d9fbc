//! # betweenlines-client
//!
//! Terminal client for Between Lines: compose and send letters through the
//! HTTP API, read them back by link, and keep a 7-day history of sent
//! letters in a local database.

pub mod api;
pub mod cli;
pub mod commands;
pub mod error;

pub use api::{CreatedLetter, LetterClient};
pub use error::ClientError;
