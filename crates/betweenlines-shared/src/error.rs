use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Timestamp parse error: {0}")]
    Timestamp(#[from] chrono::ParseError),
}
