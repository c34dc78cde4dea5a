//! Ingest Error Types
//!
//! Only startup can fail fatally here (binding a socket). Everything
//! per-fix is handled inline and logged, so the listeners' run loops
//! surface I/O errors from bind/accept only.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
