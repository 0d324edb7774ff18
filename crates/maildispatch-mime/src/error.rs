//! Error types for MIME operations.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid MIME header.
    #[error("Invalid MIME header: {0}")]
    InvalidHeader(String),

    /// Invalid mailbox address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Missing required header.
    #[error("Missing required header: {0}")]
    MissingHeader(String),
}
