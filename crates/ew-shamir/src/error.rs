//! Error types for Shamir share splitting, combination, and encryption.

use thiserror::Error;

/// Errors produced by secret splitting, combination, and share encryption.
#[derive(Debug, Error)]
pub enum Error {
    /// Two shares with the same x-coordinate (id) were passed to `Combine`/`NewShare`.
    #[error("share indices collide: both shares have id {0}")]
    IndicesCollide(u8),

    /// A share's textual encoding could not be parsed.
    #[error("share is corrupt: {0}")]
    ShareCorrupt(String),

    /// A requested share id is outside `{1, 2, 3}`.
    #[error("invalid share id: {0}")]
    InvalidShareId(u8),

    /// AES-GCM authentication tag did not verify; the recovery code is wrong
    /// or the ciphertext was tampered with.
    #[error("wrong recovery code")]
    WrongRecoveryCode,

    /// The encrypted-share envelope is malformed (wrong length, bad base64).
    #[error("malformed encrypted share envelope: {0}")]
    MalformedEnvelope(String),
}

/// This crate's `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;
