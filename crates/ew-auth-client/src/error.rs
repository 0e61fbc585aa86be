//! Error types for the auth server client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("incorrect or expired one-time code")]
    BadOtp,

    #[error("identity challenge expired")]
    Expired,

    #[error("too many attempts, try again later")]
    Throttled,

    #[error("auth token missing or rejected")]
    Unauthorized,

    #[error("resource not found")]
    NotFound,

    #[error("already enrolled")]
    Conflict,

    #[error("unexpected server response: {0}")]
    ServerProtocol(String),

    #[error("http transport error: {0}")]
    Transport(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
