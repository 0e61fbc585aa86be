//! Error types for the UserOperation builder.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Signing(#[from] aa_evm_signing::Error),

    #[error("bundler rpc error: {0}")]
    Bundler(String),

    #[error("http transport error: {0}")]
    Transport(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("smart account not deployed")]
    NotDeployed,

    #[error("smart account deployment failed: {0}")]
    DeploymentFailed(String),

    #[error("malformed user operation: {0}")]
    MalformedUserOperation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
