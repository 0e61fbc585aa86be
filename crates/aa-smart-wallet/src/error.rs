//! Error types for the smart wallet facade.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Builder(#[from] aa_erc4337::Error),

    #[error(transparent)]
    Signing(#[from] aa_evm_signing::Error),

    #[error("chain rpc error: {0}")]
    Chain(String),

    #[error("operation not supported on zk-sync")]
    NotSupportedOnZkSync,

    #[error("erc-1271 signature verification failed")]
    InvalidSignature,
}

pub type Result<T> = std::result::Result<T, Error>;
