//! Error taxonomy for the embedded wallet core state machine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Server-reported email/phone/auth-provider disagrees with the
    /// caller's claim. Local state is not mutated.
    #[error("identity mismatch between caller and server")]
    IdentityMismatch,

    /// No token is present, or the server rejected it.
    #[error("not signed in")]
    NotSignedIn,

    /// The server and local state disagree on whether the wallet is
    /// initialized (server says initialized but the device share is
    /// missing, or vice versa).
    #[error("wallet initialization state is inconsistent")]
    WalletUninitialized,

    /// An unexpected server response shape that isn't one of the specific
    /// error kinds above.
    #[error("unexpected server protocol: {0}")]
    ServerProtocol(String),

    #[error(transparent)]
    Shamir(#[from] ew_shamir::Error),

    #[error(transparent)]
    Auth(#[from] ew_auth_client::Error),

    #[error(transparent)]
    Storage(#[from] ew_store::Error),

    #[error(transparent)]
    Signing(#[from] aa_evm_signing::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
