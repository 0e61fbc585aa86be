//! # ew-auth-client
//!
//! Typed async client for the embedded wallet's remote auth server: OTP/SIWE
//! identity verification, share upload/download, and user wallet status.
//!
//! The HTTP transport is swappable — [`AuthServerClient`] is a trait, and
//! [`ReqwestAuthServerClient`] is the default `reqwest`/`tokio`-backed
//! implementation.

mod client;
mod error;
mod models;

pub use client::{AuthServerClient, ReqwestAuthServerClient};
pub use error::{Error, Result};
pub use models::{
    AuthAndRecoveryShares, OtpKind, SiwePayload, UserWallet, UserWalletWire, VerifyResult,
    WalletStatus,
};
