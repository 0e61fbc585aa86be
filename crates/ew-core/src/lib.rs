//! # ew-core
//!
//! The embedded wallet's enrollment/recovery/re-login state machine. Drives
//! [`ew_shamir`] share splitting/combination, [`ew_auth_client`] server
//! calls, and [`ew_store`] persistence to assemble a signing account from
//! two of the user's three Shamir shares.
//!
//! This crate owns no identity-challenge logic itself (OTP/OAuth/SIWE) —
//! callers complete that against [`ew_auth_client::AuthServerClient`]
//! directly and hand the resulting [`VerifyResult`] to
//! [`EmbeddedWalletCore::complete_identity`].

mod core;
mod error;
mod models;
mod secret;

pub use crate::core::EmbeddedWalletCore;
pub use error::{Error, Result};
pub use ew_auth_client::VerifyResult;
pub use models::User;
