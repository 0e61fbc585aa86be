//! # ew-shamir
//!
//! 2-of-3 Shamir secret sharing over a 128-bit prime field, plus AES-256-GCM
//! wrap/unwrap of a share under a user-held recovery code.
//!
//! This crate has no knowledge of the embedded wallet's auth flow or local
//! storage — it is a pure cryptographic primitive consumed by `ew-core`.

mod crypto;
mod error;
mod field;
mod share;

pub use crypto::{decrypt_share, encrypt_share};
pub use error::{Error, Result};
pub use field::P;
pub use share::{combine, new_share, secret_to_bytes, secret_to_field, split, Share, ShareId};
