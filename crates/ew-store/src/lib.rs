//! # ew-store
//!
//! Local persistence for the embedded wallet's session envelope: the auth
//! token, device share, and identity metadata that survive across process
//! restarts. This crate specifies only the envelope schema and lifecycle —
//! the underlying storage medium is a pluggable [`EnvelopeStore`].

mod envelope;
mod error;
mod file_store;
mod store;

pub use envelope::Envelope;
pub use error::{Error, Result};
pub use file_store::FileEnvelopeStore;
pub use store::EnvelopeStore;
