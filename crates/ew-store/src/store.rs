//! The `EnvelopeStore` trait: a scoped acquisition of a persistent handle
//! with guaranteed flush/release semantics.
//!
//! Embedders can swap in their own key-value layer — the persistence
//! backend is an out-of-scope external collaborator; the schema and
//! lifecycle in this trait are the in-scope contract.

use crate::envelope::Envelope;
use crate::error::Result;

/// Semantic operations over the local session envelope.
pub trait EnvelopeStore {
    /// Reads the current envelope, if one is persisted.
    fn load(&self) -> Result<Option<Envelope>>;

    /// Writes `envelope`, replacing whatever was previously stored.
    ///
    /// MUST be atomic at the envelope level: a crash mid-write leaves
    /// either the old or the new envelope observable, never a partial one.
    fn save(&self, envelope: &Envelope) -> Result<()>;

    /// Removes only the auth token from a persisted envelope, leaving the
    /// device share in place (it is useless without a token).
    fn remove_auth_token(&self) -> Result<()>;

    /// Deletes the envelope entirely.
    fn clear(&self) -> Result<()>;
}
