//! ECDSA signature representation shared by all transaction and message signing paths.

use std::fmt;
use zeroize::Zeroize;

/// A recoverable secp256k1 ECDSA signature.
///
/// Stores `r`, `s` and a bare recovery id (0 or 1). Different wire formats
/// encode the recovery id differently:
///
/// - EIP-1559 (type-2) transactions append the bare recovery id.
/// - Legacy/EIP-155 transactions encode `v = chain_id * 2 + 35 + recid`.
/// - `personal_sign`/`eth_sign` and most JSON-RPC consumers expect `v = recid + 27`.
///
/// `Signature` always stores the bare recovery id; callers normalize to the
/// wire convention they need at serialization time (see [`Signature::to_eth_sig_bytes`]).
#[derive(Clone, Copy, PartialEq, Eq, Zeroize)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

impl Signature {
    /// Creates a new signature from its components.
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Signature { r, s, v }
    }

    /// Parses a signature from 65 bytes: `r (32) || s (32) || v (1)`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 65 {
            return None;
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);
        Some(Signature { r, s, v: bytes[64] })
    }

    /// Serializes to 65 bytes: `r (32) || s (32) || v (1)` with the bare recovery id.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// Serializes to 65 bytes using the `v + 27` convention expected by
    /// `personal_sign`/`eth_sign` and most JSON-RPC tooling.
    pub fn to_eth_sig_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v + 27;
        out
    }

    pub fn r_as_bytes(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s_as_bytes(&self) -> &[u8; 32] {
        &self.s
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("r", &hex::encode(self.r))
            .field("s", &hex::encode(self.s))
            .field("v", &self.v)
            .finish()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{}{}{:02x}",
            hex::encode(self.r),
            hex::encode(self.s),
            self.v
        )
    }
}
