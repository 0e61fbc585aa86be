//! Expansion of the 16-byte Shamir secret (C1) into the 32-byte secp256k1
//! private key the signing primitives crate consumes.
//!
//! There is no published contract for this expansion (see `DESIGN.md`'s
//! Open Question decision): this pins Keccak-256 over the raw secret bytes,
//! since Keccak-256 is already the hash this workspace uses everywhere else
//! (ABI encoding, EIP-191/712 message hashing).

use rand::RngCore;
use sha3::{Digest, Keccak256};

pub(crate) fn derive_private_key(secret: &[u8; 16]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(secret);
    hasher.finalize().into()
}

pub(crate) fn random_secret() -> [u8; 16] {
    let mut secret = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_private_key_deterministic() {
        let secret = [7u8; 16];
        assert_eq!(derive_private_key(&secret), derive_private_key(&secret));
    }

    #[test]
    fn test_derive_private_key_differs_by_secret() {
        assert_ne!(derive_private_key(&[1u8; 16]), derive_private_key(&[2u8; 16]));
    }

    #[test]
    fn test_random_secret_is_randomized() {
        assert_ne!(random_secret(), random_secret());
    }
}
