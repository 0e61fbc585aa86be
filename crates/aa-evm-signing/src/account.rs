//! Signing account backed by a raw secp256k1 private key.
//!
//! Provides transaction signing, EIP-191 (`personal_sign`/`eth_sign`)
//! message signing, and recovery helpers used across the transaction and
//! EIP-712 modules.

use crate::{Address, Error, Result, Signature};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

/// An EVM account backed by a secp256k1 signing key.
///
/// The signing key is zeroized on drop (`k256::ecdsa::SigningKey` zeroizes
/// internally).
pub struct PrivateKeyAccount {
    signing_key: SigningKey,
    address: Address,
}

impl PrivateKeyAccount {
    /// Constructs an account from a 32-byte private key.
    pub fn from_private_key(key: &[u8; 32]) -> Result<Self> {
        let signing_key =
            SigningKey::from_slice(key).map_err(|e| Error::SigningError(e.to_string()))?;
        let verifying_key = signing_key.verifying_key();
        let address = address_from_verifying_key(verifying_key)?;
        Ok(PrivateKeyAccount {
            signing_key,
            address,
        })
    }

    /// Returns the account's EVM address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Signs a 32-byte hash directly, returning a recoverable signature with
    /// a bare recovery id (0 or 1).
    pub fn sign_hash(&self, hash: &[u8; 32]) -> Result<Signature> {
        let (sig, recid): (K256Signature, RecoveryId) = self
            .signing_key
            .sign_prehash_recoverable(hash)
            .map_err(|e| Error::SigningError(e.to_string()))?;

        let r_bytes = sig.r().to_bytes();
        let s_bytes = sig.s().to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&r_bytes);
        s.copy_from_slice(&s_bytes);

        Ok(Signature::new(r, s, recid.to_byte()))
    }

    /// Signs a transaction's signing hash.
    pub fn sign_transaction_hash(&self, signing_hash: &[u8; 32]) -> Result<Signature> {
        self.sign_hash(signing_hash)
    }

    /// Signs a message using the `personal_sign`/`eth_sign` convention:
    /// Keccak-256 of `"\x19Ethereum Signed Message:\n" + len(message) + message`.
    pub fn personal_sign(&self, message: &[u8]) -> Result<Signature> {
        let hash = eth_signed_message_hash(message);
        self.sign_hash(&hash)
    }

    /// Signs the raw Keccak-256 hash of `message`, with no EIP-191 prefix —
    /// distinct from [`PrivateKeyAccount::personal_sign`], which prefixes
    /// the message before hashing.
    pub fn eth_sign(&self, message: &[u8]) -> Result<Signature> {
        let hash = keccak256(message);
        self.sign_hash(&hash)
    }
}

/// Computes the EIP-191 personal-message hash:
/// `keccak256("\x19Ethereum Signed Message:\n" + len(message) + message)`.
pub fn eth_signed_message_hash(message: &[u8]) -> [u8; 32] {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
    let mut hasher = Keccak256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Plain Keccak-256, no prefix — the hash `eth_sign` signs.
pub fn keccak256(message: &[u8]) -> [u8; 32] {
    Keccak256::digest(message).into()
}

fn address_from_verifying_key(verifying_key: &VerifyingKey) -> Result<Address> {
    let encoded = verifying_key.to_encoded_point(false);
    let bytes = encoded.as_bytes();
    // Uncompressed SEC1 point is 0x04 || X (32) || Y (32); strip the prefix byte.
    Address::from_public_key_bytes(&bytes[1..])
}

/// Recovers the signer address from a 32-byte hash and its signature.
pub fn recover_signer(hash: &[u8; 32], signature: &Signature) -> Result<Address> {
    let recid = RecoveryId::from_byte(signature.v)
        .ok_or_else(|| Error::RecoveryError(format!("invalid recovery id: {}", signature.v)))?;

    let r: &k256::FieldBytes = (&signature.r).into();
    let s: &k256::FieldBytes = (&signature.s).into();
    let sig = K256Signature::from_scalars(*r, *s)
        .map_err(|e| Error::RecoveryError(e.to_string()))?;

    let verifying_key = VerifyingKey::recover_from_prehash(hash, &sig, recid)
        .map_err(|e| Error::RecoveryError(e.to_string()))?;

    address_from_verifying_key(&verifying_key)
}

/// Recovers the signer address from a message and its `personal_sign` signature.
pub fn recover_address_from_personal_sign(
    message: &[u8],
    signature: &Signature,
) -> Result<Address> {
    let hash = eth_signed_message_hash(message);
    recover_signer(&hash, signature)
}
