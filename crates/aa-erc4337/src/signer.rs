//! The signing capability a [`crate::builder::UserOperationBuilder`] needs
//! from the wrapped personal account. Modeled as a trait object rather than
//! a concrete dependency on `aa_evm_signing::PrivateKeyAccount`: the smart
//! wallet's reference to its personal account is unidirectional, not a
//! cycle, so ownership flows through this interface instead of a concrete type.

use aa_evm_signing::{Address, PrivateKeyAccount, Signature};

/// Distinguishes "external" signers (an EOA or an injected provider, e.g. a
/// browser wallet or hardware device) from the "internal" in-process
/// `PrivateKeyAccount`. The two must be handed the user-operation hash
/// differently at signing time: external signers stringify the hash to hex
/// first (they pre-hash on their own side), the internal signer consumes
/// the raw bytes directly.
pub trait UserOperationSigner: Send + Sync {
    fn address(&self) -> Address;

    fn is_external(&self) -> bool;

    fn personal_sign(&self, message: &[u8]) -> aa_evm_signing::Result<Signature>;
}

impl UserOperationSigner for PrivateKeyAccount {
    fn address(&self) -> Address {
        PrivateKeyAccount::address(self)
    }

    fn is_external(&self) -> bool {
        false
    }

    fn personal_sign(&self, message: &[u8]) -> aa_evm_signing::Result<Signature> {
        PrivateKeyAccount::personal_sign(self, message)
    }
}

/// Signs a user operation hash with the wrapped personal account,
/// preserving wallet-stringification compatibility: external signers sign
/// the `0x`-prefixed hex string form of the hash, the internal signer signs
/// the raw 32 bytes (it pre-prefixes internally via `personal_sign`).
pub fn sign_user_operation_hash(
    signer: &dyn UserOperationSigner,
    hash: [u8; 32],
) -> aa_evm_signing::Result<Signature> {
    if signer.is_external() {
        let hex_str = format!("0x{}", hex::encode(hash));
        signer.personal_sign(hex_str.as_bytes())
    } else {
        signer.personal_sign(&hash)
    }
}
