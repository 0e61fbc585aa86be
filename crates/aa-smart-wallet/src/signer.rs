//! The capability set a smart wallet needs from its wrapped personal
//! account: everything [`aa_erc4337::UserOperationSigner`] already gives the
//! builder, plus raw EIP-712 hash signing for the facade's own typed-data
//! constructions (`AccountMessage`, `SignerPermissionRequest`). Modeled as a
//! trait object per the "no cycle" design note: the smart wallet owns a
//! polymorphic reference to the personal account's capabilities, ownership
//! is unidirectional.

use aa_erc4337::UserOperationSigner;
use aa_evm_signing::{PrivateKeyAccount, Signature};

pub trait PersonalAccount: UserOperationSigner {
    /// Signs a precomputed EIP-712 digest directly (no personal-message
    /// prefix), used to sign the `AccountMessage`/`SignerPermissionRequest`
    /// wrappers the facade builds.
    fn sign_typed_data_hash(&self, hash: [u8; 32]) -> aa_evm_signing::Result<Signature>;
}

impl PersonalAccount for PrivateKeyAccount {
    fn sign_typed_data_hash(&self, hash: [u8; 32]) -> aa_evm_signing::Result<Signature> {
        self.sign_hash(&hash)
    }
}
