//! The account-contract view calls the facade needs beyond what
//! [`aa_erc4337::AccountChainClient`] already covers (code presence,
//! EntryPoint nonce). Swappable for the same reason: the RPC transport is
//! an out-of-scope external collaborator, the request/response shapes are
//! the in-scope, fully-typed contract.

use crate::error::Result;
use aa_evm_signing::Address;
use async_trait::async_trait;

/// The ERC-1271 magic value a compliant `isValidSignature` implementation
/// returns on success.
pub const ERC1271_MAGIC_VALUE: [u8; 4] = [0x16, 0x26, 0xba, 0x7e];

#[async_trait]
pub trait SmartAccountClient: Send + Sync {
    /// Probes `account.getMessageHash(hash)`. Returns `Err` if the account
    /// reverts or the method doesn't exist — the facade treats that as "no
    /// wrapper support" and falls back to a plain personal signature.
    async fn get_message_hash(&self, account: Address, hash: [u8; 32]) -> Result<[u8; 32]>;

    /// `account.isValidSignature(hash, signature)`, expected to return
    /// [`ERC1271_MAGIC_VALUE`] on success.
    async fn is_valid_signature(&self, account: Address, hash: [u8; 32], signature: &[u8]) -> Result<[u8; 4]>;

    /// All signers currently holding admin or session-key permissions.
    async fn get_all_active_signers(&self, account: Address) -> Result<Vec<Address>>;

    /// The account's next native transaction nonce, for the ZK-Sync native
    /// transaction path (distinct from the EntryPoint's per-key nonce).
    async fn get_zksync_nonce(&self, account: Address) -> Result<u64>;
}
