//! EIP-712 typed-data constructions the facade signs: the `AccountMessage`
//! wrapper used by `PersonalSign`'s ERC-1271 path, and the
//! `SignerPermissionRequest` used by session-key/admin management. Both
//! sign under the same `("Account", "1", chainId, account)` domain.

use aa_erc4337::keccak256;
use aa_evm_signing::eip712::{encode_address, encode_bytes32, encode_uint256, Eip712Domain, Eip712Type};
use aa_evm_signing::Address;
use rand::RngCore;

/// Builds the `("Account", "1", chainId, account)` domain shared by both
/// typed-data constructions in this module.
pub fn account_domain(chain_id: u64, account: Address) -> Eip712Domain {
    Eip712Domain::builder()
        .name("Account")
        .version("1")
        .chain_id(chain_id)
        .verifying_contract(account)
        .build()
}

/// Wraps a prefixed personal-message hash for EIP-712 signing when the
/// smart account exposes `getMessageHash`.
pub struct AccountMessage {
    pub message: [u8; 32],
}

impl Eip712Type for AccountMessage {
    fn type_string() -> &'static str {
        "AccountMessage(bytes32 message)"
    }

    fn encode_data(&self) -> Vec<u8> {
        encode_bytes32(&self.message).to_vec()
    }
}

/// Whether a `SignerPermissionRequest` grants session-key access, promotes
/// a signer to admin, or revokes an existing grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionLevel {
    Session = 0,
    Grant = 1,
    Revoke = 2,
}

/// A request to change a signer's permissions on the smart account, signed
/// by an existing admin and submitted as a UserOperation calling
/// `setPermissionsForSigner(req, signature)` on the account itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerPermissionRequest {
    pub signer: Address,
    pub is_admin: PermissionLevel,
    pub approved_targets: Vec<Address>,
    pub native_token_limit_per_tx: u128,
    pub permission_start: u64,
    pub permission_end: u64,
    pub req_validity_start: u64,
    pub req_validity_end: u64,
    pub uid: [u8; 16],
}

impl Eip712Type for SignerPermissionRequest {
    fn type_string() -> &'static str {
        "SignerPermissionRequest(address signer,uint8 isAdmin,address[] approvedTargets,\
uint256 nativeTokenLimitPerTx,uint128 permissionStart,uint128 permissionEnd,\
uint128 reqValidityStart,uint128 reqValidityEnd,bytes32 uid)"
    }

    fn encode_data(&self) -> Vec<u8> {
        let mut targets = Vec::with_capacity(self.approved_targets.len() * 32);
        for target in &self.approved_targets {
            targets.extend_from_slice(&encode_address(target));
        }

        let mut uid_word = [0u8; 32];
        uid_word[..16].copy_from_slice(&self.uid);

        let mut buf = Vec::with_capacity(9 * 32);
        buf.extend_from_slice(&encode_address(&self.signer));
        buf.extend_from_slice(&encode_uint256(self.is_admin as u128));
        buf.extend_from_slice(&keccak256(&targets));
        buf.extend_from_slice(&encode_uint256(self.native_token_limit_per_tx));
        buf.extend_from_slice(&encode_uint256(self.permission_start as u128));
        buf.extend_from_slice(&encode_uint256(self.permission_end as u128));
        buf.extend_from_slice(&encode_uint256(self.req_validity_start as u128));
        buf.extend_from_slice(&encode_uint256(self.req_validity_end as u128));
        buf.extend_from_slice(&uid_word);
        buf
    }
}

/// A fresh random request id, required so two otherwise-identical
/// `SignerPermissionRequest`s don't collide on-chain.
pub fn random_uid() -> [u8; 16] {
    let mut uid = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut uid);
    uid
}
