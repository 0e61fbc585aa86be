//! A small typed ABI codec, used in place of a general reflection layer.
//!
//! Covers exactly the calldata shapes this crate needs: smart-account
//! `execute(address,uint256,bytes)`, ERC-20 `approve(address,uint256)`, and
//! the storage-slot derivation for a paymaster balance-slot state override.

use aa_evm_signing::Address;
use primitive_types::U256;
use sha3::{Digest, Keccak256};

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// First 4 bytes of `keccak256(signature)`, e.g. `"execute(address,uint256,bytes)"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn word_address(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn word_u256(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// ABI-encodes a dynamic `bytes` argument as a standalone tail (32-byte
/// length word followed by the data, right-padded to a 32-byte boundary).
fn encode_bytes_tail(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(32 + data.len().div_ceil(32) * 32);
    out.extend_from_slice(&word_u256(U256::from(data.len())));
    out.extend_from_slice(data);
    let padding = (32 - (data.len() % 32)) % 32;
    out.extend(std::iter::repeat(0u8).take(padding));
    out
}

/// Encodes `execute(address target, uint256 value, bytes data)` calldata for
/// a smart account forwarding a single call.
pub fn encode_execute(target: Address, value: U256, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&selector("execute(address,uint256,bytes)"));
    out.extend_from_slice(&word_address(target));
    out.extend_from_slice(&word_u256(value));
    out.extend_from_slice(&word_u256(U256::from(96))); // offset to the `bytes` tail
    out.extend_from_slice(&encode_bytes_tail(data));
    out
}

/// Encodes `approve(address spender, uint256 amount)` ERC-20 calldata.
pub fn encode_erc20_approve(spender: Address, amount: U256) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&selector("approve(address,uint256)"));
    out.extend_from_slice(&word_address(spender));
    out.extend_from_slice(&word_u256(amount));
    out
}

/// Encodes `createAccount(address owner, uint256 salt)` factory calldata.
pub fn encode_create_account(owner: Address, salt: U256) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&selector("createAccount(address,uint256)"));
    out.extend_from_slice(&word_address(owner));
    out.extend_from_slice(&word_u256(salt));
    out
}

/// Derives the storage slot of `balances[account]` for a Solidity mapping
/// declared at `storage_slot_index`: `keccak256(abi.encode(account, slot))`.
pub fn balance_storage_slot(account: Address, storage_slot_index: U256) -> [u8; 32] {
    let mut preimage = Vec::with_capacity(64);
    preimage.extend_from_slice(&word_address(account));
    preimage.extend_from_slice(&word_u256(storage_slot_index));
    keccak256(&preimage)
}
