//! ERC-4337 v0.6 `UserOperation`: the flat, pre-packing field layout.
//!
//! Field layout grounded on the `alloy-rs` `erc4337` rpc-types `UserOperation`
//! struct: a single `initCode`, a single `paymasterAndData`, and three
//! separate gas fields rather than the v0.7 packed words.

use crate::abi::keccak256;
use crate::error::{Error, Result};
use aa_evm_signing::Address;
use primitive_types::U256;

/// ERC-4337 v0.6 `UserOperation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOperationV6 {
    pub sender: Address,
    pub nonce: U256,
    pub init_code: Vec<u8>,
    pub call_data: Vec<u8>,
    pub call_gas_limit: U256,
    pub verification_gas_limit: U256,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub paymaster_and_data: Vec<u8>,
    pub signature: Vec<u8>,
}

impl UserOperationV6 {
    pub fn builder() -> UserOperationV6Builder {
        UserOperationV6Builder::default()
    }

    pub fn has_paymaster(&self) -> bool {
        !self.paymaster_and_data.is_empty()
    }

    pub fn paymaster_address(&self) -> Option<Address> {
        if self.paymaster_and_data.len() >= 20 {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&self.paymaster_and_data[0..20]);
            Some(Address::from_bytes(bytes))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserOperationV6Builder {
    sender: Option<Address>,
    nonce: Option<U256>,
    init_code: Vec<u8>,
    call_data: Vec<u8>,
    call_gas_limit: Option<U256>,
    verification_gas_limit: Option<U256>,
    pre_verification_gas: Option<U256>,
    max_fee_per_gas: Option<U256>,
    max_priority_fee_per_gas: Option<U256>,
    paymaster_and_data: Vec<u8>,
}

impl UserOperationV6Builder {
    pub fn sender(mut self, address: Address) -> Self {
        self.sender = Some(address);
        self
    }

    pub fn nonce(mut self, nonce: U256) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn init_code(mut self, init_code: Vec<u8>) -> Self {
        self.init_code = init_code;
        self
    }

    pub fn call_data(mut self, call_data: Vec<u8>) -> Self {
        self.call_data = call_data;
        self
    }

    pub fn call_gas_limit(mut self, gas: U256) -> Self {
        self.call_gas_limit = Some(gas);
        self
    }

    pub fn verification_gas_limit(mut self, gas: U256) -> Self {
        self.verification_gas_limit = Some(gas);
        self
    }

    pub fn pre_verification_gas(mut self, gas: U256) -> Self {
        self.pre_verification_gas = Some(gas);
        self
    }

    pub fn gas_fees(mut self, max_priority_fee_per_gas: U256, max_fee_per_gas: U256) -> Self {
        self.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
        self.max_fee_per_gas = Some(max_fee_per_gas);
        self
    }

    pub fn paymaster(mut self, address: Address, data: Vec<u8>) -> Self {
        let mut pad = Vec::with_capacity(20 + data.len());
        pad.extend_from_slice(address.as_bytes());
        pad.extend_from_slice(&data);
        self.paymaster_and_data = pad;
        self
    }

    pub fn build(self) -> Result<UserOperationV6> {
        Ok(UserOperationV6 {
            sender: self
                .sender
                .ok_or_else(|| Error::Validation("sender is required".to_string()))?,
            nonce: self
                .nonce
                .ok_or_else(|| Error::Validation("nonce is required".to_string()))?,
            init_code: self.init_code,
            call_data: self.call_data,
            call_gas_limit: self
                .call_gas_limit
                .ok_or_else(|| Error::Validation("call_gas_limit is required".to_string()))?,
            verification_gas_limit: self.verification_gas_limit.ok_or_else(|| {
                Error::Validation("verification_gas_limit is required".to_string())
            })?,
            pre_verification_gas: self.pre_verification_gas.ok_or_else(|| {
                Error::Validation("pre_verification_gas is required".to_string())
            })?,
            max_fee_per_gas: self
                .max_fee_per_gas
                .ok_or_else(|| Error::Validation("max_fee_per_gas is required".to_string()))?,
            max_priority_fee_per_gas: self.max_priority_fee_per_gas.ok_or_else(|| {
                Error::Validation("max_priority_fee_per_gas is required".to_string())
            })?,
            paymaster_and_data: self.paymaster_and_data,
            signature: Vec::new(),
        })
    }
}

fn word_u256(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

fn word_address(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// ABI-encodes the v0.6 `UserOperation` fields (excluding `signature`):
/// `abi.encode(sender, nonce, keccak256(initCode), keccak256(callData),
/// callGasLimit, verificationGasLimit, preVerificationGas, maxFeePerGas,
/// maxPriorityFeePerGas, keccak256(paymasterAndData))`.
fn pack_user_operation_v6(user_op: &UserOperationV6) -> Vec<u8> {
    let mut buf = Vec::with_capacity(10 * 32);
    buf.extend_from_slice(&word_address(user_op.sender));
    buf.extend_from_slice(&word_u256(user_op.nonce));
    buf.extend_from_slice(&keccak256(&user_op.init_code));
    buf.extend_from_slice(&keccak256(&user_op.call_data));
    buf.extend_from_slice(&word_u256(user_op.call_gas_limit));
    buf.extend_from_slice(&word_u256(user_op.verification_gas_limit));
    buf.extend_from_slice(&word_u256(user_op.pre_verification_gas));
    buf.extend_from_slice(&word_u256(user_op.max_fee_per_gas));
    buf.extend_from_slice(&word_u256(user_op.max_priority_fee_per_gas));
    buf.extend_from_slice(&keccak256(&user_op.paymaster_and_data));
    buf
}

/// Computes the ERC-4337 v0.6 user operation hash:
/// `keccak256(abi.encode(keccak256(pack(userOp)), entryPoint, chainId))`.
pub fn hash_user_operation_v6(user_op: &UserOperationV6, entry_point: Address, chain_id: u64) -> [u8; 32] {
    let packed_hash = keccak256(&pack_user_operation_v6(user_op));

    let mut outer = Vec::with_capacity(96);
    outer.extend_from_slice(&packed_hash);
    outer.extend_from_slice(&word_address(entry_point));
    outer.extend_from_slice(&{
        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&chain_id.to_be_bytes());
        word
    });

    keccak256(&outer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_sender() -> Address {
        "0x742d35Cc6634C0532925a3b844Bc454e4438f44e".parse().unwrap()
    }

    fn test_entry_point() -> Address {
        crate::config::ENTRY_POINT_V06.parse().unwrap()
    }

    fn minimal_op() -> UserOperationV6 {
        UserOperationV6::builder()
            .sender(test_sender())
            .nonce(U256::zero())
            .call_data(vec![0xde, 0xad, 0xbe, 0xef])
            .call_gas_limit(U256::from(300_000u64))
            .verification_gas_limit(U256::from(150_000u64))
            .pre_verification_gas(U256::from(50_000u64))
            .gas_fees(U256::from(1_000_000_000u64), U256::from(5_000_000_000u64))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_minimal() {
        let op = minimal_op();
        assert!(op.init_code.is_empty());
        assert!(!op.has_paymaster());
        assert!(op.signature.is_empty());
    }

    #[test]
    fn test_builder_missing_sender_errors() {
        let result = UserOperationV6::builder()
            .nonce(U256::zero())
            .call_gas_limit(U256::from(1u64))
            .verification_gas_limit(U256::from(1u64))
            .pre_verification_gas(U256::from(1u64))
            .gas_fees(U256::from(1u64), U256::from(1u64))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_paymaster_address_extraction() {
        let paymaster: Address = "0x1111111111111111111111111111111111111111".parse().unwrap();
        let op = UserOperationV6::builder()
            .sender(test_sender())
            .nonce(U256::zero())
            .call_gas_limit(U256::from(1u64))
            .verification_gas_limit(U256::from(1u64))
            .pre_verification_gas(U256::from(1u64))
            .gas_fees(U256::from(1u64), U256::from(1u64))
            .paymaster(paymaster, vec![0xaa])
            .build()
            .unwrap();
        assert_eq!(op.paymaster_address(), Some(paymaster));
    }

    #[test]
    fn test_hash_deterministic() {
        let op = minimal_op();
        assert_eq!(
            hash_user_operation_v6(&op, test_entry_point(), 56),
            hash_user_operation_v6(&op, test_entry_point(), 56)
        );
    }

    #[test]
    fn test_hash_differs_by_chain() {
        let op = minimal_op();
        assert_ne!(
            hash_user_operation_v6(&op, test_entry_point(), 56),
            hash_user_operation_v6(&op, test_entry_point(), 97)
        );
    }

    #[test]
    fn test_hash_differs_by_nonce() {
        let op1 = minimal_op();
        let mut op2 = minimal_op();
        op2.nonce = U256::from(1u64);
        assert_ne!(
            hash_user_operation_v6(&op1, test_entry_point(), 56),
            hash_user_operation_v6(&op2, test_entry_point(), 56)
        );
    }
}
