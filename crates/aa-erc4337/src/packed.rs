//! ERC-4337 v0.7 `PackedUserOperation`: construction, packing, and hashing.
//!
//! v0.7 packs two gas values into each `bytes32` field to reduce calldata
//! cost:
//! - `accountGasLimits`: `verificationGasLimit (u128) ‖ callGasLimit (u128)`
//! - `gasFees`: `maxPriorityFeePerGas (u128) ‖ maxFeePerGas (u128)`
//!
//! ```text
//! userOpHash = keccak256(keccak256(pack(userOp)) ‖ entryPoint (32B) ‖ chainId (32B))
//! pack(userOp) = abi.encode(sender, nonce, keccak256(initCode), keccak256(callData),
//!                           accountGasLimits, preVerificationGas, gasFees,
//!                           keccak256(paymasterAndData))
//! ```
//!
//! This is also the *packed/hash* form. The *wire* form used for JSON-RPC
//! submission splits `factory`/`factoryData` and the paymaster fields back
//! out — see [`UnpackedUserOperationV7`] and its [`UnpackedUserOperationV7::pack`]/
//! [`unpack`] conversions.

use crate::abi::keccak256;
use crate::error::{Error, Result};
use aa_evm_signing::Address;
use primitive_types::U256;

/// ERC-4337 v0.7 `PackedUserOperation` — the packed form used for hashing
/// and bundler submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedUserOperation {
    pub sender: Address,
    pub nonce: U256,
    /// `factory ‖ factoryData`; empty if the account already exists.
    pub init_code: Vec<u8>,
    pub call_data: Vec<u8>,
    /// Packed `verificationGasLimit ‖ callGasLimit` as 32 bytes.
    pub account_gas_limits: [u8; 32],
    pub pre_verification_gas: U256,
    /// Packed `maxPriorityFeePerGas ‖ maxFeePerGas` as 32 bytes.
    pub gas_fees: [u8; 32],
    /// `paymaster(20) ‖ paymasterVerificationGasLimit(16) ‖ paymasterPostOpGasLimit(16) ‖ paymasterData`.
    pub paymaster_and_data: Vec<u8>,
    pub signature: Vec<u8>,
}

impl PackedUserOperation {
    pub fn builder() -> PackedUserOperationBuilder {
        PackedUserOperationBuilder::default()
    }

    pub fn pack_gas_limits(verification_gas_limit: u128, call_gas_limit: u128) -> [u8; 32] {
        let mut packed = [0u8; 32];
        packed[0..16].copy_from_slice(&verification_gas_limit.to_be_bytes());
        packed[16..32].copy_from_slice(&call_gas_limit.to_be_bytes());
        packed
    }

    pub fn pack_gas_fees(max_priority_fee_per_gas: u128, max_fee_per_gas: u128) -> [u8; 32] {
        let mut packed = [0u8; 32];
        packed[0..16].copy_from_slice(&max_priority_fee_per_gas.to_be_bytes());
        packed[16..32].copy_from_slice(&max_fee_per_gas.to_be_bytes());
        packed
    }

    pub fn verification_gas_limit(&self) -> u128 {
        u128::from_be_bytes(self.account_gas_limits[0..16].try_into().unwrap())
    }

    pub fn call_gas_limit(&self) -> u128 {
        u128::from_be_bytes(self.account_gas_limits[16..32].try_into().unwrap())
    }

    pub fn max_priority_fee_per_gas(&self) -> u128 {
        u128::from_be_bytes(self.gas_fees[0..16].try_into().unwrap())
    }

    pub fn max_fee_per_gas(&self) -> u128 {
        u128::from_be_bytes(self.gas_fees[16..32].try_into().unwrap())
    }

    pub fn has_paymaster(&self) -> bool {
        self.paymaster_and_data.len() >= 20
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

    pub fn paymaster_data(&self) -> &[u8] {
        if self.paymaster_and_data.len() > 52 {
            &self.paymaster_and_data[52..]
        } else {
            &[]
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PackedUserOperationBuilder {
    sender: Option<Address>,
    nonce: Option<U256>,
    init_code: Vec<u8>,
    call_data: Vec<u8>,
    account_gas_limits: Option<[u8; 32]>,
    pre_verification_gas: Option<U256>,
    gas_fees: Option<[u8; 32]>,
    paymaster_and_data: Vec<u8>,
}

impl PackedUserOperationBuilder {
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

    pub fn account_gas_limits(mut self, verification_gas_limit: u128, call_gas_limit: u128) -> Self {
        self.account_gas_limits =
            Some(PackedUserOperation::pack_gas_limits(verification_gas_limit, call_gas_limit));
        self
    }

    pub fn account_gas_limits_packed(mut self, packed: [u8; 32]) -> Self {
        self.account_gas_limits = Some(packed);
        self
    }

    pub fn pre_verification_gas(mut self, gas: U256) -> Self {
        self.pre_verification_gas = Some(gas);
        self
    }

    pub fn gas_fees(mut self, max_priority_fee_per_gas: u128, max_fee_per_gas: u128) -> Self {
        self.gas_fees = Some(PackedUserOperation::pack_gas_fees(
            max_priority_fee_per_gas,
            max_fee_per_gas,
        ));
        self
    }

    pub fn gas_fees_packed(mut self, packed: [u8; 32]) -> Self {
        self.gas_fees = Some(packed);
        self
    }

    pub fn paymaster(mut self, address: Address, verification_gas_limit: u128, post_op_gas_limit: u128, data: Vec<u8>) -> Self {
        let mut pad = Vec::with_capacity(52 + data.len());
        pad.extend_from_slice(address.as_bytes());
        pad.extend_from_slice(&verification_gas_limit.to_be_bytes());
        pad.extend_from_slice(&post_op_gas_limit.to_be_bytes());
        pad.extend_from_slice(&data);
        self.paymaster_and_data = pad;
        self
    }

    pub fn paymaster_and_data_raw(mut self, data: Vec<u8>) -> Self {
        self.paymaster_and_data = data;
        self
    }

    pub fn build(self) -> Result<PackedUserOperation> {
        Ok(PackedUserOperation {
            sender: self.sender.ok_or_else(|| Error::Validation("sender is required".to_string()))?,
            nonce: self.nonce.ok_or_else(|| Error::Validation("nonce is required".to_string()))?,
            init_code: self.init_code,
            call_data: self.call_data,
            account_gas_limits: self
                .account_gas_limits
                .ok_or_else(|| Error::Validation("account_gas_limits is required".to_string()))?,
            pre_verification_gas: self
                .pre_verification_gas
                .ok_or_else(|| Error::Validation("pre_verification_gas is required".to_string()))?,
            gas_fees: self.gas_fees.ok_or_else(|| Error::Validation("gas_fees is required".to_string()))?,
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

/// ABI-encodes the `PackedUserOperation` fields (excluding `signature`) for hashing.
fn pack_user_operation(user_op: &PackedUserOperation) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 * 32);
    buf.extend_from_slice(&word_address(user_op.sender));
    buf.extend_from_slice(&word_u256(user_op.nonce));
    buf.extend_from_slice(&keccak256(&user_op.init_code));
    buf.extend_from_slice(&keccak256(&user_op.call_data));
    buf.extend_from_slice(&user_op.account_gas_limits);
    buf.extend_from_slice(&word_u256(user_op.pre_verification_gas));
    buf.extend_from_slice(&user_op.gas_fees);
    buf.extend_from_slice(&keccak256(&user_op.paymaster_and_data));
    buf
}

/// Computes the ERC-4337 v0.7 user operation hash.
pub fn hash_user_operation(user_op: &PackedUserOperation, entry_point: Address, chain_id: u64) -> [u8; 32] {
    let packed_hash = keccak256(&pack_user_operation(user_op));

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

/// The wire/unpacked form of a v0.7 `UserOperation`, as submitted over
/// JSON-RPC: `factory`/`factoryData` and the paymaster fields are separate
/// rather than packed into `initCode`/`paymasterAndData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedUserOperationV7 {
    pub sender: Address,
    pub nonce: U256,
    pub factory: Option<Address>,
    pub factory_data: Vec<u8>,
    pub call_data: Vec<u8>,
    pub call_gas_limit: u128,
    pub verification_gas_limit: u128,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub paymaster: Option<Address>,
    pub paymaster_verification_gas_limit: u128,
    pub paymaster_post_op_gas_limit: u128,
    pub paymaster_data: Vec<u8>,
    pub signature: Vec<u8>,
}

impl UnpackedUserOperationV7 {
    /// Packs this wire-form operation into the hashed/submitted
    /// [`PackedUserOperation`] form.
    pub fn pack(&self) -> PackedUserOperation {
        let init_code = match &self.factory {
            Some(factory) => {
                let mut v = factory.as_bytes().to_vec();
                v.extend_from_slice(&self.factory_data);
                v
            }
            None => Vec::new(),
        };
        let paymaster_and_data = match &self.paymaster {
            Some(paymaster) => {
                let mut v = Vec::with_capacity(52 + self.paymaster_data.len());
                v.extend_from_slice(paymaster.as_bytes());
                v.extend_from_slice(&self.paymaster_verification_gas_limit.to_be_bytes());
                v.extend_from_slice(&self.paymaster_post_op_gas_limit.to_be_bytes());
                v.extend_from_slice(&self.paymaster_data);
                v
            }
            None => Vec::new(),
        };
        PackedUserOperation {
            sender: self.sender,
            nonce: self.nonce,
            init_code,
            call_data: self.call_data.clone(),
            account_gas_limits: PackedUserOperation::pack_gas_limits(
                self.verification_gas_limit,
                self.call_gas_limit,
            ),
            pre_verification_gas: self.pre_verification_gas,
            gas_fees: PackedUserOperation::pack_gas_fees(
                self.max_priority_fee_per_gas,
                self.max_fee_per_gas,
            ),
            paymaster_and_data,
            signature: self.signature.clone(),
        }
    }
}

/// Expands a packed v0.7 operation back into the wire form.
///
/// Inverse of [`UnpackedUserOperationV7::pack`]; re-packing the result
/// yields a field-identical `PackedUserOperation` (testable property: v0.7
/// packing round-trips).
pub fn unpack(packed: &PackedUserOperation) -> Result<UnpackedUserOperationV7> {
    let (factory, factory_data) = if packed.init_code.is_empty() {
        (None, Vec::new())
    } else if packed.init_code.len() < 20 {
        return Err(Error::MalformedUserOperation(
            "initCode shorter than a factory address".to_string(),
        ));
    } else {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&packed.init_code[0..20]);
        (Some(Address::from_bytes(bytes)), packed.init_code[20..].to_vec())
    };

    let (paymaster, pm_verification_gas_limit, pm_post_op_gas_limit, paymaster_data) =
        if packed.paymaster_and_data.is_empty() {
            (None, 0u128, 0u128, Vec::new())
        } else if packed.paymaster_and_data.len() < 52 {
            return Err(Error::MalformedUserOperation(
                "paymasterAndData shorter than address + two packed gas limits".to_string(),
            ));
        } else {
            let address = packed.paymaster_address().expect("length checked above");
            let vgl = u128::from_be_bytes(packed.paymaster_and_data[20..36].try_into().unwrap());
            let pogl = u128::from_be_bytes(packed.paymaster_and_data[36..52].try_into().unwrap());
            (Some(address), vgl, pogl, packed.paymaster_and_data[52..].to_vec())
        };

    Ok(UnpackedUserOperationV7 {
        sender: packed.sender,
        nonce: packed.nonce,
        factory,
        factory_data,
        call_data: packed.call_data.clone(),
        call_gas_limit: packed.call_gas_limit(),
        verification_gas_limit: packed.verification_gas_limit(),
        pre_verification_gas: packed.pre_verification_gas,
        max_fee_per_gas: packed.max_fee_per_gas(),
        max_priority_fee_per_gas: packed.max_priority_fee_per_gas(),
        paymaster,
        paymaster_verification_gas_limit: pm_verification_gas_limit,
        paymaster_post_op_gas_limit: pm_post_op_gas_limit,
        paymaster_data,
        signature: packed.signature.clone(),
    })
}
