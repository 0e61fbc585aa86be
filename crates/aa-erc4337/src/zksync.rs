//! The ZK-Sync native path: no `UserOperation`, no bundler-protocol
//! EntryPoint. Instead a native EIP-712 transaction (zkSync's `txType 113`)
//! signed under the `("zkSync", "2", chainId)` domain, optionally decorated
//! with a paymaster hint fetched ahead of signing.

use crate::abi::keccak256;
use aa_evm_signing::eip712::{encode_address, encode_bytes_dynamic, encode_uint256, Eip712Domain, Eip712Type};
use aa_evm_signing::Address;

/// zkSync's EIP-712 transaction type (`txType = 113`).
pub const ZKSYNC_EIP712_TX_TYPE: u8 = 113;

/// Builds the `("zkSync", "2", chainId)` EIP-712 domain used to sign native
/// ZK-Sync transactions.
pub fn zksync_domain(chain_id: u64) -> Eip712Domain {
    Eip712Domain::builder().name("zkSync").version("2").chain_id(chain_id).build()
}

/// A native ZK-Sync EIP-712 transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZkSyncTransaction {
    pub from: Address,
    pub to: Address,
    pub gas_limit: u128,
    pub gas_per_pubdata_byte_limit: u128,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub paymaster: Address,
    pub nonce: u128,
    pub value: u128,
    pub data: Vec<u8>,
    pub factory_deps: Vec<[u8; 32]>,
    pub paymaster_input: Vec<u8>,
}

impl Eip712Type for ZkSyncTransaction {
    fn type_string() -> &'static str {
        "Transaction(uint256 txType,uint256 from,uint256 to,uint256 gasLimit,\
uint256 gasPerPubdataByteLimit,uint256 maxFeePerGas,uint256 maxPriorityFeePerGas,\
uint256 paymaster,uint256 nonce,uint256 value,bytes data,bytes32[] factoryDeps,\
bytes paymasterInput)"
    }

    fn encode_data(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(13 * 32);
        buf.extend_from_slice(&encode_uint256(ZKSYNC_EIP712_TX_TYPE as u128));
        buf.extend_from_slice(&encode_address(&self.from));
        buf.extend_from_slice(&encode_address(&self.to));
        buf.extend_from_slice(&encode_uint256(self.gas_limit));
        buf.extend_from_slice(&encode_uint256(self.gas_per_pubdata_byte_limit));
        buf.extend_from_slice(&encode_uint256(self.max_fee_per_gas));
        buf.extend_from_slice(&encode_uint256(self.max_priority_fee_per_gas));
        buf.extend_from_slice(&encode_address(&self.paymaster));
        buf.extend_from_slice(&encode_uint256(self.nonce));
        buf.extend_from_slice(&encode_uint256(self.value));
        buf.extend_from_slice(&encode_bytes_dynamic(&self.data));
        buf.extend_from_slice(&keccak256(
            &self
                .factory_deps
                .iter()
                .flat_map(|dep| dep.iter().copied())
                .collect::<Vec<u8>>(),
        ));
        buf.extend_from_slice(&encode_bytes_dynamic(&self.paymaster_input));
        buf
    }
}
