//! ERC-4337 UserOperation builder: v0.6/v0.7 construction and packing, a
//! typed ABI codec, bundler/paymaster JSON-RPC clients, and the ZK-Sync
//! native transaction path.

mod abi;
mod builder;
mod bundler;
mod config;
mod error;
mod packed;
mod paymaster;
mod signer;
mod user_operation;
mod v6;
mod zksync;

pub use abi::{
    balance_storage_slot, encode_create_account, encode_erc20_approve, encode_execute, keccak256, selector,
};
pub use builder::{AccountChainClient, PaymasterMode, UserOperationBuilder, UserOperationRequest};
pub use bundler::{
    BundlerClient, GasEstimate, GasPrice, JsonRpcBundlerClient, PaymasterData, StateOverride, StateOverrides,
    UserOperationReceipt, ZkPaymasterParams, ZkTransaction,
};
pub use config::{Config, EntryPointVersion, DUMMY_SIGNATURE, ENTRY_POINT_V06, ENTRY_POINT_V07, MAX_ERC20_ALLOWANCE, NONCE_KEY_LEN};
pub use error::{Error, Result};
pub use packed::{hash_user_operation, unpack, PackedUserOperation, PackedUserOperationBuilder, UnpackedUserOperationV7};
pub use paymaster::{build_balance_override, build_max_approval_calldata, ApprovalGuard, ApprovalGuardHandle};
pub use signer::{sign_user_operation_hash, UserOperationSigner};
pub use user_operation::UserOperation;
pub use v6::{hash_user_operation_v6, UserOperationV6, UserOperationV6Builder};
pub use zksync::{zksync_domain, ZkSyncTransaction, ZKSYNC_EIP712_TX_TYPE};
