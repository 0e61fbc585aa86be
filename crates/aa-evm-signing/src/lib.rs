//! # aa-evm-signing
//!
//! EVM signing primitives: legacy and EIP-1559 transactions, `personal_sign`/`eth_sign`
//! message signing, and EIP-712 typed data, for Ethereum and other EVM-compatible chains.
//!
//! This crate deliberately does not depend on any particular key-derivation scheme
//! (BIP-32/BIP-44, Shamir-split, HSM, ...). Callers hand it a raw 32-byte secp256k1
//! private key via [`PrivateKeyAccount::from_private_key`] and get back transaction
//! and message signing.

mod access_list;
mod account;
mod address;
mod chain_id;
#[cfg(feature = "eip712")]
pub mod eip712;
mod error;
mod legacy_transaction;
mod rlp_encode;
mod signature;
mod signed_transaction;
mod transaction;
mod wei;

pub use access_list::{AccessList, AccessListItem};
pub use account::{
    eth_signed_message_hash, keccak256, recover_address_from_personal_sign, recover_signer, PrivateKeyAccount,
};
pub use address::Address;
pub use chain_id::ChainId;
#[cfg(feature = "eip712")]
pub use eip712::{
    hash_typed_data, sign_typed_data, sign_typed_data_v4_json, verify_typed_data,
    verify_typed_data_v4_json, Eip712Domain, Eip712DomainBuilder, Eip712Type, TypedData,
};
pub use error::Error;
pub use legacy_transaction::{LegacyTransaction, LegacyTransactionBuilder};
pub use signature::Signature;
pub use signed_transaction::{SignedTransaction, Transaction};
pub use transaction::{Eip1559Transaction, Eip1559TransactionBuilder, TOKEN_TRANSFER_GAS, TRANSFER_GAS};
pub use wei::Wei;

/// This crate's `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;
