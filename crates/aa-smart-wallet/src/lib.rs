//! ERC-4337 smart wallet facade over `aa-erc4337`: deploy-on-first-use,
//! ERC-1271 personal-sign wrapping, session-key/admin permission
//! management, and a ZK-Sync native-transaction fallback.

mod abi;
mod client;
mod error;
mod permission;
mod signer;
mod wallet;
mod zksync;

pub use abi::encode_set_permissions_for_signer;
pub use client::{SmartAccountClient, ERC1271_MAGIC_VALUE};
pub use error::{Error, Result};
pub use permission::{account_domain, random_uid, AccountMessage, PermissionLevel, SignerPermissionRequest};
pub use signer::PersonalAccount;
pub use wallet::{Network, SmartWallet, SmartWalletConfig};
pub use zksync::{encode_signed_zksync_transaction, zksync_transaction_hash};
