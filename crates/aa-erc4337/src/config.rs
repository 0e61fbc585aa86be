//! Process-wide constants as a readonly configuration struct rather than
//! free-floating globals (entry point addresses, default factories, the
//! dummy signature used during estimation, gas padding, poll interval).

use crate::error::{Error, Result};
use aa_evm_signing::Address;
use std::time::Duration;

/// Canonical ERC-4337 v0.6 EntryPoint address.
pub const ENTRY_POINT_V06: &str = "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789";

/// Canonical ERC-4337 v0.7 EntryPoint address.
pub const ENTRY_POINT_V07: &str = "0x0000000071727De22E5E9d8BAf0edAc6f37da032";

/// A syntactically valid 65-byte signature used to size gas estimation
/// before the account is actually signed.
pub const DUMMY_SIGNATURE: [u8; 65] = [0x11; 65];

/// `EntryPoint.getNonce` key width in bytes (192 bits).
pub const NONCE_KEY_LEN: usize = 24;

/// Allowance granted to an ERC-20 paymaster: `2^96 - 1`.
pub const MAX_ERC20_ALLOWANCE: u128 = (1u128 << 96) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPointVersion {
    V06,
    V07,
}

/// Readonly configuration for a [`crate::builder::UserOperationBuilder`].
/// Every field has a canonical default but is overridable by the embedder.
#[derive(Debug, Clone)]
pub struct Config {
    pub entry_point_v06: Address,
    pub entry_point_v07: Address,
    pub dummy_signature: Vec<u8>,
    /// Flat call-gas padding added after estimation on a not-yet-deployed
    /// v0.6 account (estimation underestimates calldata cost for the
    /// deployment transaction).
    pub call_gas_padding_v06: u128,
    /// Same padding for v0.7.
    pub call_gas_padding_v07: u128,
    pub receipt_poll_interval: Duration,
    pub default_factory_v06: Option<Address>,
    pub default_factory_v07: Option<Address>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            entry_point_v06: ENTRY_POINT_V06.parse().expect("valid constant address"),
            entry_point_v07: ENTRY_POINT_V07.parse().expect("valid constant address"),
            dummy_signature: DUMMY_SIGNATURE.to_vec(),
            call_gas_padding_v06: 50_000,
            call_gas_padding_v07: 21_000,
            receipt_poll_interval: Duration::from_secs(1),
            default_factory_v06: None,
            default_factory_v07: None,
        }
    }
}

impl Config {
    /// Resolves an EntryPoint version from its address. The version
    /// selector is string-equality on the supplied address, per the
    /// external interface contract.
    pub fn resolve_entry_point_version(&self, address: Address) -> Result<EntryPointVersion> {
        if address == self.entry_point_v06 {
            Ok(EntryPointVersion::V06)
        } else if address == self.entry_point_v07 {
            Ok(EntryPointVersion::V07)
        } else {
            Err(Error::Validation(format!(
                "unrecognized entry point address: {address}"
            )))
        }
    }

    pub fn call_gas_padding(&self, version: EntryPointVersion) -> u128 {
        match version {
            EntryPointVersion::V06 => self.call_gas_padding_v06,
            EntryPointVersion::V07 => self.call_gas_padding_v07,
        }
    }

    pub fn entry_point(&self, version: EntryPointVersion) -> Address {
        match version {
            EntryPointVersion::V06 => self.entry_point_v06,
            EntryPointVersion::V07 => self.entry_point_v07,
        }
    }
}
