//! EIP-2930 access list types.
//!
//! Access lists specify which addresses and storage keys a transaction will access,
//! allowing for gas savings on state access.

use crate::Address;

/// A single access list entry: an address and the storage keys it touches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessListItem {
    pub address: Address,
    pub storage_keys: Vec<[u8; 32]>,
}

impl AccessListItem {
    /// Creates a new access list item.
    pub fn new(address: Address, storage_keys: Vec<[u8; 32]>) -> Self {
        AccessListItem {
            address,
            storage_keys,
        }
    }

    /// Creates an access list item for an address with no storage keys.
    pub fn address_only(address: Address) -> Self {
        AccessListItem {
            address,
            storage_keys: Vec::new(),
        }
    }
}

/// A transaction access list (EIP-2930), used by EIP-1559 transactions.
pub type AccessList = Vec<AccessListItem>;
