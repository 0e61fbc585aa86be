//! EVM chain identifiers for transaction signing.
//!
//! Chain IDs are used in EIP-155 and EIP-1559 transactions for replay protection.
//! Each EVM network has a unique chain ID that must be included in signed transactions.

use std::fmt;

/// An EVM chain identifier.
///
/// Wraps a raw `u64` chain ID. Associated consts are provided for a handful
/// of well-known mainnets; any other chain (testnets, L2s, private networks)
/// is represented the same way via [`ChainId::new`].
///
/// # Examples
///
/// ```rust
/// use aa_evm_signing::ChainId;
///
/// let mainnet = ChainId::ETHEREUM_MAINNET;
/// assert_eq!(mainnet.value(), 1);
///
/// let custom = ChainId::new(31337);
/// assert_eq!(custom.value(), 31337);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(u64);

impl ChainId {
    /// Ethereum mainnet.
    pub const ETHEREUM_MAINNET: ChainId = ChainId(1);
    /// Polygon PoS mainnet.
    pub const POLYGON: ChainId = ChainId(137);
    /// Arbitrum One.
    pub const ARBITRUM_ONE: ChainId = ChainId(42161);
    /// Optimism mainnet.
    pub const OPTIMISM: ChainId = ChainId(10);
    /// Base mainnet.
    pub const BASE: ChainId = ChainId(8453);

    /// Creates a chain ID from a raw value.
    pub const fn new(id: u64) -> Self {
        ChainId(id)
    }

    /// Returns the raw chain ID value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns a human-readable name for well-known chains, or `None` otherwise.
    pub fn name(&self) -> Option<&'static str> {
        match self.0 {
            1 => Some("Ethereum Mainnet"),
            137 => Some("Polygon"),
            42161 => Some("Arbitrum One"),
            10 => Some("Optimism"),
            8453 => Some("Base"),
            _ => None,
        }
    }
}

impl From<ChainId> for u64 {
    fn from(chain_id: ChainId) -> Self {
        chain_id.0
    }
}

impl From<u64> for ChainId {
    fn from(value: u64) -> Self {
        ChainId(value)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "Chain {}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let chain_id = ChainId::new(31337);
        assert_eq!(chain_id.value(), 31337);
    }

    #[test]
    fn test_well_known_constants() {
        assert_eq!(ChainId::ETHEREUM_MAINNET.value(), 1);
        assert_eq!(ChainId::POLYGON.value(), 137);
        assert_eq!(ChainId::ARBITRUM_ONE.value(), 42161);
        assert_eq!(ChainId::OPTIMISM.value(), 10);
        assert_eq!(ChainId::BASE.value(), 8453);
    }

    #[test]
    fn test_name_known() {
        assert_eq!(ChainId::ETHEREUM_MAINNET.name(), Some("Ethereum Mainnet"));
        assert_eq!(ChainId::BASE.name(), Some("Base"));
    }

    #[test]
    fn test_name_unknown() {
        assert_eq!(ChainId::new(999999).name(), None);
    }

    #[test]
    fn test_from_u64() {
        let chain_id: ChainId = 1u64.into();
        assert_eq!(chain_id, ChainId::ETHEREUM_MAINNET);
    }

    #[test]
    fn test_into_u64() {
        let value: u64 = ChainId::POLYGON.into();
        assert_eq!(value, 137);
    }

    #[test]
    fn test_display_known() {
        assert_eq!(format!("{}", ChainId::ETHEREUM_MAINNET), "Ethereum Mainnet (1)");
    }

    #[test]
    fn test_display_unknown() {
        assert_eq!(format!("{}", ChainId::new(31337)), "Chain 31337");
    }

    #[test]
    fn test_ordering() {
        assert!(ChainId::ETHEREUM_MAINNET < ChainId::OPTIMISM);
        assert!(ChainId::new(1) < ChainId::new(2));
    }
}
