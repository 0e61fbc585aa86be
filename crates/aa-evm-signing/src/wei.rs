//! Wei type for EVM transaction values.
//!
//! Wei is the smallest unit of Ether (or any EVM chain's native gas token).
//! This module provides a wrapper around U256 with convenient conversion methods.

use crate::{Error, Result};
use primitive_types::U256;
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

/// An amount denominated in wei, the smallest unit of an EVM chain's native token.
///
/// # Examples
///
/// ```rust
/// use aa_evm_signing::Wei;
///
/// let one_ether = Wei::from_ether(1);
/// let one_gwei = Wei::from_gwei(1);
/// assert_eq!(one_ether.to_gwei(), 1_000_000_000u64.into());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Wei(U256);

impl Wei {
    /// Wei per gwei (10^9).
    pub const GWEI: u64 = 1_000_000_000;

    /// Wei per ether (10^18).
    pub const ETHER: u128 = 1_000_000_000_000_000_000;

    /// Zero wei.
    pub const ZERO: Wei = Wei(U256::zero());

    /// Creates a `Wei` value directly from a raw wei amount.
    pub fn from_wei(value: U256) -> Self {
        Wei(value)
    }

    /// Creates a `Wei` value from a gwei amount.
    pub fn from_gwei(gwei: u64) -> Self {
        Wei(U256::from(gwei) * U256::from(Self::GWEI))
    }

    /// Creates a `Wei` value from an ether (whole-token) amount.
    pub fn from_ether(ether: u64) -> Self {
        Wei(U256::from(ether) * U256::from(Self::ETHER))
    }

    /// Returns the raw wei amount as `U256`.
    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Returns the value as `u64`, if it fits.
    pub fn as_u64(&self) -> Result<u64> {
        if self.0 > U256::from(u64::MAX) {
            return Err(Error::InvalidValue(format!(
                "value {} does not fit in u64",
                self.0
            )));
        }
        Ok(self.0.as_u64())
    }

    /// Returns the value as `u128`, if it fits.
    pub fn as_u128(&self) -> Result<u128> {
        if self.0 > U256::from(u128::MAX) {
            return Err(Error::InvalidValue(format!(
                "value {} does not fit in u128",
                self.0
            )));
        }
        Ok(self.0.as_u128())
    }

    /// Converts to a gwei amount (integer division, truncating remainder).
    pub fn to_gwei(&self) -> U256 {
        self.0 / U256::from(Self::GWEI)
    }

    /// Converts to an ether amount (integer division, truncating remainder).
    pub fn to_ether(&self) -> U256 {
        self.0 / U256::from(Self::ETHER)
    }

    /// Returns `true` if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns the value as a 32-byte big-endian array.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.0.to_big_endian(&mut bytes);
        bytes
    }

    /// Creates a `Wei` value from a 32-byte big-endian array.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        Wei(U256::from_big_endian(bytes))
    }
}

impl From<u64> for Wei {
    fn from(value: u64) -> Self {
        Wei(U256::from(value))
    }
}

impl From<u128> for Wei {
    fn from(value: u128) -> Self {
        Wei(U256::from(value))
    }
}

impl From<U256> for Wei {
    fn from(value: U256) -> Self {
        Wei(value)
    }
}

impl From<Wei> for U256 {
    fn from(wei: Wei) -> Self {
        wei.0
    }
}

impl Add for Wei {
    type Output = Wei;
    fn add(self, rhs: Wei) -> Wei {
        Wei(self.0 + rhs.0)
    }
}

impl Sub for Wei {
    type Output = Wei;
    fn sub(self, rhs: Wei) -> Wei {
        Wei(self.0 - rhs.0)
    }
}

impl Mul<u64> for Wei {
    type Output = Wei;
    fn mul(self, rhs: u64) -> Wei {
        Wei(self.0 * U256::from(rhs))
    }
}

impl FromStr for Wei {
    type Err = Error;

    /// Parses a decimal wei amount, optionally `0x`-prefixed hex.
    fn from_str(s: &str) -> Result<Self> {
        if let Some(hex_str) = s.strip_prefix("0x") {
            let value = U256::from_str_radix(hex_str, 16)
                .map_err(|e| Error::InvalidValue(e.to_string()))?;
            Ok(Wei(value))
        } else {
            let value = U256::from_dec_str(s).map_err(|e| Error::InvalidValue(e.to_string()))?;
            Ok(Wei(value))
        }
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wei({})", self.0)
    }
}
