//! EIP-1559 (Type 2) transaction types.
//!
//! This module provides the transaction structure and builder for creating
//! EIP-1559 transactions used on Ethereum and other EVM-compatible chains.

use crate::{AccessList, Address, ChainId, Error, Result, Wei};

/// Gas required for a plain ETH/native-token transfer.
pub const TRANSFER_GAS: u64 = 21_000;

/// A reasonable default gas limit for a single ERC-20 token transfer.
pub const TOKEN_TRANSFER_GAS: u64 = 65_000;

/// An EIP-1559 (type 2) fee-market transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip1559Transaction {
    pub chain_id: ChainId,
    pub nonce: u64,
    pub max_priority_fee_per_gas: Wei,
    pub max_fee_per_gas: Wei,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: Wei,
    pub data: Vec<u8>,
    pub access_list: AccessList,
}

impl Eip1559Transaction {
    /// The EIP-2718 transaction type byte for EIP-1559 transactions.
    pub const TYPE: u8 = 0x02;

    /// Starts building a new transaction.
    pub fn builder() -> Eip1559TransactionBuilder {
        Eip1559TransactionBuilder::default()
    }

    /// Validates the transaction's invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_fee_per_gas < max_priority_fee_per_gas`, or if
    /// `gas_limit` is below [`TRANSFER_GAS`].
    pub fn validate(&self) -> Result<()> {
        if self.max_fee_per_gas < self.max_priority_fee_per_gas {
            return Err(Error::ValidationError(
                "max_fee_per_gas must be >= max_priority_fee_per_gas".to_string(),
            ));
        }
        if self.gas_limit < TRANSFER_GAS {
            return Err(Error::InvalidGas(format!(
                "gas_limit {} is below the minimum transfer gas {}",
                self.gas_limit, TRANSFER_GAS
            )));
        }
        Ok(())
    }

    /// Returns `true` if this transaction deploys a contract (`to` is `None`).
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }

    /// Returns `true` if this transaction carries no calldata.
    pub fn is_transfer(&self) -> bool {
        self.data.is_empty()
    }
}

/// Fluent builder for [`Eip1559Transaction`].
#[derive(Debug, Clone, Default)]
pub struct Eip1559TransactionBuilder {
    chain_id: Option<ChainId>,
    nonce: Option<u64>,
    max_priority_fee_per_gas: Option<Wei>,
    max_fee_per_gas: Option<Wei>,
    gas_limit: Option<u64>,
    to: Option<Address>,
    value: Wei,
    data: Vec<u8>,
    access_list: AccessList,
}

impl Eip1559TransactionBuilder {
    pub fn chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn max_priority_fee_per_gas(mut self, fee: Wei) -> Self {
        self.max_priority_fee_per_gas = Some(fee);
        self
    }

    pub fn max_fee_per_gas(mut self, fee: Wei) -> Self {
        self.max_fee_per_gas = Some(fee);
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    pub fn contract_creation(mut self) -> Self {
        self.to = None;
        self
    }

    pub fn value(mut self, value: Wei) -> Self {
        self.value = value;
        self
    }

    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    pub fn access_list(mut self, access_list: AccessList) -> Self {
        self.access_list = access_list;
        self
    }

    /// Builds and validates the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is missing, or if the built
    /// transaction fails [`Eip1559Transaction::validate`].
    pub fn build(self) -> Result<Eip1559Transaction> {
        let chain_id = self
            .chain_id
            .ok_or_else(|| Error::ValidationError("chain_id is required".to_string()))?;
        let nonce = self
            .nonce
            .ok_or_else(|| Error::ValidationError("nonce is required".to_string()))?;
        let max_priority_fee_per_gas = self.max_priority_fee_per_gas.ok_or_else(|| {
            Error::ValidationError("max_priority_fee_per_gas is required".to_string())
        })?;
        let max_fee_per_gas = self
            .max_fee_per_gas
            .ok_or_else(|| Error::ValidationError("max_fee_per_gas is required".to_string()))?;
        let gas_limit = self
            .gas_limit
            .ok_or_else(|| Error::ValidationError("gas_limit is required".to_string()))?;

        let tx = Eip1559Transaction {
            chain_id,
            nonce,
            max_priority_fee_per_gas,
            max_fee_per_gas,
            gas_limit,
            to: self.to,
            value: self.value,
            data: self.data,
            access_list: self.access_list,
        };

        tx.validate()?;
        Ok(tx)
    }
}
