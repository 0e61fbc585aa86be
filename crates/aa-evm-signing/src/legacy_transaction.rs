//! Legacy (pre-EIP-2718) transactions with EIP-155 replay protection.
//!
//! Legacy transactions are untyped RLP lists of six fields. EIP-155 extends
//! the signature's `v` value to encode the chain id so a signature cannot be
//! replayed against a different chain.

use crate::{Address, ChainId, Error, Result, Wei};

/// A legacy (type-0) transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub chain_id: ChainId,
    pub nonce: u64,
    pub gas_price: Wei,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: Wei,
    pub data: Vec<u8>,
}

impl LegacyTransaction {
    /// Starts building a new legacy transaction.
    pub fn builder() -> LegacyTransactionBuilder {
        LegacyTransactionBuilder::default()
    }

    /// Validates the transaction's invariants.
    pub fn validate(&self) -> Result<()> {
        if self.gas_limit < crate::transaction::TRANSFER_GAS {
            return Err(Error::InvalidGas(format!(
                "gas_limit {} is below the minimum transfer gas {}",
                self.gas_limit,
                crate::transaction::TRANSFER_GAS
            )));
        }
        Ok(())
    }

    /// Returns `true` if this transaction deploys a contract (`to` is `None`).
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }

    /// The EIP-155 "recovery id offset" added to the bare ECDSA recovery id
    /// to produce the on-chain `v` value: `chain_id * 2 + 35`.
    pub fn eip155_v_offset(&self) -> u64 {
        self.chain_id.value() * 2 + 35
    }
}

/// Fluent builder for [`LegacyTransaction`].
#[derive(Debug, Clone, Default)]
pub struct LegacyTransactionBuilder {
    chain_id: Option<ChainId>,
    nonce: Option<u64>,
    gas_price: Option<Wei>,
    gas_limit: Option<u64>,
    to: Option<Address>,
    value: Wei,
    data: Vec<u8>,
}

impl LegacyTransactionBuilder {
    pub fn chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn gas_price(mut self, gas_price: Wei) -> Self {
        self.gas_price = Some(gas_price);
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

    /// Builds and validates the transaction.
    pub fn build(self) -> Result<LegacyTransaction> {
        let chain_id = self
            .chain_id
            .ok_or_else(|| Error::ValidationError("chain_id is required".to_string()))?;
        let nonce = self
            .nonce
            .ok_or_else(|| Error::ValidationError("nonce is required".to_string()))?;
        let gas_price = self
            .gas_price
            .ok_or_else(|| Error::ValidationError("gas_price is required".to_string()))?;
        let gas_limit = self
            .gas_limit
            .ok_or_else(|| Error::ValidationError("gas_limit is required".to_string()))?;

        let tx = LegacyTransaction {
            chain_id,
            nonce,
            gas_price,
            gas_limit,
            to: self.to,
            value: self.value,
            data: self.data,
        };

        tx.validate()?;
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TRANSFER_GAS;

    fn base_builder() -> LegacyTransactionBuilder {
        LegacyTransaction::builder()
            .chain_id(ChainId::ETHEREUM_MAINNET)
            .nonce(0)
            .gas_price(Wei::from_gwei(20))
            .gas_limit(TRANSFER_GAS)
            .to(Address::ZERO)
    }

    #[test]
    fn test_build_transfer() {
        let tx = base_builder().build().unwrap();
        assert_eq!(tx.chain_id, ChainId::ETHEREUM_MAINNET);
        assert!(!tx.is_contract_creation());
    }

    #[test]
    fn test_build_contract_creation() {
        let tx = base_builder()
            .contract_creation()
            .gas_limit(100_000)
            .data(vec![1, 2, 3])
            .build()
            .unwrap();
        assert!(tx.is_contract_creation());
    }

    #[test]
    fn test_build_missing_gas_price() {
        let result = LegacyTransaction::builder()
            .chain_id(ChainId::ETHEREUM_MAINNET)
            .nonce(0)
            .gas_limit(TRANSFER_GAS)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_gas_too_low() {
        let result = base_builder().gas_limit(1000).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_eip155_v_offset_mainnet() {
        let tx = base_builder().build().unwrap();
        assert_eq!(tx.eip155_v_offset(), 1 * 2 + 35);
    }

    #[test]
    fn test_eip155_v_offset_custom_chain() {
        let tx = base_builder()
            .chain_id(ChainId::new(31337))
            .build()
            .unwrap();
        assert_eq!(tx.eip155_v_offset(), 31337 * 2 + 35);
    }
}
