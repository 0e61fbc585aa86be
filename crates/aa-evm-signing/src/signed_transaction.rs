//! Signed transactions ready for broadcast.
//!
//! Wraps either an [`Eip1559Transaction`] or a [`LegacyTransaction`] together
//! with its [`Signature`], and knows how to RLP-encode the signed wire form
//! for each.

use crate::rlp_encode::{append_u256, encode_access_list};
use crate::{Eip1559Transaction, LegacyTransaction, Signature};
use rlp::RlpStream;
use sha3::{Digest, Keccak256};

/// Either transaction type this crate can sign and broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Legacy(LegacyTransaction),
    Eip1559(Eip1559Transaction),
}

impl From<LegacyTransaction> for Transaction {
    fn from(tx: LegacyTransaction) -> Self {
        Transaction::Legacy(tx)
    }
}

impl From<Eip1559Transaction> for Transaction {
    fn from(tx: Eip1559Transaction) -> Self {
        Transaction::Eip1559(tx)
    }
}

/// A transaction together with the signature over its signing hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    transaction: Transaction,
    signature: Signature,
}

impl SignedTransaction {
    /// Pairs a transaction with its signature.
    pub fn new(transaction: impl Into<Transaction>, signature: Signature) -> Self {
        SignedTransaction {
            transaction: transaction.into(),
            signature,
        }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// RLP-encodes the fully signed transaction, including its EIP-2718 type
    /// prefix for typed transactions.
    pub fn encode(&self) -> Vec<u8> {
        match &self.transaction {
            Transaction::Eip1559(tx) => {
                let mut stream = RlpStream::new_list(12);
                stream.append(&tx.chain_id.value());
                stream.append(&tx.nonce);
                append_u256(&mut stream, tx.max_priority_fee_per_gas.as_u256());
                append_u256(&mut stream, tx.max_fee_per_gas.as_u256());
                stream.append(&tx.gas_limit);
                match &tx.to {
                    Some(addr) => {
                        stream.append(&addr.rlp_bytes());
                    }
                    None => {
                        stream.append_empty_data();
                    }
                }
                append_u256(&mut stream, tx.value.as_u256());
                stream.append(&tx.data);
                encode_access_list(&mut stream, &tx.access_list);
                stream.append(&self.signature.v);
                append_signature_component(&mut stream, &self.signature.r);
                append_signature_component(&mut stream, &self.signature.s);

                let mut out = vec![Eip1559Transaction::TYPE];
                out.extend_from_slice(&stream.out());
                out
            }
            Transaction::Legacy(tx) => {
                let mut stream = RlpStream::new_list(9);
                stream.append(&tx.nonce);
                append_u256(&mut stream, tx.gas_price.as_u256());
                stream.append(&tx.gas_limit);
                match &tx.to {
                    Some(addr) => {
                        stream.append(&addr.rlp_bytes());
                    }
                    None => {
                        stream.append_empty_data();
                    }
                }
                append_u256(&mut stream, tx.value.as_u256());
                stream.append(&tx.data);
                let v = tx.eip155_v_offset() + self.signature.v as u64;
                stream.append(&v);
                append_signature_component(&mut stream, &self.signature.r);
                append_signature_component(&mut stream, &self.signature.s);
                stream.out().to_vec()
            }
        }
    }

    /// Returns the `0x`-prefixed hex-encoded raw transaction, suitable for
    /// `eth_sendRawTransaction`.
    pub fn to_raw_transaction(&self) -> String {
        format!("0x{}", hex::encode(self.encode()))
    }

    /// The Keccak-256 hash of the encoded transaction. This is the canonical
    /// transaction hash used to look up the transaction on-chain.
    pub fn tx_hash(&self) -> [u8; 32] {
        Keccak256::digest(self.encode()).into()
    }

    /// The `0x`-prefixed hex-encoded transaction hash.
    pub fn tx_hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.tx_hash()))
    }
}

fn append_signature_component(stream: &mut RlpStream, component: &[u8; 32]) {
    if component.iter().all(|&b| b == 0) {
        stream.append_empty_data();
        return;
    }
    let first_nonzero = component.iter().position(|&b| b != 0).unwrap_or(32);
    stream.append(&&component[first_nonzero..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, ChainId, PrivateKeyAccount, Wei};

    fn test_account() -> PrivateKeyAccount {
        let mut key = [0u8; 32];
        key[31] = 1;
        PrivateKeyAccount::from_private_key(&key).unwrap()
    }

    fn test_eip1559_tx() -> Eip1559Transaction {
        Eip1559Transaction::builder()
            .chain_id(ChainId::ETHEREUM_MAINNET)
            .nonce(0)
            .max_priority_fee_per_gas(Wei::from_gwei(1))
            .max_fee_per_gas(Wei::from_gwei(50))
            .gas_limit(21_000)
            .to(Address::ZERO)
            .build()
            .unwrap()
    }

    fn test_legacy_tx() -> LegacyTransaction {
        LegacyTransaction::builder()
            .chain_id(ChainId::ETHEREUM_MAINNET)
            .nonce(0)
            .gas_price(Wei::from_gwei(20))
            .gas_limit(21_000)
            .to(Address::ZERO)
            .build()
            .unwrap()
    }

    #[test]
    fn test_eip1559_encode_has_type_prefix() {
        let account = test_account();
        let tx = test_eip1559_tx();
        let sig = account.sign_hash(&tx.signing_hash()).unwrap();
        let signed = SignedTransaction::new(tx, sig);
        assert_eq!(signed.encode()[0], Eip1559Transaction::TYPE);
    }

    #[test]
    fn test_eip1559_raw_transaction_hex_prefixed() {
        let account = test_account();
        let tx = test_eip1559_tx();
        let sig = account.sign_hash(&tx.signing_hash()).unwrap();
        let signed = SignedTransaction::new(tx, sig);
        assert!(signed.to_raw_transaction().starts_with("0x02"));
    }

    #[test]
    fn test_eip1559_tx_hash_matches_keccak() {
        let account = test_account();
        let tx = test_eip1559_tx();
        let sig = account.sign_hash(&tx.signing_hash()).unwrap();
        let signed = SignedTransaction::new(tx, sig);
        let expected: [u8; 32] = Keccak256::digest(signed.encode()).into();
        assert_eq!(signed.tx_hash(), expected);
    }

    #[test]
    fn test_legacy_encode_no_type_prefix() {
        let account = test_account();
        let tx = test_legacy_tx();
        let sig = account.sign_hash(&tx.signing_hash()).unwrap();
        let signed = SignedTransaction::new(tx, sig);
        assert!(signed.encode()[0] >= 0xc0);
    }

    #[test]
    fn test_legacy_raw_transaction() {
        let account = test_account();
        let tx = test_legacy_tx();
        let sig = account.sign_hash(&tx.signing_hash()).unwrap();
        let signed = SignedTransaction::new(tx, sig);
        assert!(signed.to_raw_transaction().starts_with("0x"));
        assert!(!signed.to_raw_transaction().starts_with("0x02"));
    }

    #[test]
    fn test_accessors() {
        let account = test_account();
        let tx = test_eip1559_tx();
        let sig = account.sign_hash(&tx.signing_hash()).unwrap();
        let signed = SignedTransaction::new(tx.clone(), sig);
        assert_eq!(signed.transaction(), &Transaction::Eip1559(tx));
        assert_eq!(signed.signature(), &sig);
    }
}
