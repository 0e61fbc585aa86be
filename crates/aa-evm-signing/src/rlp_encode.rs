//! RLP encoding for unsigned transactions.
//!
//! Implements RLP (Recursive Length Prefix) encoding for EIP-1559 transactions
//! (EIP-2718 typed envelope) and legacy transactions (EIP-155).

use crate::{AccessListItem, Address, Eip1559Transaction, LegacyTransaction};
use primitive_types::U256;
use rlp::RlpStream;
use sha3::{Digest, Keccak256};

impl Address {
    pub(crate) fn rlp_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

pub(crate) fn append_u256(stream: &mut RlpStream, value: U256) {
    if value.is_zero() {
        stream.append_empty_data();
        return;
    }
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(32);
    stream.append(&&bytes[first_nonzero..]);
}

pub(crate) fn encode_access_list(stream: &mut RlpStream, access_list: &[AccessListItem]) {
    stream.begin_list(access_list.len());
    for item in access_list {
        stream.begin_list(2);
        stream.append(&item.address.rlp_bytes());
        stream.begin_list(item.storage_keys.len());
        for key in &item.storage_keys {
            stream.append(&key.as_slice());
        }
    }
}

impl Eip1559Transaction {
    /// RLP-encodes the unsigned transaction with its EIP-2718 type prefix.
    pub fn encode_unsigned(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(9);
        stream.append(&self.chain_id.value());
        stream.append(&self.nonce);
        append_u256(&mut stream, self.max_priority_fee_per_gas.as_u256());
        append_u256(&mut stream, self.max_fee_per_gas.as_u256());
        stream.append(&self.gas_limit);
        match &self.to {
            Some(addr) => {
                stream.append(&addr.rlp_bytes());
            }
            None => {
                stream.append_empty_data();
            }
        }
        append_u256(&mut stream, self.value.as_u256());
        stream.append(&self.data);
        encode_access_list(&mut stream, &self.access_list);

        let mut out = vec![Self::TYPE];
        out.extend_from_slice(&stream.out());
        out
    }

    /// Keccak-256 hash of the unsigned, typed-prefixed encoding. This is the
    /// value signed by the transaction's sender.
    pub fn signing_hash(&self) -> [u8; 32] {
        Keccak256::digest(self.encode_unsigned()).into()
    }
}

impl LegacyTransaction {
    /// RLP-encodes the unsigned transaction per EIP-155: the six core fields
    /// followed by `(chain_id, 0, 0)` so the signing hash binds the chain id.
    pub fn encode_unsigned(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(9);
        stream.append(&self.nonce);
        append_u256(&mut stream, self.gas_price.as_u256());
        stream.append(&self.gas_limit);
        match &self.to {
            Some(addr) => {
                stream.append(&addr.rlp_bytes());
            }
            None => {
                stream.append_empty_data();
            }
        }
        append_u256(&mut stream, self.value.as_u256());
        stream.append(&self.data);
        stream.append(&self.chain_id.value());
        stream.append_empty_data();
        stream.append_empty_data();
        stream.out().to_vec()
    }

    /// Keccak-256 hash of the EIP-155 unsigned encoding.
    pub fn signing_hash(&self) -> [u8; 32] {
        Keccak256::digest(self.encode_unsigned()).into()
    }
}
