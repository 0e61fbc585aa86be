//! The ZK-Sync native transaction submission path. No bundler/EntryPoint;
//! instead a single signed, RLP-encoded `txType 113` transaction is handed
//! straight to `BundlerClient::zk_broadcast_transaction`.

use aa_erc4337::{zksync_domain, ZkSyncTransaction};
use aa_evm_signing::eip712::hash_typed_data;
use aa_evm_signing::{Address, Signature};
use rlp::RlpStream;

/// Converts an integer to its RLP integer representation: big-endian,
/// leading zero bytes stripped, zero itself as the empty string.
fn u128_bytes(value: u128) -> Vec<u8> {
    let full = value.to_be_bytes();
    let first_nonzero = full.iter().position(|b| *b != 0);
    match first_nonzero {
        Some(index) => full[index..].to_vec(),
        None => Vec::new(),
    }
}

/// RLP-encodes a signed ZK-Sync transaction in the native `txType 113`
/// envelope, ready for `zk_broadcastTransaction`.
pub fn encode_signed_zksync_transaction(tx: &ZkSyncTransaction, signature: &Signature) -> Vec<u8> {
    let mut stream = RlpStream::new_list(16);
    stream.append(&u128_bytes(tx.nonce));
    stream.append(&u128_bytes(tx.max_priority_fee_per_gas));
    stream.append(&u128_bytes(tx.max_fee_per_gas));
    stream.append(&u128_bytes(tx.gas_limit));
    stream.append(&tx.to.as_bytes().as_slice());
    stream.append(&u128_bytes(tx.value));
    stream.append(&tx.data);
    // Legacy v/r/s slots, unused by the EIP-712 envelope but present in the
    // field layout; left empty.
    stream.append_empty_data();
    stream.append_empty_data();
    stream.append_empty_data();
    stream.append(&tx.from.as_bytes().as_slice());
    stream.append(&u128_bytes(tx.gas_per_pubdata_byte_limit));
    stream.begin_list(tx.factory_deps.len());
    for dep in &tx.factory_deps {
        stream.append(&dep.as_slice());
    }
    stream.append(&signature.to_bytes().as_slice());
    if tx.paymaster == Address::ZERO {
        stream.begin_list(0);
    } else {
        stream.begin_list(2);
        stream.append(&tx.paymaster.as_bytes().as_slice());
        stream.append(&tx.paymaster_input);
    }

    let mut out = vec![0x71];
    out.extend_from_slice(&stream.out());
    out
}

/// Computes the EIP-712 digest a ZK-Sync transaction is signed over.
pub fn zksync_transaction_hash(tx: &ZkSyncTransaction, chain_id: u64) -> [u8; 32] {
    hash_typed_data(&zksync_domain(chain_id), tx)
}
