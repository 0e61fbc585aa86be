//! Demonstrates that a single account's address is chain-independent while
//! its transaction signatures are chain-bound.
//!
//! 1. The same private key produces the same EVM address regardless of
//!    which chain a transaction targets.
//! 2. Only `ChainId` (via the signing hash) distinguishes a mainnet
//!    transaction from a transaction on another EVM chain.

use aa_evm_signing::{ChainId, Eip1559Transaction, PrivateKeyAccount, Wei, TRANSFER_GAS};

fn test_key(byte: u8) -> [u8; 32] {
    let mut key = [0u8; 32];
    key[31] = byte;
    key
}

#[test]
fn test_address_is_chain_independent() {
    let account = PrivateKeyAccount::from_private_key(&test_key(1)).unwrap();

    // The address is derived purely from the key; it is never parameterized
    // by a target chain.
    let address_for_mainnet_use = account.address();
    let address_for_polygon_use = account.address();

    assert_eq!(address_for_mainnet_use, address_for_polygon_use);
}

#[test]
fn test_mainnet_vs_polygon_signing_hashes_differ() {
    let account = PrivateKeyAccount::from_private_key(&test_key(1)).unwrap();

    let tx_mainnet = Eip1559Transaction::builder()
        .chain_id(ChainId::ETHEREUM_MAINNET)
        .nonce(0)
        .max_priority_fee_per_gas(Wei::from_gwei(1))
        .max_fee_per_gas(Wei::from_gwei(5))
        .gas_limit(TRANSFER_GAS)
        .build()
        .unwrap();

    let tx_polygon = Eip1559Transaction::builder()
        .chain_id(ChainId::POLYGON)
        .nonce(0)
        .max_priority_fee_per_gas(Wei::from_gwei(1))
        .max_fee_per_gas(Wei::from_gwei(5))
        .gas_limit(TRANSFER_GAS)
        .build()
        .unwrap();

    let _sig_mainnet = account.sign_hash(&tx_mainnet.signing_hash()).unwrap();
    let _sig_polygon = account.sign_hash(&tx_polygon.signing_hash()).unwrap();

    assert_ne!(
        tx_mainnet.signing_hash(),
        tx_polygon.signing_hash(),
        "Different ChainIds must produce different signing hashes"
    );
}

#[test]
fn test_known_address_vector() {
    let account = PrivateKeyAccount::from_private_key(&test_key(1)).unwrap();

    // Known secp256k1 test vector: private key 0x00..01.
    let expected = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";

    assert_eq!(
        account.address().to_checksum_string(),
        expected,
        "Address should match known test vector"
    );
}

#[test]
fn test_multiple_accounts_have_unique_addresses() {
    let addresses: Vec<_> = (1u8..=5)
        .map(|i| PrivateKeyAccount::from_private_key(&test_key(i)).unwrap().address())
        .collect();

    for i in 0..addresses.len() {
        for j in (i + 1)..addresses.len() {
            assert_ne!(
                addresses[i], addresses[j],
                "Accounts {} and {} should have different addresses",
                i, j
            );
        }
    }
}
