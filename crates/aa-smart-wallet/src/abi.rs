//! A small typed ABI codec for the one contract call this crate makes
//! directly (`setPermissionsForSigner`), in the same spirit as
//! `aa_erc4337::abi`: exactly the calldata shape this crate needs, not a
//! general reflection layer.

use crate::permission::SignerPermissionRequest;
use aa_erc4337::selector;
use aa_evm_signing::Address;
use primitive_types::U256;

fn word_address(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn word_u256(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

fn word_u128(value: u128) -> [u8; 32] {
    word_u256(U256::from(value))
}

fn encode_bytes_tail(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(32 + data.len().div_ceil(32) * 32);
    out.extend_from_slice(&word_u256(U256::from(data.len())));
    out.extend_from_slice(data);
    let padding = (32 - (data.len() % 32)) % 32;
    out.extend(std::iter::repeat(0u8).take(padding));
    out
}

/// ABI-encodes the `SignerPermissionRequest` tuple member: 9 head words (one
/// of which, `approvedTargets`, is a dynamic array and so is itself an
/// offset into the tuple's own tail).
fn encode_request_tuple(req: &SignerPermissionRequest) -> Vec<u8> {
    const HEAD_WORDS: usize = 9;

    let mut targets_tail = Vec::with_capacity(32 + req.approved_targets.len() * 32);
    targets_tail.extend_from_slice(&word_u256(U256::from(req.approved_targets.len())));
    for target in &req.approved_targets {
        targets_tail.extend_from_slice(&word_address(*target));
    }

    let mut head = Vec::with_capacity(HEAD_WORDS * 32);
    head.extend_from_slice(&word_address(req.signer));
    head.extend_from_slice(&word_u128(req.is_admin as u128));
    head.extend_from_slice(&word_u256(U256::from(HEAD_WORDS * 32)));
    head.extend_from_slice(&word_u256(U256::from(req.native_token_limit_per_tx)));
    head.extend_from_slice(&word_u128(req.permission_start as u128));
    head.extend_from_slice(&word_u128(req.permission_end as u128));
    head.extend_from_slice(&word_u128(req.req_validity_start as u128));
    head.extend_from_slice(&word_u128(req.req_validity_end as u128));
    let mut uid_word = [0u8; 32];
    uid_word[..16].copy_from_slice(&req.uid);
    head.extend_from_slice(&uid_word);

    head.extend_from_slice(&targets_tail);
    head
}

/// Encodes `setPermissionsForSigner((address,uint8,address[],uint256,\
/// uint128,uint128,uint128,uint128,bytes32),bytes)` calldata.
pub fn encode_set_permissions_for_signer(req: &SignerPermissionRequest, signature: &[u8]) -> Vec<u8> {
    let tuple = encode_request_tuple(req);
    let req_offset = 2 * 32;
    let signature_offset = req_offset + tuple.len();

    let mut out = Vec::new();
    out.extend_from_slice(&selector(
        "setPermissionsForSigner((address,uint8,address[],uint256,uint128,uint128,uint128,uint128,bytes32),bytes)",
    ));
    out.extend_from_slice(&word_u256(U256::from(req_offset)));
    out.extend_from_slice(&word_u256(U256::from(signature_offset)));
    out.extend_from_slice(&tuple);
    out.extend_from_slice(&encode_bytes_tail(signature));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::PermissionLevel;

    fn addr(byte: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = byte;
        Address::from_bytes(bytes)
    }

    fn sample_request() -> SignerPermissionRequest {
        SignerPermissionRequest {
            signer: addr(1),
            is_admin: PermissionLevel::Session,
            approved_targets: vec![addr(2), addr(3)],
            native_token_limit_per_tx: 1_000,
            permission_start: 0,
            permission_end: 100,
            req_validity_start: 0,
            req_validity_end: 100,
            uid: [1u8; 16],
        }
    }

    #[test]
    fn test_calldata_starts_with_selector() {
        let calldata = encode_set_permissions_for_signer(&sample_request(), &[0xde, 0xad]);
        let expected = selector(
            "setPermissionsForSigner((address,uint8,address[],uint256,uint128,uint128,uint128,uint128,bytes32),bytes)",
        );
        assert_eq!(&calldata[0..4], &expected);
    }

    #[test]
    fn test_calldata_length_is_word_aligned() {
        let calldata = encode_set_permissions_for_signer(&sample_request(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!((calldata.len() - 4) % 32, 0);
    }

    #[test]
    fn test_calldata_encodes_approved_targets_count() {
        let calldata = encode_set_permissions_for_signer(&sample_request(), &[]);
        // tuple head is 9 words; targets length word follows immediately after.
        let targets_len_offset = 4 + 9 * 32;
        let len_word = U256::from_big_endian(&calldata[targets_len_offset..targets_len_offset + 32]);
        assert_eq!(len_word, U256::from(2u64));
    }
}
