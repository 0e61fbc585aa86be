//! The version-tagged `UserOperation`, replacing the runtime type dispatch
//! the original client used with a single enum whose variant is chosen once,
//! at entry-point-version resolution time.

use crate::packed::{hash_user_operation, PackedUserOperation};
use crate::v6::{hash_user_operation_v6, UserOperationV6};
use aa_evm_signing::Address;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserOperation {
    V6(UserOperationV6),
    V7(PackedUserOperation),
}

impl UserOperation {
    pub fn sender(&self) -> Address {
        match self {
            UserOperation::V6(op) => op.sender,
            UserOperation::V7(op) => op.sender,
        }
    }

    pub fn hash(&self, entry_point: Address, chain_id: u64) -> [u8; 32] {
        match self {
            UserOperation::V6(op) => hash_user_operation_v6(op, entry_point, chain_id),
            UserOperation::V7(op) => hash_user_operation(op, entry_point, chain_id),
        }
    }

    pub fn set_signature(&mut self, signature: Vec<u8>) {
        match self {
            UserOperation::V6(op) => op.signature = signature,
            UserOperation::V7(op) => op.signature = signature,
        }
    }

    pub fn call_gas_limit(&self) -> u128 {
        match self {
            UserOperation::V6(op) => op.call_gas_limit.as_u128(),
            UserOperation::V7(op) => op.call_gas_limit(),
        }
    }

    pub fn set_call_gas_limit(&mut self, gas: u128) {
        match self {
            UserOperation::V6(op) => op.call_gas_limit = gas.into(),
            UserOperation::V7(op) => {
                let verification = op.verification_gas_limit();
                op.account_gas_limits = PackedUserOperation::pack_gas_limits(verification, gas);
            }
        }
    }

    pub fn has_init_code(&self) -> bool {
        match self {
            UserOperation::V6(op) => !op.init_code.is_empty(),
            UserOperation::V7(op) => !op.init_code.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packed::PackedUserOperation;
    use crate::v6::UserOperationV6;
    use primitive_types::U256;

    fn addr() -> Address {
        "0x742d35Cc6634C0532925a3b844Bc454e4438f44e".parse().unwrap()
    }

    #[test]
    fn test_v7_gas_padding_preserves_verification_gas_limit() {
        let packed = PackedUserOperation::builder()
            .sender(addr())
            .nonce(U256::zero())
            .account_gas_limits(150_000, 300_000)
            .pre_verification_gas(U256::from(50_000u64))
            .gas_fees(1_000_000_000, 5_000_000_000)
            .build()
            .unwrap();
        let mut op = UserOperation::V7(packed);
        op.set_call_gas_limit(321_000);
        assert_eq!(op.call_gas_limit(), 321_000);
        if let UserOperation::V7(packed) = &op {
            assert_eq!(packed.verification_gas_limit(), 150_000);
        }
    }

    #[test]
    fn test_v6_set_signature() {
        let v6 = UserOperationV6::builder()
            .sender(addr())
            .nonce(U256::zero())
            .call_gas_limit(U256::from(1u64))
            .verification_gas_limit(U256::from(1u64))
            .pre_verification_gas(U256::from(1u64))
            .gas_fees(U256::from(1u64), U256::from(1u64))
            .build()
            .unwrap();
        let mut op = UserOperation::V6(v6);
        op.set_signature(vec![1, 2, 3]);
        if let UserOperation::V6(v6) = op {
            assert_eq!(v6.signature, vec![1, 2, 3]);
        }
    }
}
