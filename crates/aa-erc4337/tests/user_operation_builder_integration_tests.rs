//! Integration test for the UserOperation builder pipeline: a v0.7
//! deployment UserOp (undeployed account, factory present) through to
//! submission and receipt polling, plus a frozen v0.6 hash fixture.

use aa_erc4337::{
    hash_user_operation_v6, AccountChainClient, BundlerClient, Config, EntryPointVersion, GasEstimate,
    GasPrice, PaymasterData, PaymasterMode, Result, UserOperation, UserOperationBuilder, UserOperationReceipt,
    UserOperationRequest, UserOperationV6, ZkPaymasterParams, ZkTransaction,
};
use aa_erc4337::{StateOverrides, ENTRY_POINT_V06};
use aa_evm_signing::{Address, PrivateKeyAccount};
use async_trait::async_trait;
use primitive_types::U256;
use std::sync::{Arc, Mutex};

struct StubChain {
    code: Mutex<Vec<u8>>,
}

#[async_trait]
impl AccountChainClient for StubChain {
    async fn get_code(&self, _address: Address) -> Result<Vec<u8>> {
        Ok(self.code.lock().unwrap().clone())
    }

    async fn get_nonce(&self, _entry_point: Address, _sender: Address, _key: U256) -> Result<U256> {
        Ok(U256::zero())
    }
}

struct StubBundler {
    sent: Mutex<Vec<UserOperation>>,
}

#[async_trait]
impl BundlerClient for StubBundler {
    async fn send_user_operation(&self, op: &UserOperation, _entry_point: Address) -> Result<[u8; 32]> {
        self.sent.lock().unwrap().push(op.clone());
        Ok([9u8; 32])
    }

    async fn estimate_user_operation_gas(
        &self,
        _op: &UserOperation,
        _entry_point: Address,
        state_overrides: Option<&StateOverrides>,
    ) -> Result<GasEstimate> {
        assert!(state_overrides.is_none(), "no paymaster in this scenario");
        Ok(GasEstimate {
            pre_verification_gas: 60_000,
            verification_gas_limit: 180_000,
            call_gas_limit: 250_000,
            paymaster_verification_gas_limit: None,
            paymaster_post_op_gas_limit: None,
        })
    }

    async fn get_user_operation_receipt(&self, user_op_hash: [u8; 32]) -> Result<Option<UserOperationReceipt>> {
        Ok(Some(UserOperationReceipt {
            user_op_hash: hex::encode(user_op_hash),
            transaction_hash: "0xabc".to_string(),
            success: true,
        }))
    }

    async fn get_gas_price(&self) -> Result<GasPrice> {
        Ok(GasPrice {
            max_fee_per_gas: 3_000_000_000,
            max_priority_fee_per_gas: 1_500_000_000,
        })
    }

    async fn sponsor_user_operation(&self, _op: &UserOperation, _entry_point: Address) -> Result<PaymasterData> {
        unimplemented!("not exercised by this scenario")
    }

    async fn zk_paymaster_data(&self, _tx: &ZkTransaction) -> Result<ZkPaymasterParams> {
        unimplemented!("not exercised by this scenario")
    }

    async fn zk_broadcast_transaction(&self, _signed_tx: &[u8]) -> Result<[u8; 32]> {
        unimplemented!("not exercised by this scenario")
    }
}

fn test_owner_account() -> PrivateKeyAccount {
    let mut key = [0u8; 32];
    key[31] = 77;
    PrivateKeyAccount::from_private_key(&key).unwrap()
}

fn smart_account_address() -> Address {
    "0x3333333333333333333333333333333333333333".parse().unwrap()
}

fn factory_address() -> Address {
    "0x4444444444444444444444444444444444444444".parse().unwrap()
}

#[tokio::test]
async fn test_deploy_and_send_first_user_operation() {
    let chain = Arc::new(StubChain { code: Mutex::new(Vec::new()) });
    let bundler = Arc::new(StubBundler { sent: Mutex::new(Vec::new()) });
    let owner = test_owner_account();
    let owner_address = owner.address();

    let builder = UserOperationBuilder::new(
        Config::default(),
        bundler.clone(),
        chain,
        EntryPointVersion::V07,
        84532,
        Arc::new(owner),
    );

    let hash = builder
        .build_and_send(UserOperationRequest {
            sender: smart_account_address(),
            call_data: vec![0xde, 0xad, 0xbe, 0xef],
            factory: Some((factory_address(), owner_address, U256::zero())),
            paymaster: PaymasterMode::None,
        })
        .await
        .expect("deployment user operation should build and submit");
    assert_eq!(hash, [9u8; 32]);

    let sent = bundler.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        UserOperation::V7(op) => {
            assert!(!op.init_code.is_empty(), "undeployed account must carry factory init code");
            assert_eq!(&op.init_code[0..20], factory_address().as_bytes());
            assert!(!op.signature.is_empty());
        }
        UserOperation::V6(_) => panic!("expected a v0.7 packed operation"),
    }

    let receipt = builder.wait_for_receipt(hash).await.unwrap();
    assert!(receipt.success);
}

#[test]
fn test_v6_user_operation_hash_is_stable_across_runs() {
    let sender: Address = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e".parse().unwrap();
    let entry_point: Address = ENTRY_POINT_V06.parse().unwrap();

    let op = UserOperationV6::builder()
        .sender(sender)
        .nonce(U256::zero())
        .call_data(vec![0xde, 0xad, 0xbe, 0xef])
        .call_gas_limit(U256::from(300_000u64))
        .verification_gas_limit(U256::from(150_000u64))
        .pre_verification_gas(U256::from(50_000u64))
        .gas_fees(U256::from(1_000_000_000u64), U256::from(5_000_000_000u64))
        .build()
        .unwrap();

    let hash_a = hash_user_operation_v6(&op, entry_point, 56);
    let hash_b = hash_user_operation_v6(&op, entry_point, 56);
    assert_eq!(hash_a, hash_b);

    let mut different_nonce = op;
    different_nonce.nonce = U256::from(1u64);
    assert_ne!(hash_a, hash_user_operation_v6(&different_nonce, entry_point, 56));
}
