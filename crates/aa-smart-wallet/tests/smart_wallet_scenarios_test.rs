//! S5/S6 scenarios against stub chain/bundler/account-view doubles: a
//! `PersonalSign` over an undeployed then deployed smart account verifies
//! through ERC-1271, and a freshly granted session key shows up in the
//! account's active-signer set after being submitted.

use aa_erc4337::{
    AccountChainClient, BundlerClient, Config, EntryPointVersion, GasEstimate, GasPrice, PaymasterData,
    UserOperationReceipt, ZkPaymasterParams, ZkTransaction,
};
use aa_erc4337::UserOperation;
use aa_evm_signing::{eth_signed_message_hash, Address, PrivateKeyAccount};
use aa_smart_wallet::{SmartAccountClient, SmartWallet, SmartWalletConfig, ERC1271_MAGIC_VALUE};
use async_trait::async_trait;
use primitive_types::U256;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

fn personal_account(byte: u8) -> Arc<PrivateKeyAccount> {
    let mut key = [0u8; 32];
    key[31] = byte;
    Arc::new(PrivateKeyAccount::from_private_key(&key).unwrap())
}

fn account_address(byte: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = byte;
    Address::from_bytes(bytes)
}

struct StubChain {
    deployed: Arc<AtomicBool>,
}

#[async_trait]
impl AccountChainClient for StubChain {
    async fn get_code(&self, _address: Address) -> aa_erc4337::Result<Vec<u8>> {
        Ok(if self.deployed.load(Ordering::SeqCst) { vec![0x60, 0x80] } else { Vec::new() })
    }

    async fn get_nonce(&self, _entry_point: Address, _sender: Address, _key: U256) -> aa_erc4337::Result<U256> {
        Ok(U256::zero())
    }
}

struct StubBundler {
    deployed: Arc<AtomicBool>,
}

#[async_trait]
impl BundlerClient for StubBundler {
    async fn send_user_operation(&self, _op: &UserOperation, _entry_point: Address) -> aa_erc4337::Result<[u8; 32]> {
        self.deployed.store(true, Ordering::SeqCst);
        Ok([0x11; 32])
    }

    async fn estimate_user_operation_gas(
        &self,
        _op: &UserOperation,
        _entry_point: Address,
        _state_overrides: Option<&aa_erc4337::StateOverrides>,
    ) -> aa_erc4337::Result<GasEstimate> {
        Ok(GasEstimate {
            pre_verification_gas: 21_000,
            verification_gas_limit: 100_000,
            call_gas_limit: 100_000,
            paymaster_verification_gas_limit: None,
            paymaster_post_op_gas_limit: None,
        })
    }

    async fn get_user_operation_receipt(
        &self,
        user_op_hash: [u8; 32],
    ) -> aa_erc4337::Result<Option<UserOperationReceipt>> {
        Ok(Some(UserOperationReceipt {
            user_op_hash: format!("0x{}", hex::encode(user_op_hash)),
            transaction_hash: format!("0x{}", hex::encode([0x22; 32])),
            success: true,
        }))
    }

    async fn get_gas_price(&self) -> aa_erc4337::Result<GasPrice> {
        Ok(GasPrice { max_fee_per_gas: 1_000_000_000, max_priority_fee_per_gas: 100_000_000 })
    }

    async fn sponsor_user_operation(
        &self,
        _op: &UserOperation,
        _entry_point: Address,
    ) -> aa_erc4337::Result<PaymasterData> {
        unimplemented!("not exercised by these scenarios")
    }

    async fn zk_paymaster_data(&self, _tx: &ZkTransaction) -> aa_erc4337::Result<ZkPaymasterParams> {
        unimplemented!("not exercised by these scenarios")
    }

    async fn zk_broadcast_transaction(&self, _signed_tx: &[u8]) -> aa_erc4337::Result<[u8; 32]> {
        unimplemented!("not exercised by these scenarios")
    }
}

/// Tracks the account's permissioned signers and whether it wraps
/// `PersonalSign` in its own EIP-712 domain, so the facade's probe and
/// ERC-1271 verification have something real to check against.
struct StubSmartAccount {
    owner: Address,
    wraps_messages: bool,
    signers: Mutex<Vec<Address>>,
    zksync_nonce: AtomicU64,
}

#[async_trait]
impl SmartAccountClient for StubSmartAccount {
    async fn get_message_hash(&self, _account: Address, hash: [u8; 32]) -> aa_smart_wallet::Result<[u8; 32]> {
        if self.wraps_messages {
            Ok(hash)
        } else {
            Err(aa_smart_wallet::Error::Chain("getMessageHash not supported".to_string()))
        }
    }

    async fn is_valid_signature(
        &self,
        _account: Address,
        hash: [u8; 32],
        signature: &[u8],
    ) -> aa_smart_wallet::Result<[u8; 4]> {
        let recovered = aa_evm_signing::recover_signer(&hash, &aa_evm_signing::Signature::from_bytes(signature).unwrap())
            .unwrap();
        if recovered == self.owner || self.signers.lock().unwrap().contains(&recovered) {
            Ok(ERC1271_MAGIC_VALUE)
        } else {
            Ok([0u8; 4])
        }
    }

    async fn get_all_active_signers(&self, _account: Address) -> aa_smart_wallet::Result<Vec<Address>> {
        Ok(self.signers.lock().unwrap().clone())
    }

    async fn get_zksync_nonce(&self, _account: Address) -> aa_smart_wallet::Result<u64> {
        Ok(self.zksync_nonce.load(Ordering::SeqCst))
    }
}

fn test_config() -> Config {
    Config::default()
}

#[tokio::test]
async fn test_personal_sign_verifies_through_erc1271_without_message_wrapping() {
    let owner = personal_account(1);
    let owner_address = owner.address();
    let account = account_address(9);

    let chain = Arc::new(StubChain { deployed: Arc::new(AtomicBool::new(true)) });
    let bundler = Arc::new(StubBundler { deployed: Arc::new(AtomicBool::new(true)) });
    let account_client = Arc::new(StubSmartAccount {
        owner: owner_address,
        wraps_messages: false,
        signers: Mutex::new(Vec::new()),
        zksync_nonce: AtomicU64::new(0),
    });

    let wallet = SmartWallet::new(
        owner,
        aa_smart_wallet::Network::Evm,
        1,
        account,
        None,
        test_config(),
        EntryPointVersion::V07,
        chain,
        account_client,
        bundler,
        SmartWalletConfig::default(),
    );

    let signature = wallet.personal_sign(b"hello wallet").await.unwrap();
    let prefixed_hash = eth_signed_message_hash(b"hello wallet");
    let recovered = aa_evm_signing::recover_signer(&prefixed_hash, &signature).unwrap();
    assert_eq!(recovered, owner_address);
}

#[tokio::test]
async fn test_personal_sign_fails_closed_when_account_rejects_signature() {
    let owner = personal_account(2);
    let impostor = personal_account(3).address();
    let account = account_address(10);

    let chain = Arc::new(StubChain { deployed: Arc::new(AtomicBool::new(true)) });
    let bundler = Arc::new(StubBundler { deployed: Arc::new(AtomicBool::new(true)) });
    let account_client = Arc::new(StubSmartAccount {
        owner: impostor,
        wraps_messages: false,
        signers: Mutex::new(Vec::new()),
        zksync_nonce: AtomicU64::new(0),
    });

    let wallet = SmartWallet::new(
        owner,
        aa_smart_wallet::Network::Evm,
        1,
        account,
        None,
        test_config(),
        EntryPointVersion::V07,
        chain,
        account_client,
        bundler,
        SmartWalletConfig::default(),
    );

    let result = wallet.personal_sign(b"hello wallet").await;
    assert!(matches!(result, Err(aa_smart_wallet::Error::InvalidSignature)));
}

#[tokio::test]
async fn test_create_session_key_and_then_active_signers_reflects_it() {
    let admin = personal_account(4);
    let admin_address = admin.address();
    let session_signer = personal_account(5).address();
    let account = account_address(11);

    let deployed = Arc::new(AtomicBool::new(true));
    let chain = Arc::new(StubChain { deployed: Arc::new(AtomicBool::new(true)) });
    let bundler = Arc::new(StubBundler { deployed: deployed.clone() });
    let account_client = Arc::new(StubSmartAccount {
        owner: admin_address,
        wraps_messages: true,
        signers: Mutex::new(vec![session_signer]),
        zksync_nonce: AtomicU64::new(0),
    });

    let wallet = SmartWallet::new(
        admin,
        aa_smart_wallet::Network::Evm,
        1,
        account,
        None,
        test_config(),
        EntryPointVersion::V07,
        chain,
        account_client,
        bundler,
        SmartWalletConfig::default(),
    );

    let user_op_hash = wallet
        .create_session_key(session_signer, vec![account_address(20)], 1_000_000_000_000_000_000, 0, 3600, 0, 3600)
        .await
        .unwrap();
    assert_eq!(user_op_hash, [0x11; 32]);

    let signers = wallet.get_all_active_signers().await.unwrap();
    assert!(signers.contains(&session_signer));
}

#[tokio::test]
async fn test_session_key_management_not_supported_on_zksync() {
    let admin = personal_account(6);
    let admin_address = admin.address();

    let chain = Arc::new(StubChain { deployed: Arc::new(AtomicBool::new(true)) });
    let bundler = Arc::new(StubBundler { deployed: Arc::new(AtomicBool::new(true)) });
    let account_client = Arc::new(StubSmartAccount {
        owner: admin_address,
        wraps_messages: false,
        signers: Mutex::new(Vec::new()),
        zksync_nonce: AtomicU64::new(0),
    });

    let wallet = SmartWallet::new(
        admin,
        aa_smart_wallet::Network::ZkSync,
        280,
        Address::ZERO,
        None,
        test_config(),
        EntryPointVersion::V07,
        chain,
        account_client,
        bundler,
        SmartWalletConfig::default(),
    );

    let result = wallet.add_admin(account_address(30), 0, 3600).await;
    assert!(matches!(result, Err(aa_smart_wallet::Error::NotSupportedOnZkSync)));
    assert_eq!(wallet.address(), admin_address);
}

#[tokio::test]
async fn test_force_deploy_then_personal_sign_succeeds() {
    let owner = personal_account(7);
    let owner_address = owner.address();
    let account = account_address(12);

    let deployed = Arc::new(AtomicBool::new(false));
    let chain = Arc::new(StubChain { deployed: deployed.clone() });
    let bundler = Arc::new(StubBundler { deployed: deployed.clone() });
    let account_client = Arc::new(StubSmartAccount {
        owner: owner_address,
        wraps_messages: false,
        signers: Mutex::new(Vec::new()),
        zksync_nonce: AtomicU64::new(0),
    });

    let wallet = SmartWallet::new(
        owner,
        aa_smart_wallet::Network::Evm,
        1,
        account,
        Some((account_address(99), U256::zero())),
        test_config(),
        EntryPointVersion::V07,
        chain,
        account_client,
        bundler,
        SmartWalletConfig::default(),
    );

    assert!(!wallet.is_deployed().await.unwrap());
    wallet.force_deploy().await.unwrap();
    assert!(wallet.is_deployed().await.unwrap());

    let signature = wallet.personal_sign(b"hello").await.unwrap();
    let prefixed_hash = eth_signed_message_hash(b"hello");
    let recovered = aa_evm_signing::recover_signer(&prefixed_hash, &signature).unwrap();
    assert_eq!(recovered, owner_address);
}
