//! The smart wallet facade: a single handle over a personal signing key and
//! its associated ERC-4337 smart account (or, on ZK-Sync, over the personal
//! key directly), hiding deploy-on-first-use, ERC-1271 personal-sign
//! wrapping, and session-key/admin permission management behind one API.

use crate::abi::encode_set_permissions_for_signer;
use crate::client::{SmartAccountClient, ERC1271_MAGIC_VALUE};
use crate::error::{Error, Result};
use crate::permission::{account_domain, random_uid, AccountMessage, PermissionLevel, SignerPermissionRequest};
use crate::signer::PersonalAccount;
use crate::zksync::{encode_signed_zksync_transaction, zksync_transaction_hash};
use aa_erc4337::{
    encode_execute, AccountChainClient, ApprovalGuard, BundlerClient, Config, EntryPointVersion, PaymasterMode,
    UserOperationBuilder, UserOperationRequest, UserOperationSigner, ZkSyncTransaction, ZkTransaction,
};
use aa_evm_signing::eip712::hash_typed_data;
use aa_evm_signing::{eth_signed_message_hash, Address, Signature};
use primitive_types::U256;
use std::sync::Arc;
use std::time::Duration;

/// Which chain family the wallet is talking to: plain ERC-4337
/// (EntryPoint + bundler) or ZK-Sync's native account abstraction (no
/// separate contract-account layer, no EntryPoint).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Evm,
    ZkSync,
}

/// Tunables for the facade that sit above `aa_erc4337::Config`: how the
/// UserOp's gas gets paid for, how often the deploy-lock polls, and the
/// native-transaction gas parameters used on ZK-Sync.
pub struct SmartWalletConfig {
    pub paymaster: PaymasterMode,
    /// How long a caller racing a concurrent first-deployment waits between
    /// polls of the deploy lock. A real implementation would park on a
    /// condition variable instead of polling; this keeps the lock itself
    /// cooperative rather than a true mutex.
    pub deploy_poll_interval: Duration,
    pub zksync_gas_limit: u128,
    pub zksync_gas_per_pubdata_byte_limit: u128,
}

impl Default for SmartWalletConfig {
    fn default() -> Self {
        SmartWalletConfig {
            paymaster: PaymasterMode::None,
            deploy_poll_interval: Duration::from_secs(1),
            zksync_gas_limit: 1_000_000,
            zksync_gas_per_pubdata_byte_limit: 800,
        }
    }
}

/// A smart wallet: a personal signing key plus the ERC-4337 smart account
/// (or, on ZK-Sync, the personal account directly) it controls.
pub struct SmartWallet {
    personal: Arc<dyn PersonalAccount>,
    network: Network,
    chain_id: u64,
    account_address: Address,
    factory: Option<(Address, U256)>,
    chain: Arc<dyn AccountChainClient>,
    account_client: Arc<dyn SmartAccountClient>,
    bundler: Arc<dyn BundlerClient>,
    operation_builder: Option<UserOperationBuilder>,
    config: SmartWalletConfig,
    deploy_guard: ApprovalGuard,
}

impl SmartWallet {
    /// `account_address` is the smart account's (already-known, typically
    /// counterfactual) address; `factory` is `Some((factory, salt))` when
    /// the account may still need first-time deployment. Both are ignored
    /// on ZK-Sync, where the personal account acts for itself.
    #[allow(clippy::too_many_arguments)]
    pub fn new<P: PersonalAccount + 'static>(
        personal: Arc<P>,
        network: Network,
        chain_id: u64,
        account_address: Address,
        factory: Option<(Address, U256)>,
        op_config: Config,
        entry_point_version: EntryPointVersion,
        chain: Arc<dyn AccountChainClient>,
        account_client: Arc<dyn SmartAccountClient>,
        bundler: Arc<dyn BundlerClient>,
        config: SmartWalletConfig,
    ) -> Self {
        let operation_builder = match network {
            Network::Evm => Some(UserOperationBuilder::new(
                op_config,
                bundler.clone(),
                chain.clone(),
                entry_point_version,
                chain_id,
                personal.clone(),
            )),
            Network::ZkSync => None,
        };

        SmartWallet {
            personal,
            network,
            chain_id,
            account_address,
            factory,
            chain,
            account_client,
            bundler,
            operation_builder,
            config,
            deploy_guard: ApprovalGuard::default(),
        }
    }

    /// The wallet's address: the smart account on EVM chains, the personal
    /// account itself on ZK-Sync.
    pub fn address(&self) -> Address {
        match self.network {
            Network::Evm => self.account_address,
            Network::ZkSync => self.personal.address(),
        }
    }

    /// Whether the smart account has been deployed. Always `true` on
    /// ZK-Sync, where there's no separate contract-account layer to deploy.
    pub async fn is_deployed(&self) -> Result<bool> {
        match self.network {
            Network::ZkSync => Ok(true),
            Network::Evm => {
                let code = self.chain.get_code(self.account_address).await?;
                Ok(!code.is_empty())
            }
        }
    }

    /// Deploys the smart account immediately via a no-op UserOperation,
    /// rather than waiting for the first real transaction to carry the
    /// deployment along. A no-op on ZK-Sync and on already-deployed accounts.
    pub async fn force_deploy(&self) -> Result<()> {
        if self.is_deployed().await? {
            return Ok(());
        }
        self.send_transaction(self.address(), U256::zero(), Vec::new()).await?;
        Ok(())
    }

    /// Waits out a concurrent caller's in-flight first deployment. This is a
    /// cooperative flag, not a true mutex: two callers can still both
    /// observe `is_deployed() == false` and both attempt deployment if they
    /// race past this check at nearly the same instant.
    async fn wait_for_concurrent_deploy(&self) {
        while self.deploy_guard.is_approving() {
            tokio::time::sleep(self.config.deploy_poll_interval).await;
        }
    }

    /// Sends a single call through the smart account (EVM) or as a native
    /// ZK-Sync transaction, forwarding to `target` with `value` and `data`.
    pub async fn send_transaction(&self, target: Address, value: U256, data: Vec<u8>) -> Result<[u8; 32]> {
        match self.network {
            Network::Evm => {
                let call_data = encode_execute(target, value, &data);
                self.submit_evm_call_data(call_data).await
            }
            Network::ZkSync => self.send_zksync_transaction(target, value, data).await,
        }
    }

    async fn submit_evm_call_data(&self, call_data: Vec<u8>) -> Result<[u8; 32]> {
        let builder = self
            .operation_builder
            .as_ref()
            .expect("an Evm-network wallet always has an operation builder");

        self.wait_for_concurrent_deploy().await;
        let deployed = self.is_deployed().await?;
        let factory = if deployed {
            None
        } else {
            self.factory.map(|(factory, salt)| (factory, self.personal.address(), salt))
        };

        let _guard = factory.is_some().then(|| self.deploy_guard.enter());

        let request = UserOperationRequest {
            sender: self.account_address,
            call_data,
            factory,
            paymaster: self.config.paymaster.clone(),
        };
        Ok(builder.build_and_send(request).await?)
    }

    async fn send_zksync_transaction(&self, target: Address, value: U256, data: Vec<u8>) -> Result<[u8; 32]> {
        let nonce = self.account_client.get_zksync_nonce(self.address()).await?;
        let sponsored = matches!(self.config.paymaster, PaymasterMode::Sponsored);

        let mut tx = ZkSyncTransaction {
            from: self.personal.address(),
            to: target,
            gas_limit: self.config.zksync_gas_limit,
            gas_per_pubdata_byte_limit: self.config.zksync_gas_per_pubdata_byte_limit,
            max_fee_per_gas: 0,
            max_priority_fee_per_gas: 0,
            paymaster: Address::ZERO,
            nonce: nonce as u128,
            value: value.as_u128(),
            data: data.clone(),
            factory_deps: Vec::new(),
            paymaster_input: Vec::new(),
        };

        if sponsored {
            let probe = ZkTransaction { to: target, data, gasless: true };
            let params = self.bundler.zk_paymaster_data(&probe).await?;
            tx.paymaster = params.paymaster;
            tx.paymaster_input =
                hex::decode(params.paymaster_input.trim_start_matches("0x")).map_err(|e| Error::Chain(e.to_string()))?;
        }

        let gas_price = self.bundler.get_gas_price().await?;
        tx.max_fee_per_gas = gas_price.max_fee_per_gas;
        tx.max_priority_fee_per_gas = gas_price.max_priority_fee_per_gas;

        let hash = zksync_transaction_hash(&tx, self.chain_id);
        let signature = self.personal.sign_typed_data_hash(hash)?;
        let signed = encode_signed_zksync_transaction(&tx, &signature);
        Ok(self.bundler.zk_broadcast_transaction(&signed).await?)
    }

    /// Signs an arbitrary message on behalf of the wallet's address.
    ///
    /// On ZK-Sync this is a plain personal-sign by the underlying key. On
    /// EVM chains it follows the smart-account personal-sign dance:
    /// probe whether the account wraps messages in its own EIP-712
    /// domain (`getMessageHash`), sign accordingly, and verify the result
    /// against the account's `isValidSignature` (ERC-1271) before
    /// returning it — a signature the account itself won't accept is a
    /// bug, not a degraded result, so this fails closed.
    pub async fn personal_sign(&self, message: &[u8]) -> Result<Signature> {
        if self.network == Network::ZkSync {
            return Ok(self.personal.personal_sign(message)?);
        }

        self.wait_for_concurrent_deploy().await;
        if !self.is_deployed().await? {
            self.force_deploy().await?;
        }

        let prefixed_hash = eth_signed_message_hash(message);
        let signature = match self.account_client.get_message_hash(self.account_address, prefixed_hash).await {
            Ok(wrapped_hash) => {
                let domain = account_domain(self.chain_id, self.account_address);
                let typed_hash = hash_typed_data(&domain, &AccountMessage { message: wrapped_hash });
                self.personal.sign_typed_data_hash(typed_hash)?
            }
            Err(_) => self.personal.personal_sign(message)?,
        };

        self.verify_erc1271(prefixed_hash, &signature.to_eth_sig_bytes()).await?;
        Ok(signature)
    }

    async fn verify_erc1271(&self, hash: [u8; 32], signature: &[u8]) -> Result<()> {
        let magic = self.account_client.is_valid_signature(self.account_address, hash, signature).await?;
        if magic == ERC1271_MAGIC_VALUE {
            Ok(())
        } else {
            Err(Error::InvalidSignature)
        }
    }

    /// Grants `signer` session-key access limited to `approved_targets`,
    /// signed by this wallet's own admin key.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_session_key(
        &self,
        signer: Address,
        approved_targets: Vec<Address>,
        native_token_limit_per_tx: u128,
        permission_start: u64,
        permission_end: u64,
        req_validity_start: u64,
        req_validity_end: u64,
    ) -> Result<[u8; 32]> {
        self.set_permission(
            signer,
            PermissionLevel::Session,
            approved_targets,
            native_token_limit_per_tx,
            permission_start,
            permission_end,
            req_validity_start,
            req_validity_end,
        )
        .await
    }

    /// Promotes `signer` to admin, with no target or spend restriction.
    pub async fn add_admin(&self, signer: Address, req_validity_start: u64, req_validity_end: u64) -> Result<[u8; 32]> {
        self.set_permission(
            signer,
            PermissionLevel::Grant,
            Vec::new(),
            0,
            0,
            u64::MAX,
            req_validity_start,
            req_validity_end,
        )
        .await
    }

    /// Strips admin permissions from `signer`.
    pub async fn remove_admin(&self, signer: Address, req_validity_start: u64, req_validity_end: u64) -> Result<[u8; 32]> {
        self.set_permission(signer, PermissionLevel::Revoke, Vec::new(), 0, 0, 0, req_validity_start, req_validity_end)
            .await
    }

    /// Revokes a previously-granted session key.
    pub async fn revoke_session_key(
        &self,
        signer: Address,
        req_validity_start: u64,
        req_validity_end: u64,
    ) -> Result<[u8; 32]> {
        self.set_permission(signer, PermissionLevel::Revoke, Vec::new(), 0, 0, 0, req_validity_start, req_validity_end)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn set_permission(
        &self,
        signer: Address,
        is_admin: PermissionLevel,
        approved_targets: Vec<Address>,
        native_token_limit_per_tx: u128,
        permission_start: u64,
        permission_end: u64,
        req_validity_start: u64,
        req_validity_end: u64,
    ) -> Result<[u8; 32]> {
        if self.network == Network::ZkSync {
            return Err(Error::NotSupportedOnZkSync);
        }

        let request = SignerPermissionRequest {
            signer,
            is_admin,
            approved_targets,
            native_token_limit_per_tx,
            permission_start,
            permission_end,
            req_validity_start,
            req_validity_end,
            uid: random_uid(),
        };
        let domain = account_domain(self.chain_id, self.account_address);
        let hash = hash_typed_data(&domain, &request);
        let signature = self.personal.sign_typed_data_hash(hash)?;

        let call_data = encode_set_permissions_for_signer(&request, &signature.to_eth_sig_bytes());
        self.submit_evm_call_data(call_data).await
    }

    /// All signers currently holding admin or session-key permissions. On
    /// ZK-Sync, where there's no separate permission registry, this is just
    /// the personal account itself.
    pub async fn get_all_active_signers(&self) -> Result<Vec<Address>> {
        match self.network {
            Network::ZkSync => Ok(vec![self.personal.address()]),
            Network::Evm => self.account_client.get_all_active_signers(self.account_address).await,
        }
    }
}
