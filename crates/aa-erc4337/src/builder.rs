//! Orchestrates the common 7-step UserOperation pipeline: resolve init
//! code, pick a nonce, price gas, estimate (with an optional paymaster
//! round-trip), hash, sign, submit, and poll for a receipt.

use crate::abi::encode_create_account;
use crate::bundler::{BundlerClient, StateOverrides};
use crate::config::{Config, EntryPointVersion, NONCE_KEY_LEN};
use crate::error::{Error, Result};
use crate::packed::PackedUserOperation;
use crate::paymaster::{build_balance_override, build_max_approval_calldata, ApprovalGuard};
use crate::signer::{sign_user_operation_hash, UserOperationSigner};
use crate::user_operation::UserOperation;
use crate::v6::UserOperationV6;
use aa_evm_signing::Address;
use async_trait::async_trait;
use log::debug;
use primitive_types::U256;
use rand::RngCore;
use std::sync::Arc;

/// The on-chain reads a [`UserOperationBuilder`] needs that don't go
/// through the bundler: contract code presence and the EntryPoint's
/// per-key nonce. Swappable for the same reason `BundlerClient` is — the
/// RPC transport is out of scope, the request shapes are in scope.
#[async_trait]
pub trait AccountChainClient: Send + Sync {
    async fn get_code(&self, address: Address) -> Result<Vec<u8>>;

    async fn get_nonce(&self, entry_point: Address, sender: Address, key: U256) -> Result<U256>;
}

/// How the UserOperation's gas should be paid for.
pub enum PaymasterMode {
    /// No paymaster; the smart account pays from its own native balance.
    None,
    /// A paymaster service sponsors the operation outright
    /// (`pm_sponsorUserOperation`).
    Sponsored,
    /// An ERC-20 paymaster charges `token`; the account must pre-approve
    /// it, and estimation needs a balance-slot override so it succeeds
    /// before the account holds any real balance.
    Erc20 {
        paymaster: Address,
        token: Address,
        balance_storage_slot_index: U256,
    },
}

/// A single call the smart account should forward, plus how factory
/// deployment and paymaster sponsorship (if any) should be handled.
pub struct UserOperationRequest {
    pub sender: Address,
    pub call_data: Vec<u8>,
    /// `Some((factory, owner, salt))` if the account may need first-time
    /// deployment; the factory's `createAccount(address,uint256)` calldata
    /// is derived from `owner`/`salt` when `get_code` comes back empty.
    pub factory: Option<(Address, Address, U256)>,
    pub paymaster: PaymasterMode,
}

pub struct UserOperationBuilder {
    config: Config,
    bundler: Arc<dyn BundlerClient>,
    chain: Arc<dyn AccountChainClient>,
    entry_point_version: EntryPointVersion,
    chain_id: u64,
    signer: Arc<dyn UserOperationSigner>,
    approval_guard: ApprovalGuard,
}

impl UserOperationBuilder {
    pub fn new(
        config: Config,
        bundler: Arc<dyn BundlerClient>,
        chain: Arc<dyn AccountChainClient>,
        entry_point_version: EntryPointVersion,
        chain_id: u64,
        signer: Arc<dyn UserOperationSigner>,
    ) -> Self {
        UserOperationBuilder {
            config,
            bundler,
            chain,
            entry_point_version,
            chain_id,
            signer,
            approval_guard: ApprovalGuard::default(),
        }
    }

    fn entry_point(&self) -> Address {
        self.config.entry_point(self.entry_point_version)
    }

    /// Runs the full 7-step pipeline and returns the UserOp hash the
    /// bundler accepted. Call [`Self::wait_for_receipt`] to block for
    /// inclusion.
    pub async fn build_and_send(&self, request: UserOperationRequest) -> Result<[u8; 32]> {
        let init_code = self.resolve_init_code(&request).await?;
        let nonce = self.select_nonce(request.sender).await?;
        let gas_price = self.bundler.get_gas_price().await?;

        let mut op = self.build_dummy_user_op(&request, init_code, nonce, &gas_price)?;

        if let PaymasterMode::Erc20 { paymaster, .. } = &request.paymaster {
            if !self.approval_guard.is_approving() {
                self.ensure_paymaster_approval(&request, *paymaster).await?;
            }
        }

        if matches!(request.paymaster, PaymasterMode::Sponsored) {
            let sponsor = self.bundler.sponsor_user_operation(&op, self.entry_point()).await?;
            self.apply_sponsor_data(&mut op, &sponsor)?;
        }

        let overrides = self.state_overrides_for(&request);
        let estimate = self
            .bundler
            .estimate_user_operation_gas(&op, self.entry_point(), overrides.as_ref())
            .await?;
        self.apply_estimate(&mut op, &estimate, op.has_init_code());

        if matches!(request.paymaster, PaymasterMode::Sponsored) {
            let sponsor = self.bundler.sponsor_user_operation(&op, self.entry_point()).await?;
            self.apply_sponsor_data(&mut op, &sponsor)?;
        }

        let hash = op.hash(self.entry_point(), self.chain_id);
        let signature = sign_user_operation_hash(self.signer.as_ref(), hash)?;
        op.set_signature(signature.to_bytes().to_vec());

        debug!("submitting user operation for sender {}", request.sender);
        self.bundler.send_user_operation(&op, self.entry_point()).await
    }

    /// Polls `eth_getUserOperationReceipt` at [`Config::receipt_poll_interval`]
    /// until a receipt appears.
    pub async fn wait_for_receipt(
        &self,
        user_op_hash: [u8; 32],
    ) -> Result<crate::bundler::UserOperationReceipt> {
        loop {
            if let Some(receipt) = self.bundler.get_user_operation_receipt(user_op_hash).await? {
                return Ok(receipt);
            }
            tokio::time::sleep(self.config.receipt_poll_interval).await;
        }
    }

    async fn resolve_init_code(&self, request: &UserOperationRequest) -> Result<Vec<u8>> {
        let code = self.chain.get_code(request.sender).await?;
        if !code.is_empty() {
            return Ok(Vec::new());
        }
        match &request.factory {
            Some((factory, owner, salt)) => {
                let mut init_code = factory.as_bytes().to_vec();
                init_code.extend_from_slice(&encode_create_account(*owner, *salt));
                Ok(init_code)
            }
            None => Err(Error::NotDeployed),
        }
    }

    async fn select_nonce(&self, sender: Address) -> Result<U256> {
        let mut key_bytes = [0u8; NONCE_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key_bytes);
        let mut padded = [0u8; 32];
        padded[32 - NONCE_KEY_LEN..].copy_from_slice(&key_bytes);
        let key = U256::from_big_endian(&padded);
        self.chain.get_nonce(self.entry_point(), sender, key).await
    }

    fn build_dummy_user_op(
        &self,
        request: &UserOperationRequest,
        init_code: Vec<u8>,
        nonce: U256,
        gas_price: &crate::bundler::GasPrice,
    ) -> Result<UserOperation> {
        match self.entry_point_version {
            EntryPointVersion::V06 => {
                let mut builder = UserOperationV6::builder()
                    .sender(request.sender)
                    .nonce(nonce)
                    .init_code(init_code)
                    .call_data(request.call_data.clone())
                    .call_gas_limit(U256::zero())
                    .verification_gas_limit(U256::zero())
                    .pre_verification_gas(U256::zero())
                    .gas_fees(
                        U256::from(gas_price.max_priority_fee_per_gas),
                        U256::from(gas_price.max_fee_per_gas),
                    );
                if let PaymasterMode::Erc20 { paymaster, .. } = &request.paymaster {
                    builder = builder.paymaster(*paymaster, self.config.dummy_signature.clone());
                }
                let mut op = builder.build()?;
                op.signature = self.config.dummy_signature.clone();
                Ok(UserOperation::V6(op))
            }
            EntryPointVersion::V07 => {
                let mut builder = PackedUserOperation::builder()
                    .sender(request.sender)
                    .nonce(nonce)
                    .init_code(init_code)
                    .call_data(request.call_data.clone())
                    .account_gas_limits(0, 0)
                    .pre_verification_gas(U256::zero())
                    .gas_fees(gas_price.max_priority_fee_per_gas, gas_price.max_fee_per_gas);
                if let PaymasterMode::Erc20 { paymaster, .. } = &request.paymaster {
                    builder = builder.paymaster(*paymaster, 0, 0, self.config.dummy_signature.clone());
                }
                let mut op = builder.build()?;
                op.signature = self.config.dummy_signature.clone();
                Ok(UserOperation::V7(op))
            }
        }
    }

    fn state_overrides_for(&self, request: &UserOperationRequest) -> Option<StateOverrides> {
        match &request.paymaster {
            PaymasterMode::Erc20 {
                token,
                balance_storage_slot_index,
                ..
            } => Some(build_balance_override(*token, request.sender, *balance_storage_slot_index)),
            _ => None,
        }
    }

    fn apply_estimate(&self, op: &mut UserOperation, estimate: &crate::bundler::GasEstimate, not_deployed: bool) {
        let padding = if not_deployed {
            self.config.call_gas_padding(self.entry_point_version)
        } else {
            0
        };
        match op {
            UserOperation::V6(v6) => {
                v6.call_gas_limit = U256::from(estimate.call_gas_limit + padding);
                v6.verification_gas_limit = U256::from(estimate.verification_gas_limit);
                v6.pre_verification_gas = U256::from(estimate.pre_verification_gas);
            }
            UserOperation::V7(v7) => {
                v7.account_gas_limits = PackedUserOperation::pack_gas_limits(
                    estimate.verification_gas_limit,
                    estimate.call_gas_limit + padding,
                );
                v7.pre_verification_gas = U256::from(estimate.pre_verification_gas);
            }
        }
    }

    fn apply_sponsor_data(&self, op: &mut UserOperation, sponsor: &crate::bundler::PaymasterData) -> Result<()> {
        match op {
            UserOperation::V6(v6) => {
                if let Some(full) = &sponsor.paymaster_and_data {
                    let stripped = full.strip_prefix("0x").unwrap_or(full);
                    v6.paymaster_and_data =
                        hex::decode(stripped).map_err(|e| Error::Bundler(format!("invalid paymasterAndData hex: {e}")))?;
                } else {
                    let data = sponsor
                        .paymaster_data
                        .strip_prefix("0x")
                        .unwrap_or(&sponsor.paymaster_data);
                    let mut blob = sponsor.paymaster.as_bytes().to_vec();
                    blob.extend(hex::decode(data).map_err(|e| Error::Bundler(format!("invalid paymasterData hex: {e}")))?);
                    v6.paymaster_and_data = blob;
                }
            }
            UserOperation::V7(v7) => {
                let data = sponsor
                    .paymaster_data
                    .strip_prefix("0x")
                    .unwrap_or(&sponsor.paymaster_data);
                let mut blob = sponsor.paymaster.as_bytes().to_vec();
                blob.extend_from_slice(&sponsor.paymaster_verification_gas_limit.unwrap_or(0).to_be_bytes());
                blob.extend_from_slice(&sponsor.paymaster_post_op_gas_limit.unwrap_or(0).to_be_bytes());
                blob.extend(hex::decode(data).map_err(|e| Error::Bundler(format!("invalid paymasterData hex: {e}")))?);
                v7.paymaster_and_data = blob;
            }
        }
        Ok(())
    }

    /// Sends a one-off `approve(paymaster, 2^96-1)` UserOp before the real
    /// operation, guarded so the approval's own `build_and_send` call
    /// doesn't recurse back into approval.
    async fn ensure_paymaster_approval(&self, request: &UserOperationRequest, paymaster: Address) -> Result<()> {
        let _guard = self.approval_guard.enter();
        let approval_request = UserOperationRequest {
            sender: request.sender,
            call_data: build_max_approval_calldata(paymaster),
            factory: request.factory.clone(),
            paymaster: PaymasterMode::None,
        };
        let hash = self.build_and_send(approval_request).await?;
        self.wait_for_receipt(hash).await?;
        Ok(())
    }
}

impl Clone for PaymasterMode {
    fn clone(&self) -> Self {
        match self {
            PaymasterMode::None => PaymasterMode::None,
            PaymasterMode::Sponsored => PaymasterMode::Sponsored,
            PaymasterMode::Erc20 {
                paymaster,
                token,
                balance_storage_slot_index,
            } => PaymasterMode::Erc20 {
                paymaster: *paymaster,
                token: *token,
                balance_storage_slot_index: *balance_storage_slot_index,
            },
        }
    }
}
