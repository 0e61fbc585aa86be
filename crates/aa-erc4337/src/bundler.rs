//! The bundler/paymaster JSON-RPC surface the builder consumes.
//!
//! Swappable for the same reason `ew-auth-client`'s `AuthServerClient` is:
//! the HTTP transport is an out-of-scope external collaborator, but the
//! request/response shapes are the in-scope, fully-typed contract.

use crate::error::{Error, Result};
use crate::user_operation::UserOperation;
use aa_evm_signing::Address;
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// A single account's storage-slot overrides for `eth_estimateUserOperationGas`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StateOverride {
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub state_diff: HashMap<String, String>,
}

pub type StateOverrides = HashMap<Address, StateOverride>;

#[derive(Debug, Clone, Deserialize)]
pub struct GasPrice {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GasEstimate {
    pub pre_verification_gas: u128,
    pub verification_gas_limit: u128,
    pub call_gas_limit: u128,
    #[serde(default)]
    pub paymaster_verification_gas_limit: Option<u128>,
    #[serde(default)]
    pub paymaster_post_op_gas_limit: Option<u128>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymasterData {
    pub paymaster: Address,
    #[serde(default)]
    pub paymaster_data: String,
    #[serde(default)]
    pub paymaster_verification_gas_limit: Option<u128>,
    #[serde(default)]
    pub paymaster_post_op_gas_limit: Option<u128>,
    /// v0.6 wants the whole `paymasterAndData` blob pre-concatenated.
    #[serde(default)]
    pub paymaster_and_data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserOperationReceipt {
    pub user_op_hash: String,
    pub transaction_hash: String,
    pub success: bool,
}

#[derive(Debug, Clone)]
pub struct ZkTransaction {
    pub to: Address,
    pub data: Vec<u8>,
    pub gasless: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZkPaymasterParams {
    pub paymaster: Address,
    pub paymaster_input: String,
}

/// The bundler/paymaster RPC surface consumed by [`crate::builder::UserOperationBuilder`].
#[async_trait]
pub trait BundlerClient: Send + Sync {
    async fn send_user_operation(&self, op: &UserOperation, entry_point: Address) -> Result<[u8; 32]>;

    async fn estimate_user_operation_gas(
        &self,
        op: &UserOperation,
        entry_point: Address,
        state_overrides: Option<&StateOverrides>,
    ) -> Result<GasEstimate>;

    async fn get_user_operation_receipt(&self, user_op_hash: [u8; 32]) -> Result<Option<UserOperationReceipt>>;

    async fn get_gas_price(&self) -> Result<GasPrice>;

    async fn sponsor_user_operation(&self, op: &UserOperation, entry_point: Address) -> Result<PaymasterData>;

    async fn zk_paymaster_data(&self, tx: &ZkTransaction) -> Result<ZkPaymasterParams>;

    async fn zk_broadcast_transaction(&self, signed_tx: &[u8]) -> Result<[u8; 32]>;
}

/// Default `BundlerClient` implementation over a JSON-RPC endpoint.
pub struct JsonRpcBundlerClient {
    http: reqwest::Client,
    endpoint: String,
}

impl JsonRpcBundlerClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        JsonRpcBundlerClient {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        debug!("bundler rpc call: {method}");
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let envelope: Value = resp
            .json()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if let Some(err) = envelope.get("error") {
            warn!("bundler rpc error on {method}: {err}");
            return Err(Error::Bundler(err.to_string()));
        }

        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| Error::Bundler(format!("{method}: missing result field")))
    }
}

#[async_trait]
impl BundlerClient for JsonRpcBundlerClient {
    async fn send_user_operation(&self, op: &UserOperation, entry_point: Address) -> Result<[u8; 32]> {
        let result = self
            .call("eth_sendUserOperation", json!([user_op_to_wire(op), entry_point.to_checksum_string()]))
            .await?;
        let hex_str = result.as_str().ok_or_else(|| Error::Bundler("expected hex hash".to_string()))?;
        parse_hash(hex_str)
    }

    async fn estimate_user_operation_gas(
        &self,
        op: &UserOperation,
        entry_point: Address,
        state_overrides: Option<&StateOverrides>,
    ) -> Result<GasEstimate> {
        let mut params = vec![json!(user_op_to_wire(op)), json!(entry_point.to_checksum_string())];
        if let Some(overrides) = state_overrides {
            params.push(json!(overrides
                .iter()
                .map(|(addr, o)| (addr.to_checksum_string(), o.clone()))
                .collect::<HashMap<_, _>>()));
        }
        let result = self.call("eth_estimateUserOperationGas", json!(params)).await?;
        serde_json::from_value(result).map_err(Error::Json)
    }

    async fn get_user_operation_receipt(&self, user_op_hash: [u8; 32]) -> Result<Option<UserOperationReceipt>> {
        let result = self
            .call("eth_getUserOperationReceipt", json!([format!("0x{}", hex::encode(user_op_hash))]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(result).map(Some).map_err(Error::Json)
    }

    async fn get_gas_price(&self) -> Result<GasPrice> {
        let result = self.call("thirdweb_getUserOperationGasPrice", json!([])).await?;
        serde_json::from_value(result).map_err(Error::Json)
    }

    async fn sponsor_user_operation(&self, op: &UserOperation, entry_point: Address) -> Result<PaymasterData> {
        let result = self
            .call("pm_sponsorUserOperation", json!([user_op_to_wire(op), entry_point.to_checksum_string()]))
            .await?;
        serde_json::from_value(result).map_err(Error::Json)
    }

    async fn zk_paymaster_data(&self, tx: &ZkTransaction) -> Result<ZkPaymasterParams> {
        let result = self
            .call(
                "zk_paymasterData",
                json!([{
                    "to": tx.to.to_checksum_string(),
                    "data": format!("0x{}", hex::encode(&tx.data)),
                    "gasless": tx.gasless,
                }]),
            )
            .await?;
        serde_json::from_value(result).map_err(Error::Json)
    }

    async fn zk_broadcast_transaction(&self, signed_tx: &[u8]) -> Result<[u8; 32]> {
        let result = self
            .call("zk_broadcastTransaction", json!([format!("0x{}", hex::encode(signed_tx))]))
            .await?;
        let hex_str = result.as_str().ok_or_else(|| Error::Bundler("expected hex hash".to_string()))?;
        parse_hash(hex_str)
    }
}

fn parse_hash(hex_str: &str) -> Result<[u8; 32]> {
    let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    let bytes = hex::decode(stripped).map_err(|e| Error::Bundler(format!("invalid hash hex: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| Error::Bundler("hash was not 32 bytes".to_string()))
}

/// Hexifies a [`UserOperation`] into the field-named JSON shape bundlers expect.
fn user_op_to_wire(op: &UserOperation) -> Value {
    match op {
        UserOperation::V6(op) => json!({
            "sender": op.sender.to_checksum_string(),
            "nonce": format!("0x{:x}", op.nonce),
            "initCode": format!("0x{}", hex::encode(&op.init_code)),
            "callData": format!("0x{}", hex::encode(&op.call_data)),
            "callGasLimit": format!("0x{:x}", op.call_gas_limit),
            "verificationGasLimit": format!("0x{:x}", op.verification_gas_limit),
            "preVerificationGas": format!("0x{:x}", op.pre_verification_gas),
            "maxFeePerGas": format!("0x{:x}", op.max_fee_per_gas),
            "maxPriorityFeePerGas": format!("0x{:x}", op.max_priority_fee_per_gas),
            "paymasterAndData": format!("0x{}", hex::encode(&op.paymaster_and_data)),
            "signature": format!("0x{}", hex::encode(&op.signature)),
        }),
        UserOperation::V7(op) => json!({
            "sender": op.sender.to_checksum_string(),
            "nonce": format!("0x{:x}", op.nonce),
            "initCode": format!("0x{}", hex::encode(&op.init_code)),
            "callData": format!("0x{}", hex::encode(&op.call_data)),
            "accountGasLimits": format!("0x{}", hex::encode(op.account_gas_limits)),
            "preVerificationGas": format!("0x{:x}", op.pre_verification_gas),
            "gasFees": format!("0x{}", hex::encode(op.gas_fees)),
            "paymasterAndData": format!("0x{}", hex::encode(&op.paymaster_and_data)),
            "signature": format!("0x{}", hex::encode(&op.signature)),
        }),
    }
}
