//! The `AuthServerClient` trait and its default `reqwest`-backed
//! implementation.

use crate::error::{Error, Result};
use crate::models::{
    AuthAndRecoveryShares, OtpKind, SiwePayload, UserWallet, UserWalletWire, VerifyResult,
};
use async_trait::async_trait;
use log::debug;
use serde_json::json;

/// The auth server's typed request/response surface consumed by the
/// embedded wallet core. Otherwise an adapter: it exposes no concurrency
/// state of its own.
#[async_trait]
pub trait AuthServerClient: Send + Sync {
    async fn verify_otp(&self, kind: OtpKind, id: &str, code: &str) -> Result<VerifyResult>;

    async fn fetch_user_details(&self, token: &str) -> Result<UserWallet>;

    async fn store_address_and_shares(
        &self,
        token: &str,
        address: &str,
        auth_share: &str,
        encrypted_recovery_share: &str,
    ) -> Result<()>;

    async fn fetch_auth_and_recovery_shares(&self, token: &str) -> Result<AuthAndRecoveryShares>;

    async fn fetch_auth_share(&self, token: &str) -> Result<String>;

    async fn fetch_siwe_payload(&self, address: &str) -> Result<SiwePayload>;

    async fn verify_siwe(&self, address: &str, signature: &str, nonce: &str) -> Result<VerifyResult>;
}

/// Default `AuthServerClient` implementation over `reqwest` + `tokio`.
pub struct ReqwestAuthServerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestAuthServerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        ReqwestAuthServerClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(status_to_error(status, &text));
        }

        serde_json::from_str(&text)
            .map_err(|e| Error::ServerProtocol(format!("failed to parse response: {e}")))
    }
}

fn status_to_error(status: reqwest::StatusCode, body: &str) -> Error {
    match status.as_u16() {
        401 => Error::Unauthorized,
        404 => Error::NotFound,
        409 => Error::Conflict,
        429 => Error::Throttled,
        _ => Error::ServerProtocol(format!("HTTP {status}: {body}")),
    }
}

#[async_trait]
impl AuthServerClient for ReqwestAuthServerClient {
    async fn verify_otp(&self, kind: OtpKind, id: &str, code: &str) -> Result<VerifyResult> {
        debug!("verify_otp: kind={kind:?}");
        let resp = self
            .http
            .post(self.url("/v1/auth/verify-otp"))
            .json(&json!({ "kind": kind, "id": id, "code": code }))
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        self.parse_json(resp).await
    }

    async fn fetch_user_details(&self, token: &str) -> Result<UserWallet> {
        debug!("fetch_user_details");
        let resp = self
            .http
            .get(self.url("/v1/user"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        let wire: UserWalletWire = self.parse_json(resp).await?;
        wire.try_into()
    }

    async fn store_address_and_shares(
        &self,
        token: &str,
        address: &str,
        auth_share: &str,
        encrypted_recovery_share: &str,
    ) -> Result<()> {
        debug!("store_address_and_shares");
        let resp = self
            .http
            .post(self.url("/v1/wallet/enroll"))
            .bearer_auth(token)
            .json(&json!({
                "address": address,
                "authShare": auth_share,
                "encryptedRecoveryShare": encrypted_recovery_share,
            }))
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &text));
        }
        Ok(())
    }

    async fn fetch_auth_and_recovery_shares(&self, token: &str) -> Result<AuthAndRecoveryShares> {
        debug!("fetch_auth_and_recovery_shares");
        let resp = self
            .http
            .get(self.url("/v1/wallet/recovery-shares"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        self.parse_json(resp).await
    }

    async fn fetch_auth_share(&self, token: &str) -> Result<String> {
        debug!("fetch_auth_share");
        let resp = self
            .http
            .get(self.url("/v1/wallet/auth-share"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        let value: serde_json::Value = self.parse_json(resp).await?;
        value
            .get("authShare")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| Error::ServerProtocol("missing authShare field".to_string()))
    }

    async fn fetch_siwe_payload(&self, address: &str) -> Result<SiwePayload> {
        debug!("fetch_siwe_payload");
        let resp = self
            .http
            .get(self.url("/v1/auth/siwe/payload"))
            .query(&[("address", address)])
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        self.parse_json(resp).await
    }

    async fn verify_siwe(&self, address: &str, signature: &str, nonce: &str) -> Result<VerifyResult> {
        debug!("verify_siwe");
        let resp = self
            .http
            .post(self.url("/v1/auth/siwe/verify"))
            .json(&json!({ "address": address, "signature": signature, "nonce": nonce }))
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        self.parse_json(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_to_error_mapping() {
        assert!(matches!(
            status_to_error(reqwest::StatusCode::UNAUTHORIZED, ""),
            Error::Unauthorized
        ));
        assert!(matches!(
            status_to_error(reqwest::StatusCode::NOT_FOUND, ""),
            Error::NotFound
        ));
        assert!(matches!(
            status_to_error(reqwest::StatusCode::CONFLICT, ""),
            Error::Conflict
        ));
        assert!(matches!(
            status_to_error(reqwest::StatusCode::TOO_MANY_REQUESTS, ""),
            Error::Throttled
        ));
    }

    #[test]
    fn test_client_constructs_urls_against_base() {
        let client = ReqwestAuthServerClient::new("https://auth.example.com");
        assert_eq!(
            client.url("/v1/user"),
            "https://auth.example.com/v1/user"
        );
    }
}
