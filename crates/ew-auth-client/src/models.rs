//! Request/response shapes for the auth server surface.

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// The kind of identity challenge being verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpKind {
    Email,
    Phone,
}

/// Result of completing an OTP/OAuth identity challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResult {
    pub is_new_user: bool,
    pub auth_token: String,
    pub wallet_user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Wallet enrollment status as reported by the server.
///
/// The wire representation is a raw status string; unrecognized values are
/// a hard `ServerProtocol` error rather than a silently-defaulted variant
/// (see `DESIGN.md`'s Open Question resolution — the source swallowed this
/// case, this reimplementation does not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletStatus {
    LoggedOut,
    LoggedInUninitialized,
    LoggedInInitialized,
}

impl WalletStatus {
    pub fn from_wire(status: &str) -> Result<Self, Error> {
        match status {
            "logged_out" => Ok(WalletStatus::LoggedOut),
            "logged_in_uninitialized" => Ok(WalletStatus::LoggedInUninitialized),
            "logged_in_initialized" => Ok(WalletStatus::LoggedInInitialized),
            other => Err(Error::ServerProtocol(format!(
                "unrecognized wallet status: {other}"
            ))),
        }
    }
}

/// Raw wire shape of `FetchUserDetails`'s response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWalletWire {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub auth_provider: String,
}

/// `FetchUserDetails` response, with `status` already validated into a
/// typed [`WalletStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWallet {
    pub status: WalletStatus,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: String,
}

impl TryFrom<UserWalletWire> for UserWallet {
    type Error = Error;

    fn try_from(wire: UserWalletWire) -> Result<Self, Error> {
        Ok(UserWallet {
            status: WalletStatus::from_wire(&wire.status)?,
            email: wire.email,
            phone: wire.phone,
            auth_provider: wire.auth_provider,
        })
    }
}

/// `FetchAuthAndRecoveryShares` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthAndRecoveryShares {
    pub auth_share: String,
    pub encrypted_recovery_share: String,
}

/// `FetchSiwePayload` response: the message the client must sign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiwePayload {
    pub message: String,
    pub nonce: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_status_known_values() {
        assert_eq!(
            WalletStatus::from_wire("logged_out").unwrap(),
            WalletStatus::LoggedOut
        );
        assert_eq!(
            WalletStatus::from_wire("logged_in_uninitialized").unwrap(),
            WalletStatus::LoggedInUninitialized
        );
        assert_eq!(
            WalletStatus::from_wire("logged_in_initialized").unwrap(),
            WalletStatus::LoggedInInitialized
        );
    }

    #[test]
    fn test_wallet_status_unknown_value_is_server_protocol_error() {
        let result = WalletStatus::from_wire("something_new");
        assert!(matches!(result, Err(Error::ServerProtocol(_))));
    }

    #[test]
    fn test_user_wallet_wire_conversion() {
        let wire = UserWalletWire {
            status: "logged_in_initialized".to_string(),
            email: Some("a@b.com".to_string()),
            phone: None,
            auth_provider: "otp".to_string(),
        };
        let wallet: UserWallet = wire.try_into().unwrap();
        assert_eq!(wallet.status, WalletStatus::LoggedInInitialized);
        assert_eq!(wallet.email.as_deref(), Some("a@b.com"));
    }
}
