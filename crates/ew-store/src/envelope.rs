//! The local session envelope: the only long-lived client state.
//!
//! Written at enrollment/recovery, cleared on sign-out. Schema is a stable
//! JSON document (forward-compatible additive evolution only); fields here
//! MUST NOT be removed or repurposed across versions.

use serde::{Deserialize, Serialize};

/// The authenticated session's local envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub auth_token: String,
    pub device_share: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phone: Option<String>,
    pub wallet_user_id: String,
    pub auth_provider: String,
}

impl Envelope {
    pub fn new(
        auth_token: impl Into<String>,
        device_share: impl Into<String>,
        wallet_user_id: impl Into<String>,
        auth_provider: impl Into<String>,
    ) -> Self {
        Envelope {
            auth_token: auth_token.into(),
            device_share: device_share.into(),
            email: None,
            phone: None,
            wallet_user_id: wallet_user_id.into(),
            auth_provider: auth_provider.into(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}
