//! The enrollment/recovery/re-login state machine over the local envelope
//! and the auth server's reported wallet status.

use crate::error::{Error, Result};
use crate::models::User;
use crate::secret::{derive_private_key, random_secret};
use aa_evm_signing::PrivateKeyAccount;
use ew_auth_client::{AuthServerClient, VerifyResult, WalletStatus};
use ew_shamir::{Share, ShareId};
use ew_store::{Envelope, EnvelopeStore};
use log::{debug, warn};
use std::sync::{Arc, Mutex};

/// Drives share acquisition/assembly against the auth server and local
/// store, and memoizes the assembled account for the lifetime of the
/// session.
///
/// Not safe for concurrent calls from multiple threads on the same
/// instance; callers serialize (see spec's concurrency model — this
/// mirrors `aa-erc4337`'s builder in that respect).
pub struct EmbeddedWalletCore {
    auth: Arc<dyn AuthServerClient>,
    store: Arc<dyn EnvelopeStore + Send + Sync>,
    /// Replaces the server-provided recovery code for both encrypt and
    /// decrypt when the developer, not the end user, holds the code.
    recovery_code_override: Option<String>,
    user: Mutex<Option<Arc<User>>>,
}

impl EmbeddedWalletCore {
    pub fn new(
        auth: Arc<dyn AuthServerClient>,
        store: Arc<dyn EnvelopeStore + Send + Sync>,
        recovery_code_override: Option<String>,
    ) -> Self {
        EmbeddedWalletCore {
            auth,
            store,
            recovery_code_override,
            user: Mutex::new(None),
        }
    }

    /// Completes enrollment or recovery after an identity challenge
    /// (OTP/OAuth/SIWE) has already produced a [`VerifyResult`].
    pub async fn complete_identity(&self, verify: VerifyResult, auth_provider: &str) -> Result<Arc<User>> {
        let user = if verify.is_new_user {
            debug!("enrollment: creating new account for wallet_user_id={}", verify.wallet_user_id);
            self.create_account(&verify, auth_provider).await?
        } else {
            debug!("recovery: reconstructing account for wallet_user_id={}", verify.wallet_user_id);
            self.recover_account(&verify, auth_provider).await?
        };

        let user = Arc::new(user);
        *self.user.lock().unwrap() = Some(user.clone());
        Ok(user)
    }

    async fn create_account(&self, verify: &VerifyResult, auth_provider: &str) -> Result<User> {
        let secret = random_secret();
        let (auth_share, device_share, recovery_share) = ew_shamir::split(&secret);

        let private_key = derive_private_key(&secret);
        let account = PrivateKeyAccount::from_private_key(&private_key)?;
        let address = account.address();

        let recovery_code = self.resolve_recovery_code(&verify.recovery_code)?;
        let encrypted_recovery_share = ew_shamir::encrypt_share(&recovery_share, recovery_code)?;

        self.auth
            .store_address_and_shares(
                &verify.auth_token,
                &address.to_checksum_string(),
                &auth_share.to_string(),
                &encrypted_recovery_share,
            )
            .await?;

        self.persist_envelope(verify, auth_provider, &device_share)?;

        debug!("enrollment complete: address={address:?}");
        Ok(User {
            account,
            email: verify.email.clone(),
            phone: verify.phone.clone(),
        })
    }

    async fn recover_account(&self, verify: &VerifyResult, auth_provider: &str) -> Result<User> {
        let shares = self.auth.fetch_auth_and_recovery_shares(&verify.auth_token).await?;
        let auth_share: Share = shares.auth_share.parse()?;

        let recovery_code = self.resolve_recovery_code(&verify.recovery_code)?;
        let recovery_share = ew_shamir::decrypt_share(&shares.encrypted_recovery_share, recovery_code)?;

        let secret = ew_shamir::combine(&auth_share, &recovery_share)?;
        let device_share = ew_shamir::new_share(ShareId::Device, &auth_share, &recovery_share)?;

        let private_key = derive_private_key(&secret);
        let account = PrivateKeyAccount::from_private_key(&private_key)?;

        self.persist_envelope(verify, auth_provider, &device_share)?;

        debug!("recovery complete: address={:?}", account.address());
        Ok(User {
            account,
            email: verify.email.clone(),
            phone: verify.phone.clone(),
        })
    }

    fn persist_envelope(&self, verify: &VerifyResult, auth_provider: &str, device_share: &Share) -> Result<()> {
        let mut envelope = Envelope::new(
            verify.auth_token.clone(),
            device_share.to_string(),
            verify.wallet_user_id.clone(),
            auth_provider,
        );
        if let Some(email) = &verify.email {
            envelope = envelope.with_email(email.clone());
        }
        if let Some(phone) = &verify.phone {
            envelope = envelope.with_phone(phone.clone());
        }
        self.store.save(&envelope)?;
        Ok(())
    }

    fn resolve_recovery_code<'a>(&'a self, server_provided: &'a Option<String>) -> Result<&'a str> {
        self.recovery_code_override
            .as_deref()
            .or(server_provided.as_deref())
            .ok_or_else(|| Error::ServerProtocol("no recovery code available from server or override".to_string()))
    }

    /// `GetUser(email?, phone?, authProvider)`. Never implicitly
    /// re-authenticates: refusal modes are hard errors.
    pub async fn get_user(&self, email: Option<&str>, phone: Option<&str>, auth_provider: &str) -> Result<Arc<User>> {
        if let Some(user) = self.user.lock().unwrap().clone() {
            return Ok(user);
        }

        let envelope = self.store.load()?.ok_or(Error::NotSignedIn)?;

        let wallet = self.auth.fetch_user_details(&envelope.auth_token).await?;

        match wallet.status {
            WalletStatus::LoggedOut => {
                warn!("server reports logged out; clearing local envelope");
                self.store.clear()?;
                return Err(Error::NotSignedIn);
            }
            WalletStatus::LoggedInUninitialized => {
                return Err(Error::WalletUninitialized);
            }
            WalletStatus::LoggedInInitialized => {
                if envelope.device_share.is_empty() {
                    return Err(Error::WalletUninitialized);
                }
            }
        }

        if let Some(expected) = email {
            if wallet.email.as_deref() != Some(expected) {
                return Err(Error::IdentityMismatch);
            }
        }
        if let Some(expected) = phone {
            if wallet.phone.as_deref() != Some(expected) {
                return Err(Error::IdentityMismatch);
            }
        }
        if wallet.auth_provider != auth_provider {
            return Err(Error::IdentityMismatch);
        }

        let auth_share_text = self.auth.fetch_auth_share(&envelope.auth_token).await?;
        let auth_share: Share = auth_share_text.parse()?;
        let device_share: Share = envelope.device_share.parse()?;

        let secret = ew_shamir::combine(&device_share, &auth_share)?;
        let private_key = derive_private_key(&secret);
        let account = PrivateKeyAccount::from_private_key(&private_key)?;

        debug!("re-login assembled account: address={:?}", account.address());

        let user = Arc::new(User {
            account,
            email: envelope.email.clone(),
            phone: envelope.phone.clone(),
        });
        *self.user.lock().unwrap() = Some(user.clone());
        Ok(user)
    }

    /// Drops the memoized user and deletes the auth token from
    /// persistence. Leaving the device share behind is acceptable — it is
    /// useless without a token.
    pub fn sign_out(&self) -> Result<()> {
        *self.user.lock().unwrap() = None;
        self.store.remove_auth_token()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ew_auth_client::{AuthAndRecoveryShares, OtpKind, SiwePayload, UserWallet};
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    struct StubAuth {
        shares: StdMutex<HashMap<String, (String, String)>>,
        wallet: StdMutex<HashMap<String, UserWallet>>,
        auth_shares_by_token: StdMutex<HashMap<String, String>>,
    }

    impl StubAuth {
        fn new() -> Self {
            StubAuth {
                shares: StdMutex::new(HashMap::new()),
                wallet: StdMutex::new(HashMap::new()),
                auth_shares_by_token: StdMutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl AuthServerClient for StubAuth {
        async fn verify_otp(&self, _kind: OtpKind, _id: &str, _code: &str) -> ew_auth_client::Result<VerifyResult> {
            unimplemented!("identity flow happens outside the core")
        }

        async fn fetch_user_details(&self, token: &str) -> ew_auth_client::Result<UserWallet> {
            self.wallet
                .lock()
                .unwrap()
                .get(token)
                .cloned()
                .ok_or(ew_auth_client::Error::Unauthorized)
        }

        async fn store_address_and_shares(
            &self,
            token: &str,
            _address: &str,
            auth_share: &str,
            encrypted_recovery_share: &str,
        ) -> ew_auth_client::Result<()> {
            self.shares.lock().unwrap().insert(
                token.to_string(),
                (auth_share.to_string(), encrypted_recovery_share.to_string()),
            );
            self.auth_shares_by_token
                .lock()
                .unwrap()
                .insert(token.to_string(), auth_share.to_string());
            Ok(())
        }

        async fn fetch_auth_and_recovery_shares(&self, token: &str) -> ew_auth_client::Result<AuthAndRecoveryShares> {
            let shares = self.shares.lock().unwrap();
            let (auth_share, encrypted_recovery_share) = shares.get(token).cloned().ok_or(ew_auth_client::Error::NotFound)?;
            Ok(AuthAndRecoveryShares {
                auth_share,
                encrypted_recovery_share,
            })
        }

        async fn fetch_auth_share(&self, token: &str) -> ew_auth_client::Result<String> {
            self.auth_shares_by_token
                .lock()
                .unwrap()
                .get(token)
                .cloned()
                .ok_or(ew_auth_client::Error::NotFound)
        }

        async fn fetch_siwe_payload(&self, _address: &str) -> ew_auth_client::Result<SiwePayload> {
            unimplemented!()
        }

        async fn verify_siwe(&self, _address: &str, _signature: &str, _nonce: &str) -> ew_auth_client::Result<VerifyResult> {
            unimplemented!()
        }
    }

    struct InMemoryStore {
        envelope: StdMutex<Option<Envelope>>,
    }

    impl InMemoryStore {
        fn new() -> Self {
            InMemoryStore { envelope: StdMutex::new(None) }
        }
    }

    impl EnvelopeStore for InMemoryStore {
        fn load(&self) -> ew_store::Result<Option<Envelope>> {
            Ok(self.envelope.lock().unwrap().clone())
        }

        fn save(&self, envelope: &Envelope) -> ew_store::Result<()> {
            *self.envelope.lock().unwrap() = Some(envelope.clone());
            Ok(())
        }

        fn remove_auth_token(&self) -> ew_store::Result<()> {
            if let Some(envelope) = self.envelope.lock().unwrap().as_mut() {
                envelope.auth_token = String::new();
            }
            Ok(())
        }

        fn clear(&self) -> ew_store::Result<()> {
            *self.envelope.lock().unwrap() = None;
            Ok(())
        }
    }

    fn new_user_verify_result() -> VerifyResult {
        VerifyResult {
            is_new_user: true,
            auth_token: "token-1".to_string(),
            wallet_user_id: "user-1".to_string(),
            recovery_code: Some("hunter2".to_string()),
            email: Some("a@b.com".to_string()),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_enrollment_then_get_user_reuses_memoized_account() {
        let auth = Arc::new(StubAuth::new());
        let store: Arc<dyn EnvelopeStore + Send + Sync> = Arc::new(InMemoryStore::new());
        let core = EmbeddedWalletCore::new(auth.clone(), store, None);

        let enrolled = core.complete_identity(new_user_verify_result(), "otp").await.unwrap();
        let address = enrolled.account.address();

        let fetched = core.get_user(Some("a@b.com"), None, "otp").await.unwrap();
        assert_eq!(fetched.account.address(), address);
    }

    #[tokio::test]
    async fn test_re_login_after_enrollment_reconstructs_same_address() {
        let auth = Arc::new(StubAuth::new());
        let store: Arc<dyn EnvelopeStore + Send + Sync> = Arc::new(InMemoryStore::new());
        let core = EmbeddedWalletCore::new(auth.clone(), store.clone(), None);

        let enrolled = core.complete_identity(new_user_verify_result(), "otp").await.unwrap();
        let address = enrolled.account.address();

        auth.wallet.lock().unwrap().insert(
            "token-1".to_string(),
            UserWallet {
                status: WalletStatus::LoggedInInitialized,
                email: Some("a@b.com".to_string()),
                phone: None,
                auth_provider: "otp".to_string(),
            },
        );

        // Fresh core instance: no memoized user, must re-login from the envelope.
        let fresh_core = EmbeddedWalletCore::new(auth, store, None);
        let relogged_in = fresh_core.get_user(Some("a@b.com"), None, "otp").await.unwrap();
        assert_eq!(relogged_in.account.address(), address);
    }

    #[tokio::test]
    async fn test_identity_mismatch_on_wrong_email() {
        let auth = Arc::new(StubAuth::new());
        let store: Arc<dyn EnvelopeStore + Send + Sync> = Arc::new(InMemoryStore::new());
        let core = EmbeddedWalletCore::new(auth.clone(), store.clone(), None);
        core.complete_identity(new_user_verify_result(), "otp").await.unwrap();

        auth.wallet.lock().unwrap().insert(
            "token-1".to_string(),
            UserWallet {
                status: WalletStatus::LoggedInInitialized,
                email: Some("a@b.com".to_string()),
                phone: None,
                auth_provider: "otp".to_string(),
            },
        );

        let fresh_core = EmbeddedWalletCore::new(auth, store, None);
        let result = fresh_core.get_user(Some("wrong@b.com"), None, "otp").await;
        assert!(matches!(result, Err(Error::IdentityMismatch)));
    }

    #[tokio::test]
    async fn test_get_user_without_envelope_is_not_signed_in() {
        let auth = Arc::new(StubAuth::new());
        let store: Arc<dyn EnvelopeStore + Send + Sync> = Arc::new(InMemoryStore::new());
        let core = EmbeddedWalletCore::new(auth, store, None);

        let result = core.get_user(None, None, "otp").await;
        assert!(matches!(result, Err(Error::NotSignedIn)));
    }

    #[tokio::test]
    async fn test_logged_out_status_clears_envelope() {
        let auth = Arc::new(StubAuth::new());
        let store: Arc<dyn EnvelopeStore + Send + Sync> = Arc::new(InMemoryStore::new());
        let core = EmbeddedWalletCore::new(auth.clone(), store.clone(), None);
        core.complete_identity(new_user_verify_result(), "otp").await.unwrap();

        auth.wallet.lock().unwrap().insert(
            "token-1".to_string(),
            UserWallet {
                status: WalletStatus::LoggedOut,
                email: None,
                phone: None,
                auth_provider: "otp".to_string(),
            },
        );

        let fresh_core = EmbeddedWalletCore::new(auth, store.clone(), None);
        let result = fresh_core.get_user(None, None, "otp").await;
        assert!(matches!(result, Err(Error::NotSignedIn)));
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_drops_memoized_user_and_clears_token() {
        let auth = Arc::new(StubAuth::new());
        let store: Arc<dyn EnvelopeStore + Send + Sync> = Arc::new(InMemoryStore::new());
        let core = EmbeddedWalletCore::new(auth, store.clone(), None);
        core.complete_identity(new_user_verify_result(), "otp").await.unwrap();

        core.sign_out().unwrap();

        let envelope = store.load().unwrap().unwrap();
        assert_eq!(envelope.auth_token, "");
        assert!(!envelope.device_share.is_empty());

        let result = core.get_user(None, None, "otp").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_recovery_code_override_used_instead_of_server_code() {
        let auth = Arc::new(StubAuth::new());
        let store: Arc<dyn EnvelopeStore + Send + Sync> = Arc::new(InMemoryStore::new());
        let core = EmbeddedWalletCore::new(auth.clone(), store, Some("developer-code".to_string()));

        let mut verify = new_user_verify_result();
        verify.recovery_code = None; // server did not supply one; override must be used
        let result = core.complete_identity(verify, "otp").await;
        assert!(result.is_ok());
    }
}
