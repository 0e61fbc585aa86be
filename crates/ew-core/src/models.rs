//! The assembled user account: a signing key reconstructed from two shares,
//! held in process memory only for the lifetime of the session.

use aa_evm_signing::PrivateKeyAccount;

/// A signed-in user's account, plus whatever contact identity the server
/// associates with it.
///
/// Lives only in memory; nothing here is ever serialized to the local
/// store. Dropped (and the wrapped private key zeroized) on `sign_out`.
pub struct User {
    pub account: PrivateKeyAccount,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("address", &self.account.address())
            .field("email", &self.email)
            .field("phone", &self.phone)
            .finish()
    }
}
