//! AES-256-GCM wrap/unwrap of a share's textual encoding under a
//! PBKDF2-derived key from the user's recovery code.

use crate::error::{Error, Result};
use crate::share::Share;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use pbkdf2::pbkdf2_hmac_array;
use sha2::Sha256;

const PBKDF2_ROUNDS: u32 = 210_000;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Fixed application-level salt for deriving the AES key from a recovery
/// code. Pinned here in the absence of a published server contract; see
/// `DESIGN.md` for the Open Question decision.
const RECOVERY_KDF_SALT: &[u8] = b"ew-shamir/recovery-share/v1";

fn derive_key(code: &str) -> Key<Aes256Gcm> {
    let key_bytes = pbkdf2_hmac_array::<Sha256, 32>(code.as_bytes(), RECOVERY_KDF_SALT, PBKDF2_ROUNDS);
    Key::<Aes256Gcm>::from(key_bytes)
}

/// `EncryptShare(share, code)`: AES-256-GCM-wraps the share's textual
/// encoding, output `base64url(nonce(12) || ciphertext || tag(16))`.
pub fn encrypt_share(share: &Share, code: &str) -> Result<String> {
    let key = derive_key(code);
    let cipher = Aes256Gcm::new(&key);
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let plaintext = share.to_string();
    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| Error::MalformedEnvelope(e.to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);

    Ok(URL_SAFE_NO_PAD.encode(blob))
}

/// `DecryptShare(blob, code)`: inverse of [`encrypt_share`]. Fails with
/// [`Error::WrongRecoveryCode`] on GCM tag mismatch.
pub fn decrypt_share(blob: &str, code: &str) -> Result<Share> {
    let raw = URL_SAFE_NO_PAD
        .decode(blob)
        .map_err(|e| Error::MalformedEnvelope(e.to_string()))?;

    if raw.len() < NONCE_LEN + TAG_LEN {
        return Err(Error::MalformedEnvelope(format!(
            "envelope too short: {} bytes",
            raw.len()
        )));
    }

    let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let key = derive_key(code);
    let cipher = Aes256Gcm::new(&key);

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| Error::WrongRecoveryCode)?;

    let text = String::from_utf8(plaintext)
        .map_err(|e| Error::ShareCorrupt(format!("decrypted share is not UTF-8: {e}")))?;

    text.parse()
}
