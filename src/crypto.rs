//! Envelope encryption for Plaid access tokens at rest.
//!
//! Stateless: every call derives a fresh key from the configured password
//! (PBKDF2-HMAC-SHA256, random salt) and encrypts under AES-256-GCM with a
//! random nonce. The payload is `hex(salt):hex(nonce):hex(ciphertext)`.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
const PBKDF2_ROUNDS: u32 = 150_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Cannot encrypt empty string")]
    EmptyPlaintext,
    #[error("Cannot decrypt empty string")]
    EmptyPayload,
    #[error("Failed to encrypt data")]
    EncryptFailed,
    /// Covers tampering, a wrong password, and malformed payloads alike.
    #[error("Failed to decrypt data")]
    DecryptFailed,
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
    key
}

pub fn encrypt(plaintext: &str, password: &str) -> Result<String, CryptoError> {
    if plaintext.is_empty() {
        return Err(CryptoError::EmptyPlaintext);
    }

    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::EncryptFailed)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| CryptoError::EncryptFailed)?;

    Ok(format!(
        "{}:{}:{}",
        hex::encode(salt),
        hex::encode(nonce),
        hex::encode(ciphertext)
    ))
}

pub fn decrypt(payload: &str, password: &str) -> Result<String, CryptoError> {
    if payload.is_empty() {
        return Err(CryptoError::EmptyPayload);
    }

    let parts: Vec<&str> = payload.split(':').collect();
    if parts.len() != 3 {
        return Err(CryptoError::DecryptFailed);
    }
    let salt = hex::decode(parts[0]).map_err(|_| CryptoError::DecryptFailed)?;
    let nonce = hex::decode(parts[1]).map_err(|_| CryptoError::DecryptFailed)?;
    let ciphertext = hex::decode(parts[2]).map_err(|_| CryptoError::DecryptFailed)?;
    if salt.len() != SALT_LEN || nonce.len() != NONCE_LEN {
        return Err(CryptoError::DecryptFailed);
    }

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::DecryptFailed)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
        .map_err(|_| CryptoError::DecryptFailed)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PW: &str = "correct-horse-battery-staple";

    #[test]
    fn roundtrip() {
        let payload = encrypt("access-sandbox-1234", PW).unwrap();
        assert_eq!(decrypt(&payload, PW).unwrap(), "access-sandbox-1234");
    }

    #[test]
    fn two_encryptions_differ_but_both_decrypt() {
        let a = encrypt("same input", PW).unwrap();
        let b = encrypt("same input", PW).unwrap();
        assert_ne!(a, b);
        assert_eq!(decrypt(&a, PW).unwrap(), "same input");
        assert_eq!(decrypt(&b, PW).unwrap(), "same input");
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let payload = encrypt("secret", PW).unwrap();
        let mut chars: Vec<char> = payload.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == '0' { '1' } else { '0' };
        let tampered: String = chars.into_iter().collect();
        assert_eq!(decrypt(&tampered, PW), Err(CryptoError::DecryptFailed));
    }

    #[test]
    fn wrong_password_fails() {
        let payload = encrypt("secret", PW).unwrap();
        assert_eq!(decrypt(&payload, "nope"), Err(CryptoError::DecryptFailed));
    }

    #[test]
    fn malformed_payload_fails() {
        assert_eq!(decrypt("not-a-payload", PW), Err(CryptoError::DecryptFailed));
        assert_eq!(decrypt("aa:bb", PW), Err(CryptoError::DecryptFailed));
        assert_eq!(decrypt("zz:zz:zz", PW), Err(CryptoError::DecryptFailed));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert_eq!(encrypt("", PW), Err(CryptoError::EmptyPlaintext));
        assert_eq!(decrypt("", PW), Err(CryptoError::EmptyPayload));
    }
}
