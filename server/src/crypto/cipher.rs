//! Passphrase-keyed AES-128-GCM for credential fields stored at rest.
//!
//! Key derivation: MD5(passphrase) -> 128-bit AES key
//! Encryption: AES-128-GCM with random 12-byte nonce, no associated data
//! Wire format: nonce (12 bytes) || ciphertext (includes 16-byte GCM tag)
//!
//! MD5 is a fast digest, not a password hash. Anyone able to guess the
//! passphrase can derive the key offline. Stored user passwords are keyed by
//! the user's own name, which is neither secret nor immutable: renaming a user
//! makes the stored envelope undecryptable.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes128Gcm, Key, KeyInit, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use md5::{Digest, Md5};
use rand::Rng;
use thiserror::Error;

/// AES-128 key length in bytes.
pub const KEY_LEN: usize = 16;

/// GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("Passphrase must not be empty")]
    EmptyPassphrase,

    #[error("Encryption failed")]
    Seal,

    /// Wrong passphrase, tampered envelope and truncated envelope all land
    /// here; callers cannot tell them apart.
    #[error("Decryption failed")]
    Authentication,
}

/// Key material derived from a passphrase. Recomputed on every call and
/// never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    fn cipher(&self) -> Aes128Gcm {
        Aes128Gcm::new(&Key::<Aes128Gcm>::from(self.0))
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Derive the AES-128 key for a passphrase. Deterministic.
pub fn derive_key(passphrase: &str) -> DerivedKey {
    let digest = Md5::digest(passphrase.as_bytes());
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&digest);
    DerivedKey(key)
}

/// Encrypt `plaintext` under the key derived from `passphrase`.
///
/// Returns `nonce (12 bytes) || ciphertext (includes 16-byte GCM tag)`.
/// A fresh nonce is drawn from the thread-local CSPRNG for every call.
pub fn encrypt(plaintext: &[u8], passphrase: &str) -> Result<Vec<u8>, CipherError> {
    if passphrase.is_empty() {
        return Err(CipherError::EmptyPassphrase);
    }
    let cipher = derive_key(passphrase).cipher();
    let nonce_bytes: [u8; NONCE_LEN] = rand::rng().random();
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CipherError::Seal)?;

    let mut envelope = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    envelope.extend_from_slice(&nonce_bytes);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Decrypt an envelope produced by [`encrypt`] with the same passphrase.
pub fn decrypt(envelope: &[u8], passphrase: &str) -> Result<Vec<u8>, CipherError> {
    if passphrase.is_empty() {
        return Err(CipherError::EmptyPassphrase);
    }
    let cipher = derive_key(passphrase).cipher();
    if envelope.len() < NONCE_LEN + TAG_LEN {
        return Err(CipherError::Authentication);
    }
    let (nonce, ciphertext) = envelope.split_at(NONCE_LEN);
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CipherError::Authentication)
}

/// Seal `plaintext` into the base64 form persisted in document fields.
pub fn seal_stored(plaintext: &[u8], passphrase: &str) -> Result<String, CipherError> {
    encrypt(plaintext, passphrase).map(|envelope| BASE64.encode(envelope))
}

/// Open a value produced by [`seal_stored`]. Undecodable base64 fails the
/// same way as a tampered envelope.
pub fn open_stored(stored: &str, passphrase: &str) -> Result<Vec<u8>, CipherError> {
    let envelope = BASE64
        .decode(stored)
        .map_err(|_| CipherError::Authentication)?;
    decrypt(&envelope, passphrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_hunter2() {
        let envelope = encrypt(b"hunter2", "alice").unwrap();
        assert_eq!(envelope.len(), NONCE_LEN + b"hunter2".len() + TAG_LEN);

        let plaintext = decrypt(&envelope, "alice").unwrap();
        assert_eq!(plaintext, b"hunter2");
    }

    #[test]
    fn test_roundtrip_various_payloads() {
        let payloads: [&[u8]; 4] = [b"", b"x", &[0u8; 1024], "pässwörd ✓".as_bytes()];
        for (i, payload) in payloads.iter().enumerate() {
            let passphrase = format!("user-{}", i);
            let envelope = encrypt(payload, &passphrase).unwrap();
            assert_eq!(decrypt(&envelope, &passphrase).unwrap(), *payload);
        }
    }

    #[test]
    fn test_wrong_passphrase_fails() {
        let envelope = encrypt(b"hunter2", "alice").unwrap();
        assert_eq!(decrypt(&envelope, "bob"), Err(CipherError::Authentication));
    }

    #[test]
    fn test_every_single_bit_flip_is_detected() {
        let envelope = encrypt(b"correct horse battery staple", "alice").unwrap();
        for byte in 0..envelope.len() {
            for bit in 0..8 {
                let mut tampered = envelope.clone();
                tampered[byte] ^= 1 << bit;
                assert_eq!(
                    decrypt(&tampered, "alice"),
                    Err(CipherError::Authentication),
                    "flip at byte {} bit {} was accepted",
                    byte,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let a = encrypt(b"hunter2", "alice").unwrap();
        let b = encrypt(b"hunter2", "alice").unwrap();
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
        assert_ne!(a[NONCE_LEN..], b[NONCE_LEN..]);
    }

    #[test]
    fn test_truncated_envelope_fails_like_wrong_key() {
        let envelope = encrypt(b"hunter2", "alice").unwrap();
        for len in [0, 5, NONCE_LEN, NONCE_LEN + TAG_LEN - 1] {
            assert_eq!(
                decrypt(&envelope[..len], "alice"),
                Err(CipherError::Authentication)
            );
        }
        assert_eq!(
            decrypt(&envelope[..envelope.len() - 1], "alice"),
            Err(CipherError::Authentication)
        );
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        assert_eq!(encrypt(b"hunter2", ""), Err(CipherError::EmptyPassphrase));
        assert_eq!(decrypt(&[0u8; 40], ""), Err(CipherError::EmptyPassphrase));
    }

    #[test]
    fn test_derive_key_deterministic() {
        assert_eq!(derive_key("alice"), derive_key("alice"));
        assert_ne!(derive_key("alice"), derive_key("bob"));
    }

    #[test]
    fn test_derive_key_is_md5() {
        // RFC 1321 test vector: MD5("abc")
        assert_eq!(
            derive_key("abc").as_bytes(),
            &[
                0x90, 0x01, 0x50, 0x98, 0x3c, 0xd2, 0x4f, 0xb0, 0xd6, 0x96, 0x3f, 0x7d, 0x28, 0xe1,
                0x7f, 0x72
            ]
        );
    }

    #[test]
    fn test_stored_form_roundtrip() {
        let stored = seal_stored(b"hunter2", "alice").unwrap();
        assert_ne!(stored, "hunter2");
        assert_eq!(open_stored(&stored, "alice").unwrap(), b"hunter2");
        assert_eq!(open_stored(&stored, "bob"), Err(CipherError::Authentication));
    }

    #[test]
    fn test_stored_form_rejects_bad_base64() {
        assert_eq!(
            open_stored("!!not base64!!", "alice"),
            Err(CipherError::Authentication)
        );
    }

    #[test]
    fn test_stored_form_keyed_by_exact_passphrase() {
        // A renamed user can no longer open the envelope sealed under the old name.
        let stored = seal_stored(b"hunter2", "alice").unwrap();
        assert_eq!(
            open_stored(&stored, "alicia"),
            Err(CipherError::Authentication)
        );
    }
}
