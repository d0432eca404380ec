//! At-rest encryption of secret payloads.
//!
//! Values are sealed with AES-256-GCM. Every value gets a fresh random
//! 12-byte nonce which is stored in front of the ciphertext:
//!
//! ```text
//! nonce (12 bytes) || ciphertext || tag (16 bytes)
//! ```

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::config::ENCRYPTION_KEY_LEN;
use crate::error::{MigrateError, Result};

/// Length of the nonce prefix.
pub const NONCE_LEN: usize = 12;

/// Authenticated cipher for secret values.
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    /// # Errors
    ///
    /// Returns [`MigrateError::KeySize`] unless `key` is exactly 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != ENCRYPTION_KEY_LEN {
            return Err(MigrateError::KeySize(key.len()));
        }
        let cipher =
            Aes256Gcm::new_from_slice(key).map_err(|_| MigrateError::KeySize(key.len()))?;
        Ok(Self { cipher })
    }

    /// Seal `plaintext` under a new random nonce.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| MigrateError::Cipher(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    /// Open a value produced by [`encrypt`](Self::encrypt).
    ///
    /// Fails if the input is shorter than a nonce or was altered.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() < NONCE_LEN {
            return Err(MigrateError::Cipher("malformed ciphertext".to_string()));
        }
        let (nonce, sealed) = data.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|e| MigrateError::Cipher(e.to_string()))
    }
}

impl std::fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretCipher(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; 32] = b"fb4b4d6267c8a5ce8231f8b186dbca92";

    #[test]
    fn test_round_trip() {
        let cipher = SecretCipher::new(KEY).unwrap();
        let sealed = cipher.encrypt(b"correct-horse-battery-staple").unwrap();

        assert_ne!(&sealed[NONCE_LEN..], b"correct-horse-battery-staple");
        assert_eq!(
            cipher.decrypt(&sealed).unwrap(),
            b"correct-horse-battery-staple"
        );
    }

    #[test]
    fn test_fresh_nonce_per_value() {
        let cipher = SecretCipher::new(KEY).unwrap();
        let a = cipher.encrypt(b"same").unwrap();
        let b = cipher.encrypt(b"same").unwrap();
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
    }

    #[test]
    fn test_tampering_detected() {
        let cipher = SecretCipher::new(KEY).unwrap();
        let sealed = cipher.encrypt(b"hunter2").unwrap();

        for idx in [0, NONCE_LEN, sealed.len() - 1] {
            let mut altered = sealed.clone();
            altered[idx] ^= 0x01;
            assert!(matches!(
                cipher.decrypt(&altered),
                Err(MigrateError::Cipher(_))
            ));
        }
        assert!(cipher.decrypt(&sealed[..4]).is_err());
    }

    #[test]
    fn test_wrong_key_size() {
        for len in [0, 16, 31, 33] {
            let key = vec![7u8; len];
            match SecretCipher::new(&key) {
                Err(MigrateError::KeySize(n)) => assert_eq!(n, len),
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }
}
