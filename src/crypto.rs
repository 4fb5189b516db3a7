use aes_gcm::aead::{Aead, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, KeyInit, Nonce};

use crate::error::{OrchestratorError, Result};

/// Wrapping format version. The version byte leads every ciphertext so a
/// future key rotation can dispatch on it.
const WRAP_VERSION: u8 = 1;
const NONCE_LEN: usize = 12;

/// Symmetric authenticated encryption for `api_hash` and Telegram session
/// blobs. Plaintext only ever lives in memory; the store never logs it.
#[derive(Clone)]
pub struct CredentialStore {
    cipher: Aes256Gcm,
}

impl CredentialStore {
    /// Build from the raw 32-byte key (already base64-decoded by `Config`).
    pub fn new(key: &[u8]) -> Result<Self> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| OrchestratorError::Internal("encryption key must be 32 bytes".into()))?;
        Ok(Self { cipher })
    }

    /// `wrap(plain) -> [version][nonce][ciphertext]`.
    pub fn wrap(&self, plain: &[u8]) -> Result<Vec<u8>> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ct = self
            .cipher
            .encrypt(&nonce, plain)
            .map_err(|_| OrchestratorError::Internal("credential encryption failed".into()))?;

        let mut out = Vec::with_capacity(1 + NONCE_LEN + ct.len());
        out.push(WRAP_VERSION);
        out.extend_from_slice(nonce.as_slice());
        out.extend_from_slice(&ct);
        Ok(out)
    }

    /// Inverse of `wrap`. Fails with `CredentialDecrypt` on tamper, a wrong
    /// key, or an unknown version byte.
    pub fn unwrap(&self, wrapped: &[u8]) -> Result<Vec<u8>> {
        if wrapped.len() < 1 + NONCE_LEN || wrapped[0] != WRAP_VERSION {
            return Err(OrchestratorError::CredentialDecrypt);
        }
        let nonce = Nonce::from_slice(&wrapped[1..1 + NONCE_LEN]);
        self.cipher
            .decrypt(nonce, &wrapped[1 + NONCE_LEN..])
            .map_err(|_| OrchestratorError::CredentialDecrypt)
    }

    /// Convenience for string secrets such as `api_hash`.
    pub fn wrap_str(&self, plain: &str) -> Result<Vec<u8>> {
        self.wrap(plain.as_bytes())
    }

    pub fn unwrap_str(&self, wrapped: &[u8]) -> Result<String> {
        let plain = self.unwrap(wrapped)?;
        String::from_utf8(plain).map_err(|_| OrchestratorError::CredentialDecrypt)
    }
}
