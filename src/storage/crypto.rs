//! Secret encryption for values stored at rest.
//!
//! Uses AES-256-GCM. The key lives next to the collections in a file with
//! owner-only permissions; ciphertext is `nonce || ciphertext`, base64 encoded.

use std::path::Path;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::types::{AppError, AppResult};

const NONCE_SIZE: usize = 12;

pub struct SecretCipher {
    key: [u8; 32],
}

impl SecretCipher {
    /// Read the key at `key_path`, generating one if missing or malformed
    pub async fn load_or_create(key_path: &Path) -> AppResult<Self> {
        if fs::try_exists(key_path).await? {
            let key_data = fs::read(key_path).await?;
            if let Ok(key_bytes) = BASE64.decode(&key_data) {
                if key_bytes.len() == 32 {
                    let mut key = [0u8; 32];
                    key.copy_from_slice(&key_bytes);
                    return Ok(Self { key });
                }
            }
            warn!(
                path = ?key_path,
                "Encryption key file is malformed, regenerating; existing secrets can no longer be decrypted"
            );
            fs::remove_file(key_path).await?;
        }

        let key: [u8; 32] = rand::random();
        write_key_file(key_path, BASE64.encode(key).as_bytes()).await?;

        info!("Generated new encryption key for stored secrets");
        Ok(Self { key })
    }

    pub fn encrypt(&self, plaintext: &str) -> AppResult<String> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| AppError::Crypto(e.to_string()))?;
        let nonce_bytes: [u8; NONCE_SIZE] = rand::random();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| AppError::Crypto(format!("Encryption failed: {}", e)))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend(ciphertext);
        Ok(BASE64.encode(&combined))
    }

    pub fn decrypt(&self, encrypted: &str) -> AppResult<String> {
        let combined = BASE64
            .decode(encrypted)
            .map_err(|e| AppError::Crypto(e.to_string()))?;
        if combined.len() < NONCE_SIZE {
            return Err(AppError::Crypto("Invalid encrypted data".to_string()));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| AppError::Crypto(e.to_string()))?;
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| AppError::Crypto(format!("Decryption failed: {}", e)))?;

        String::from_utf8(plaintext).map_err(|e| AppError::Crypto(e.to_string()))
    }
}

/// Create the key file owner-only from the start
async fn write_key_file(path: &Path, contents: &[u8]) -> AppResult<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    Ok(())
}
