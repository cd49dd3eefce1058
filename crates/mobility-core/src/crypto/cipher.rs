//! Field-level encryption.
//!
//! Each sensitive column value is encrypted on its own with Age to the
//! installation's X25519 recipient. Output is binary and stored as a BLOB.

use std::io::{Read, Write};
use std::iter;

use age::x25519::Recipient;

use crate::crypto::key::FieldKey;
use crate::error::{MobilityError, Result};

/// Encrypts and decrypts individual fields under the process-wide key.
///
/// Constructed once at startup and passed by reference to everything that
/// touches encrypted columns.
#[derive(Clone)]
pub struct FieldCipher {
    key: FieldKey,
    recipient: Recipient,
}

impl FieldCipher {
    pub fn new(key: FieldKey) -> Self {
        let recipient = key.recipient();
        Self { key, recipient }
    }

    /// Load the key file and build a cipher from it.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        Ok(Self::new(FieldKey::load(path)?))
    }

    /// Encrypt a text field.
    ///
    /// Two calls with the same plaintext return different ciphertexts.
    pub fn encrypt_field(&self, plaintext: &str) -> Result<Vec<u8>> {
        self.encrypt_bytes(plaintext.as_bytes())
    }

    /// Decrypt a text field.
    ///
    /// # Errors
    ///
    /// Returns `MobilityError::Decryption` if the ciphertext is corrupt, was
    /// produced under another key, or does not hold UTF-8 text.
    pub fn decrypt_field(&self, ciphertext: &[u8]) -> Result<String> {
        let bytes = self.decrypt_bytes(ciphertext)?;
        String::from_utf8(bytes)
            .map_err(|_| MobilityError::Decryption("Field is not valid UTF-8".to_string()))
    }

    pub fn encrypt_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let encryptor =
            age::Encryptor::with_recipients(iter::once(&self.recipient as &dyn age::Recipient))
                .map_err(|e| MobilityError::Crypto(format!("Failed to create encryptor: {}", e)))?;

        let mut encrypted = Vec::with_capacity(data.len() + 256);
        let mut writer = encryptor
            .wrap_output(&mut encrypted)
            .map_err(|e| MobilityError::Crypto(format!("Failed to create encryptor: {}", e)))?;
        writer
            .write_all(data)
            .map_err(|e| MobilityError::Crypto(format!("Encryption write failed: {}", e)))?;
        writer
            .finish()
            .map_err(|e| MobilityError::Crypto(format!("Encryption finish failed: {}", e)))?;

        Ok(encrypted)
    }

    pub fn decrypt_bytes(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let decryptor = age::Decryptor::new(ciphertext)
            .map_err(|e| MobilityError::Decryption(format!("Malformed ciphertext: {}", e)))?;

        let mut reader = decryptor
            .decrypt(iter::once(self.key.identity() as &dyn age::Identity))
            .map_err(|e| match e {
                age::DecryptError::NoMatchingKeys => {
                    MobilityError::Decryption("Ciphertext was encrypted under another key".to_string())
                }
                other => MobilityError::Decryption(other.to_string()),
            })?;

        let mut decrypted = Vec::new();
        reader
            .read_to_end(&mut decrypted)
            .map_err(|e| MobilityError::Decryption(format!("Failed to read plaintext: {}", e)))?;

        Ok(decrypted)
    }

    /// Encrypt an optional field, keeping absence as absence.
    pub fn encrypt_optional(&self, plaintext: Option<&str>) -> Result<Option<Vec<u8>>> {
        plaintext.map(|value| self.encrypt_field(value)).transpose()
    }

    /// Decrypt an optional field, keeping absence as absence.
    pub fn decrypt_optional(&self, ciphertext: Option<&[u8]>) -> Result<Option<String>> {
        ciphertext.map(|value| self.decrypt_field(value)).transpose()
    }
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher")
            .field("recipient", &self.recipient.to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> FieldCipher {
        FieldCipher::new(FieldKey::generate())
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let cipher = cipher();
        let encrypted = cipher.encrypt_field("jan.de.vries@example.nl").unwrap();
        assert_eq!(
            cipher.decrypt_field(&encrypted).unwrap(),
            "jan.de.vries@example.nl"
        );
    }

    #[test]
    fn test_same_plaintext_different_ciphertext() {
        let cipher = cipher();
        let first = cipher.encrypt_field("Rotterdam").unwrap();
        let second = cipher.encrypt_field("Rotterdam").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_ciphertext_does_not_contain_plaintext() {
        let cipher = cipher();
        let encrypted = cipher.encrypt_field("VeryDistinctiveSurname").unwrap();
        let needle = b"VeryDistinctiveSurname";
        assert!(!encrypted.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn test_empty_field_round_trip() {
        let cipher = cipher();
        let encrypted = cipher.encrypt_field("").unwrap();
        assert_eq!(cipher.decrypt_field(&encrypted).unwrap(), "");
    }

    #[test]
    fn test_foreign_key_fails_decryption() {
        let encrypted = cipher().encrypt_field("secret").unwrap();
        let result = cipher().decrypt_field(&encrypted);
        assert!(matches!(result, Err(MobilityError::Decryption(_))));
    }

    #[test]
    fn test_corrupted_ciphertext_fails_decryption() {
        let cipher = cipher();
        let mut encrypted = cipher.encrypt_field("secret data").unwrap();
        let last = encrypted.len() - 1;
        encrypted[last] ^= 0xFF;
        assert!(matches!(
            cipher.decrypt_field(&encrypted),
            Err(MobilityError::Decryption(_))
        ));
    }

    #[test]
    fn test_garbage_fails_decryption() {
        let result = cipher().decrypt_field(b"definitely not age");
        assert!(matches!(result, Err(MobilityError::Decryption(_))));
    }

    #[test]
    fn test_optional_fields_preserve_absence() {
        let cipher = cipher();
        assert!(cipher.encrypt_optional(None).unwrap().is_none());
        let sealed = cipher.encrypt_optional(Some("x")).unwrap();
        assert_eq!(
            cipher.decrypt_optional(sealed.as_deref()).unwrap().as_deref(),
            Some("x")
        );
    }
}
