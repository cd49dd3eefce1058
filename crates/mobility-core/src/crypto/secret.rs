//! Salted hashing of passwords and single-use codes.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$...`) that embed their
//! own random salt and parameters, so verification needs nothing else.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::error::{MobilityError, Result};

/// Salt length in bytes.
const SALT_LENGTH: usize = 16;

/// Alphabet for restore codes: upper-case letters and digits without the
/// easily confused `0`, `O`, `1`, `I`.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Number of significant characters in a restore code.
const CODE_LENGTH: usize = 12;

/// Characters per dash-separated group when a code is displayed.
const CODE_GROUP: usize = 4;

const TEMP_PASSWORD_LENGTH: usize = 16;
const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const DIGITS: &[u8] = b"23456789";
const SYMBOLS: &[u8] = b"~!@#$%&_-+=";

/// Hash a secret with a fresh random salt.
///
/// Hashing the same secret twice yields two different strings.
pub fn hash_secret(secret: &str) -> Result<String> {
    let mut salt_bytes = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| MobilityError::Crypto(format!("Failed to encode salt: {}", e)))?;

    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| MobilityError::Crypto(format!("Hashing failed: {}", e)))
}

/// Check a secret against a stored hash.
///
/// A malformed hash never verifies.
pub fn verify_secret(secret: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Generate a human-enterable restore code such as `K7QD-M3XA-9PLT`.
pub fn generate_restore_code() -> String {
    let mut rng = OsRng;
    let chars: Vec<char> = (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    chars
        .chunks(CODE_GROUP)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

/// Canonical form of an entered code: upper case, separators and spaces removed.
///
/// Codes are hashed and verified in this form so `k7qd m3xa 9plt` matches.
pub fn normalize_code(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Generate a temporary password that satisfies the password policy.
pub fn generate_temporary_password() -> String {
    let mut rng = OsRng;
    let mut chars: Vec<u8> = vec![
        LOWER[rng.gen_range(0..LOWER.len())],
        UPPER[rng.gen_range(0..UPPER.len())],
        DIGITS[rng.gen_range(0..DIGITS.len())],
        SYMBOLS[rng.gen_range(0..SYMBOLS.len())],
    ];
    let pool: Vec<u8> = [LOWER, UPPER, DIGITS, SYMBOLS].concat();
    while chars.len() < TEMP_PASSWORD_LENGTH {
        chars.push(pool[rng.gen_range(0..pool.len())]);
    }
    chars.shuffle(&mut rng);
    chars.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::validate;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_secret("Correct-Horse-42!").unwrap();
        assert!(verify_secret("Correct-Horse-42!", &hash));
        assert!(!verify_secret("correct-horse-42!", &hash));
    }

    #[test]
    fn test_same_secret_different_hashes() {
        let first = hash_secret("same secret").unwrap();
        let second = hash_secret("same secret").unwrap();
        assert_ne!(first, second);
        assert!(verify_secret("same secret", &first));
        assert!(verify_secret("same secret", &second));
    }

    #[test]
    fn test_hash_is_argon2id_phc() {
        let hash = hash_secret("secret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("secret"));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_secret("secret", "not a hash"));
        assert!(!verify_secret("secret", ""));
    }

    #[test]
    fn test_restore_code_shape() {
        let code = generate_restore_code();
        assert_eq!(code.len(), 14);
        let groups: Vec<&str> = code.split('-').collect();
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.len() == 4));
        assert!(normalize_code(&code)
            .bytes()
            .all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_restore_codes_differ() {
        assert_ne!(generate_restore_code(), generate_restore_code());
    }

    #[test]
    fn test_normalize_code_ignores_case_and_separators() {
        assert_eq!(normalize_code("k7qd-m3xa 9plt"), "K7QDM3XA9PLT");
        assert_eq!(normalize_code(" K7QD M3XA-9PLT\n"), "K7QDM3XA9PLT");
    }

    #[test]
    fn test_temporary_password_meets_policy() {
        for _ in 0..20 {
            let password = generate_temporary_password();
            assert!(validate::password(&password).is_ok(), "{}", password);
        }
    }
}
