//! Cryptographic primitives for Mobility.
//!
//! Two well-audited building blocks, used as black boxes:
//! - **Age** (X25519 recipient): authenticated, non-deterministic encryption
//!   of individual fields and of whole backup artifacts
//! - **Argon2id**: salted, adaptive one-way hashing of passwords and
//!   single-use codes
//!
//! ## Security Model
//!
//! - One field key per installation, loaded once at startup from a
//!   owner-only file; failure to load is fatal
//! - Every encryption uses a fresh ephemeral key and nonce, so equal
//!   plaintexts never produce equal ciphertexts
//! - Secrets are stored only as PHC hash strings with a per-call salt
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the database file or backup artifacts
//! - Correlating encrypted columns by equality
//!
//! We do NOT defend against:
//! - Theft of the key file together with the database
//! - Compromised OS / access to a running session

pub mod cipher;
pub mod key;
pub mod secret;

pub use cipher::FieldCipher;
pub use key::FieldKey;
pub use secret::{
    generate_restore_code, generate_temporary_password, hash_secret, normalize_code,
    verify_secret,
};
