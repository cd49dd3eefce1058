use mobility_core::crypto::{hash_secret, verify_secret, FieldCipher, FieldKey};
use mobility_core::MobilityError;

const SAMPLES: &[&str] = &["", "a", "Anna de Vries", "a@x.com", "+31-6-12345678", "Ünïcødé ✓"];

#[test]
fn test_field_encryption_round_trips_and_is_non_deterministic() {
    let cipher = FieldCipher::new(FieldKey::generate());
    for sample in SAMPLES {
        let first = cipher.encrypt_field(sample).expect("encrypt should succeed");
        let second = cipher.encrypt_field(sample).expect("encrypt should succeed");
        assert_ne!(first, second, "ciphertexts for {:?} must differ", sample);
        assert_eq!(cipher.decrypt_field(&first).expect("decrypt should succeed"), *sample);
        assert_eq!(cipher.decrypt_field(&second).expect("decrypt should succeed"), *sample);
    }
}

#[test]
fn test_foreign_key_cannot_decrypt() {
    let cipher = FieldCipher::new(FieldKey::generate());
    let other = FieldCipher::new(FieldKey::generate());
    let ciphertext = cipher.encrypt_field("secret").expect("encrypt should succeed");
    assert!(matches!(
        other.decrypt_field(&ciphertext),
        Err(MobilityError::Decryption(_))
    ));
}

#[test]
fn test_secret_hashing_properties() {
    for secret in ["Str0ng!Password", "ABCD-EFGH-JKLM"] {
        let first = hash_secret(secret).expect("hash should succeed");
        let second = hash_secret(secret).expect("hash should succeed");
        assert_ne!(first, second);
        assert!(verify_secret(secret, &first));
        assert!(verify_secret(secret, &second));
        assert!(!verify_secret(&format!("{}x", secret), &first));
        assert!(!verify_secret("", &first));
    }
}

#[test]
fn test_missing_key_file_is_key_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let err = FieldCipher::load(&dir.path().join("absent.key")).unwrap_err();
    assert!(matches!(err, MobilityError::KeyUnavailable(_)));
}

#[test]
fn test_key_written_then_loaded_decrypts_old_ciphertext() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("field.key");
    let key = FieldKey::generate();
    key.write_new(&path).expect("key should be written");

    let ciphertext = FieldCipher::new(key)
        .encrypt_field("Anna")
        .expect("encrypt should succeed");
    let reloaded = FieldCipher::load(&path).expect("key should load");
    assert_eq!(reloaded.decrypt_field(&ciphertext).expect("decrypt should succeed"), "Anna");
}
