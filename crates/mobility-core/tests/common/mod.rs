#![allow(dead_code)]

use mobility_core::config::SuperAdminConfig;
use mobility_core::crypto::{hash_secret, FieldKey};
use mobility_core::model::{NewScooter, NewTraveller, NewUser};
use mobility_core::{Actor, Role, Vault, VaultConfig};
use tempfile::TempDir;

pub const SUPER_USERNAME: &str = "super_admin";
pub const SUPER_PASSWORD: &str = "Admin_123?";
pub const PASSWORD: &str = "Str0ng!Password";

/// A vault in a fresh temp directory with a freshly generated key.
///
/// Keep the `TempDir` alive for as long as the vault is used.
pub fn vault() -> (TempDir, Vault) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let config = VaultConfig::new(
        dir.path(),
        dir.path().join("field.key"),
        SuperAdminConfig {
            username: SUPER_USERNAME.to_string(),
            password_hash: hash_secret(SUPER_PASSWORD).expect("hash should succeed"),
        },
    );
    let vault = Vault::with_key(config, FieldKey::generate()).expect("vault should open");
    (dir, vault)
}

/// Create a stored identity through the built-in super identity.
pub fn user(vault: &Vault, username: &str, role: Role) -> Actor {
    let created = vault
        .create_user(
            &vault.super_admin(),
            &NewUser::new(username, PASSWORD, "Test", "User", role),
        )
        .expect("user should be created");
    Actor::stored(created.id, created.role, created.username)
}

pub fn traveller(email: &str) -> NewTraveller {
    NewTraveller {
        first_name: "Anna".to_string(),
        last_name: "de Vries".to_string(),
        birth_date: "1990-04-12".to_string(),
        gender: "female".to_string(),
        street_name: "Coolsingel".to_string(),
        house_number: "40".to_string(),
        zip_code: "3011AD".to_string(),
        city: "Rotterdam".to_string(),
        email: email.to_string(),
        mobile_phone: "12345678".to_string(),
        license_number: "AB1234567".to_string(),
    }
}

pub fn scooter(serial: &str) -> NewScooter {
    NewScooter {
        brand: "Segway".to_string(),
        model: "Ninebot Max G30".to_string(),
        serial_number: serial.to_string(),
        top_speed: 25,
        battery_capacity: 551,
        state_of_charge: 80,
        target_soc_min: 20,
        target_soc_max: 90,
        latitude: 51.9225,
        longitude: 4.47917,
        out_of_service: false,
        mileage: 1204.5,
        last_maintenance: Some("2025-03-01".to_string()),
    }
}
