mod common;

use mobility_core::model::{ScooterUpdate, TravellerUpdate};
use mobility_core::{MobilityError, Role};

#[test]
fn test_traveller_crud() {
    let (_dir, vault) = common::vault();
    let admin = common::user(&vault, "admin_001", Role::Administrator);

    let created = vault
        .create_traveller(&admin, &common::traveller("a@x.com"))
        .expect("traveller should be created");
    assert_eq!(created.city, "Rotterdam");

    let update = TravellerUpdate {
        city: Some("Utrecht".to_string()),
        zip_code: Some("3511 AB".to_string()),
        ..TravellerUpdate::default()
    };
    let updated = vault
        .update_traveller(&admin, created.id, &update)
        .expect("update should succeed");
    assert_eq!(updated.city, "Utrecht");
    assert_eq!(updated.zip_code, "3511AB");
    assert_eq!(updated.email, "a@x.com");

    vault
        .delete_traveller(&admin, created.id)
        .expect("delete should succeed");
    assert!(matches!(
        vault.get_traveller(&admin, created.id),
        Err(MobilityError::NotFound(_))
    ));
}

#[test]
fn test_invalid_traveller_names_the_field_and_stores_nothing() {
    let (_dir, vault) = common::vault();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    let mut input = common::traveller("a@x.com");
    input.city = "Gotham".to_string();

    let err = vault.create_traveller(&admin, &input).unwrap_err();
    assert!(matches!(err, MobilityError::Validation { field: "city", .. }));
    assert!(vault
        .list_travellers(&admin)
        .expect("list should succeed")
        .is_empty());
}

#[test]
fn test_invalid_update_changes_nothing() {
    let (_dir, vault) = common::vault();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    let created = vault
        .create_traveller(&admin, &common::traveller("a@x.com"))
        .expect("traveller should be created");

    let update = TravellerUpdate {
        city: Some("Utrecht".to_string()),
        email: Some("not-an-email".to_string()),
        ..TravellerUpdate::default()
    };
    assert!(vault.update_traveller(&admin, created.id, &update).is_err());
    let unchanged = vault
        .get_traveller(&admin, created.id)
        .expect("get should succeed");
    assert_eq!(unchanged.city, "Rotterdam");
}

#[test]
fn test_equal_target_charge_bounds_are_rejected() {
    let (_dir, vault) = common::vault();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    let mut input = common::scooter("SN1234567890");
    input.target_soc_min = 50;
    input.target_soc_max = 50;

    let err = vault.create_scooter(&admin, &input).unwrap_err();
    assert!(matches!(
        err,
        MobilityError::Validation { field: "target_soc_min", .. }
    ));
}

#[test]
fn test_update_cannot_invert_target_window() {
    let (_dir, vault) = common::vault();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    let scooter = vault
        .create_scooter(&admin, &common::scooter("SN1234567890"))
        .expect("scooter should be created");

    let update = ScooterUpdate {
        target_soc_min: Some(95),
        ..ScooterUpdate::default()
    };
    assert!(vault.update_scooter(&admin, scooter.id, &update).is_err());
}

#[test]
fn test_operator_updates_only_field_telemetry() {
    let (_dir, vault) = common::vault();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    let operator = common::user(&vault, "operator1", Role::Operator);
    let scooter = vault
        .create_scooter(&admin, &common::scooter("SN1234567890"))
        .expect("scooter should be created");

    let telemetry = ScooterUpdate {
        state_of_charge: Some(35),
        out_of_service: Some(true),
        ..ScooterUpdate::default()
    };
    let updated = vault
        .update_scooter(&operator, scooter.id, &telemetry)
        .expect("operator should update telemetry");
    assert_eq!(updated.state_of_charge, 35);
    assert!(updated.out_of_service);

    let details = ScooterUpdate {
        brand: Some("NIU".to_string()),
        ..ScooterUpdate::default()
    };
    assert!(matches!(
        vault.update_scooter(&operator, scooter.id, &details),
        Err(MobilityError::AccessDenied(_))
    ));
    assert!(matches!(
        vault.delete_scooter(&operator, scooter.id),
        Err(MobilityError::AccessDenied(_))
    ));
    assert_eq!(
        vault
            .get_scooter(&operator, scooter.id)
            .expect("operator should view scooters")
            .brand,
        "Segway"
    );
}

#[test]
fn test_sensitive_columns_are_ciphertext_at_rest() {
    let (dir, vault) = common::vault();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    vault
        .create_traveller(&admin, &common::traveller("a@x.com"))
        .expect("traveller should be created");
    vault
        .create_scooter(&admin, &common::scooter("SN1234567890"))
        .expect("scooter should be created");
    drop(vault);

    let raw = std::fs::read(dir.path().join("mobility.db")).expect("store should be readable");
    for needle in ["a@x.com", "Anna", "Coolsingel", "SN1234567890", "admin_001"] {
        assert!(
            !raw.windows(needle.len()).any(|window| window == needle.as_bytes()),
            "{} found in clear",
            needle
        );
    }
}
