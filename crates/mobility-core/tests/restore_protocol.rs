mod common;

use mobility_core::config::SuperAdminConfig;
use mobility_core::crypto::FieldKey;
use mobility_core::model::RestoreState;
use mobility_core::{Actor, MobilityError, Role, Vault, VaultConfig};

fn emails(vault: &Vault, actor: &Actor) -> Vec<String> {
    vault
        .list_travellers(actor)
        .expect("list should succeed")
        .into_iter()
        .map(|traveller| traveller.email)
        .collect()
}

#[test]
fn test_code_redeemed_restore_rolls_back_and_removes_only_that_backup() {
    let (dir, vault) = common::vault();
    let super_admin = vault.super_admin();
    let admin = common::user(&vault, "admin_001", Role::Administrator);

    vault
        .create_traveller(&admin, &common::traveller("a@x.com"))
        .expect("traveller should be created");
    let mut backups = Vec::new();
    for _ in 0..7 {
        backups.push(vault.create_backup(&admin).expect("backup should be created"));
    }
    let seventh = backups.last().expect("seven backups").clone();
    assert_eq!(seventh.id, 7);

    vault
        .create_traveller(&admin, &common::traveller("b@y.com"))
        .expect("traveller should be created");
    assert_eq!(emails(&vault, &admin), vec!["a@x.com", "b@y.com"]);

    let request = vault
        .request_restore(&admin, seventh.id)
        .expect("request should succeed");
    assert_eq!(request.state, RestoreState::Requested);

    let pending = vault
        .pending_requests(&super_admin)
        .expect("pending should succeed");
    assert_eq!(pending.len(), 1);

    let issued = vault
        .issue_code(&super_admin, request.id)
        .expect("issue should succeed");
    assert_eq!(issued.request.state, RestoreState::CodeIssued);

    let report = vault
        .restore_with_code(&admin, &issued.code.to_lowercase())
        .expect("restore should succeed");
    assert_eq!(report.backup_id, 7);
    assert_eq!(report.removed_backups, vec![7]);
    assert!(report.snapshot_path.exists());

    assert_eq!(emails(&vault, &admin), vec!["a@x.com"]);
    let remaining: Vec<i64> = vault
        .list_backups(&admin)
        .expect("list should succeed")
        .iter()
        .map(|backup| backup.id)
        .collect();
    assert_eq!(remaining, vec![1, 2, 3, 4, 5, 6]);
    assert!(vault
        .store()
        .get_restore_code(request.id)
        .expect("lookup should succeed")
        .is_none());
    assert!(!dir.path().join("backups").join(&seventh.file_name).exists());
}

#[test]
fn test_redeemed_code_cannot_be_redeemed_again() {
    let (_dir, vault) = common::vault();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    let backup = vault.create_backup(&admin).expect("backup should be created");
    let request = vault
        .request_restore(&admin, backup.id)
        .expect("request should succeed");
    let issued = vault
        .issue_code(&vault.super_admin(), request.id)
        .expect("issue should succeed");

    assert_eq!(
        vault.redeem_code(&admin, &issued.code).expect("redeem should succeed"),
        backup.id
    );
    assert!(matches!(
        vault.redeem_code(&admin, &issued.code),
        Err(MobilityError::InvalidCode)
    ));
}

#[test]
fn test_code_bound_to_other_requester_is_invalid() {
    let (_dir, vault) = common::vault();
    let first = common::user(&vault, "admin_001", Role::Administrator);
    let second = common::user(&vault, "admin_002", Role::Administrator);
    let backup = vault.create_backup(&first).expect("backup should be created");
    let request = vault
        .request_restore(&first, backup.id)
        .expect("request should succeed");
    let issued = vault
        .issue_code(&vault.super_admin(), request.id)
        .expect("issue should succeed");

    assert!(matches!(
        vault.redeem_code(&second, &issued.code),
        Err(MobilityError::InvalidCode)
    ));
    // Still redeemable by its owner
    assert!(vault.redeem_code(&first, &issued.code).is_ok());
}

#[test]
fn test_direct_restore_removes_strictly_older_backups() {
    let (dir, vault) = common::vault();
    let super_admin = vault.super_admin();
    let admin = common::user(&vault, "admin_001", Role::Administrator);

    let first = vault.create_backup(&admin).expect("backup should be created");
    let second = vault.create_backup(&super_admin).expect("backup should be created");
    vault
        .create_traveller(&admin, &common::traveller("a@x.com"))
        .expect("traveller should be created");
    let third = vault.create_backup(&admin).expect("backup should be created");
    assert_eq!(second.created_by, None);

    let report = vault
        .restore_backup(&super_admin, second.id)
        .expect("restore should succeed");
    assert_eq!(report.removed_backups, vec![first.id]);
    assert_eq!(report.failed_artifact_removals, 0);

    let remaining: Vec<i64> = vault
        .list_backups(&super_admin)
        .expect("list should succeed")
        .iter()
        .map(|backup| backup.id)
        .collect();
    assert_eq!(remaining, vec![second.id, third.id]);
    assert!(emails(&vault, &admin).is_empty());
    assert!(!dir.path().join("backups").join(&first.file_name).exists());
}

#[test]
fn test_only_one_live_request_per_pair() {
    let (_dir, vault) = common::vault();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    let backup = vault.create_backup(&admin).expect("backup should be created");

    let request = vault
        .request_restore(&admin, backup.id)
        .expect("request should succeed");
    assert!(matches!(
        vault.request_restore(&admin, backup.id),
        Err(MobilityError::AlreadyRequested { .. })
    ));

    vault
        .cancel_request(&admin, request.id)
        .expect("cancel should succeed");
    assert!(vault.request_restore(&admin, backup.id).is_ok());
}

#[test]
fn test_revoked_code_is_invalid() {
    let (_dir, vault) = common::vault();
    let super_admin = vault.super_admin();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    let backup = vault.create_backup(&admin).expect("backup should be created");
    let request = vault
        .request_restore(&admin, backup.id)
        .expect("request should succeed");
    let issued = vault
        .issue_code(&super_admin, request.id)
        .expect("issue should succeed");

    vault
        .revoke_code(&super_admin, request.id)
        .expect("revoke should succeed");
    assert!(matches!(
        vault.redeem_code(&admin, &issued.code),
        Err(MobilityError::InvalidCode)
    ));
    assert!(vault.issue_code(&super_admin, request.id).is_err());
}

#[test]
fn test_missing_backup_is_not_found() {
    let (_dir, vault) = common::vault();
    let admin = common::user(&vault, "admin_001", Role::Administrator);

    assert!(matches!(
        vault.request_restore(&admin, 42),
        Err(MobilityError::NotFound(_))
    ));
    assert!(matches!(
        vault.restore_backup(&vault.super_admin(), 42),
        Err(MobilityError::NotFound(_))
    ));
    assert!(matches!(
        vault.issue_code(&vault.super_admin(), 42),
        Err(MobilityError::NotFound(_))
    ));
}

#[test]
fn test_missing_artifact_fails_restore_and_keeps_store() {
    let (dir, vault) = common::vault();
    let super_admin = vault.super_admin();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    let backup = vault.create_backup(&admin).expect("backup should be created");
    vault
        .create_traveller(&admin, &common::traveller("a@x.com"))
        .expect("traveller should be created");

    std::fs::remove_file(dir.path().join("backups").join(&backup.file_name))
        .expect("artifact should be removed");

    assert!(matches!(
        vault.restore_backup(&super_admin, backup.id),
        Err(MobilityError::RestoreFailed(_))
    ));
    assert_eq!(emails(&vault, &admin), vec!["a@x.com"]);
    assert_eq!(vault.list_backups(&admin).expect("list should succeed").len(), 1);
}

#[test]
fn test_protocol_roles_are_exact() {
    let (_dir, vault) = common::vault();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    let operator = common::user(&vault, "operator1", Role::Operator);
    let backup = vault.create_backup(&admin).expect("backup should be created");

    assert!(matches!(
        vault.create_backup(&operator),
        Err(MobilityError::AccessDenied(_))
    ));
    assert!(matches!(
        vault.request_restore(&operator, backup.id),
        Err(MobilityError::AccessDenied(_))
    ));
    assert!(matches!(
        vault.restore_backup(&admin, backup.id),
        Err(MobilityError::AccessDenied(_))
    ));
    let request = vault
        .request_restore(&admin, backup.id)
        .expect("request should succeed");
    assert!(matches!(
        vault.issue_code(&admin, request.id),
        Err(MobilityError::AccessDenied(_))
    ));

    // A stored SuperAdministrator outranks Administrator but is not listed
    let stored_super = Actor::stored(99, Role::SuperAdministrator, "super_002");
    assert!(matches!(
        vault.request_restore(&stored_super, backup.id),
        Err(MobilityError::AccessDenied(_))
    ));
}

#[test]
fn test_audit_log_survives_restore() {
    let (_dir, vault) = common::vault();
    let super_admin = vault.super_admin();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    let backup = vault.create_backup(&admin).expect("backup should be created");
    let before = vault.list_logs(&super_admin).expect("logs should list").len();

    vault
        .restore_backup(&super_admin, backup.id)
        .expect("restore should succeed");
    let after = vault.list_logs(&super_admin).expect("logs should list");
    assert!(after.len() > before);
    assert_eq!(after[0].description, "Backup restored");
}

#[test]
fn test_used_temporary_password_stays_used_after_restore() {
    let (_dir, vault) = common::vault();
    let super_admin = vault.super_admin();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    let operator = common::user(&vault, "operator1", Role::Operator);
    let operator_id = operator.user_id().expect("stored identity");

    let temporary = vault
        .reset_password(&admin, operator_id)
        .expect("reset should succeed");
    let backup = vault.create_backup(&admin).expect("backup should be created");

    let mut session = vault
        .login("operator1", &temporary)
        .expect("temporary login should succeed");
    assert!(session.must_change_password());
    vault
        .change_own_password(&mut session, None, "N3w!Password12")
        .expect("password change should succeed");
    assert!(matches!(
        vault.login("operator1", &temporary),
        Err(MobilityError::InvalidCredentials)
    ));

    vault
        .restore_backup(&super_admin, backup.id)
        .expect("restore should succeed");

    assert!(matches!(
        vault.login("operator1", &temporary),
        Err(MobilityError::InvalidCredentials)
    ));
    let code = vault
        .store()
        .get_reset_code(operator_id)
        .expect("lookup should succeed")
        .expect("reset code should carry over");
    assert!(code.used);
    assert!(vault.login("operator1", common::PASSWORD).is_ok());
}

#[test]
fn test_restore_drops_reset_codes_of_users_missing_from_backup() {
    let (_dir, vault) = common::vault();
    let super_admin = vault.super_admin();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    let backup = vault.create_backup(&admin).expect("backup should be created");

    let late = common::user(&vault, "operator2", Role::Operator);
    let late_id = late.user_id().expect("stored identity");
    vault
        .reset_password(&admin, late_id)
        .expect("reset should succeed");

    vault
        .restore_backup(&super_admin, backup.id)
        .expect("restore should succeed");

    assert!(vault
        .store()
        .get_reset_code(late_id)
        .expect("lookup should succeed")
        .is_none());
    assert!(matches!(
        vault.login("operator2", common::PASSWORD),
        Err(MobilityError::InvalidCredentials)
    ));
}

#[test]
fn test_out_of_range_code_lifetime_is_rejected_on_open() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let mut config = VaultConfig::new(
        dir.path(),
        dir.path().join("field.key"),
        SuperAdminConfig {
            username: common::SUPER_USERNAME.to_string(),
            password_hash: "unused".to_string(),
        },
    );
    config.restore_code_ttl_minutes = i64::MAX;

    assert!(matches!(
        Vault::with_key(config, FieldKey::generate()),
        Err(MobilityError::InvalidInput(_))
    ));
}
