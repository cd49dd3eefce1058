mod common;

use chrono::NaiveDate;
use mobility_core::search::QueryClass;
use mobility_core::{Role, SearchQuery};

fn seeded() -> (tempfile::TempDir, mobility_core::Vault, mobility_core::Actor) {
    let (dir, vault) = common::vault();
    let admin = common::user(&vault, "admin_001", Role::Administrator);
    for email in ["a@x.com", "b@y.com", "c@x.com"] {
        vault
            .create_traveller(&admin, &common::traveller(email))
            .expect("traveller should be created");
    }
    (dir, vault, admin)
}

#[test]
fn test_partial_domain_returns_matching_travellers_fully_decrypted() {
    let (_dir, vault, admin) = seeded();

    let results = vault
        .search_travellers(&admin, &SearchQuery::new("x.com"))
        .expect("search should succeed");

    let emails: Vec<&str> = results.records.iter().map(|t| t.email.as_str()).collect();
    assert_eq!(emails, vec!["a@x.com", "c@x.com"]);
    for traveller in &results.records {
        assert_eq!(traveller.first_name, "Anna");
        assert_eq!(traveller.last_name, "de Vries");
        assert_eq!(traveller.birth_date, NaiveDate::from_ymd_opt(1990, 4, 12).unwrap());
        assert_eq!(traveller.zip_code, "3011AD");
        assert_eq!(traveller.mobile_phone, "+31-6-12345678");
        assert_eq!(traveller.license_number, "AB1234567");
    }
}

#[test]
fn test_email_query_decrypts_only_email_column() {
    let (_dir, vault, admin) = seeded();

    let results = vault
        .search_travellers(&admin, &SearchQuery::new("@x.com"))
        .expect("search should succeed");

    assert_eq!(results.records.len(), 2);
    assert_eq!(results.stats.class, Some(QueryClass::Email));
    assert_eq!(results.stats.columns, vec!["email"]);
    assert_eq!(results.stats.rows_scanned, 3);
    assert_eq!(results.stats.decryptions, 3);
}

#[test]
fn test_numeric_and_postcode_queries_decrypt_only_numeric_columns() {
    let (_dir, vault, admin) = seeded();
    let numeric = vec!["mobile_phone", "zip_code", "house_number", "license_number"];

    for query in ["1234AB", "98765", "3011AD"] {
        let results = vault
            .search_travellers(&admin, &SearchQuery::new(query))
            .expect("search should succeed");
        assert_eq!(results.stats.class, Some(QueryClass::Numeric), "{}", query);
        assert_eq!(results.stats.columns, numeric, "{}", query);
        for column in ["email", "first_name", "last_name", "city", "street_name"] {
            assert!(!results.stats.columns.contains(&column));
        }
    }

    let miss = vault
        .search_travellers(&admin, &SearchQuery::new("1234AB"))
        .expect("search should succeed");
    assert!(miss.records.is_empty());
    assert_eq!(miss.stats.decryptions, 3 * numeric.len());

    let hit = vault
        .search_travellers(&admin, &SearchQuery::new("3011ad"))
        .expect("search should succeed");
    assert_eq!(hit.records.len(), 3);
}

#[test]
fn test_result_cap_limits_matches() {
    let (_dir, vault, admin) = seeded();

    let results = vault
        .search_travellers(&admin, &SearchQuery::new("Rotterdam").limit(2))
        .expect("search should succeed");
    assert_eq!(results.records.len(), 2);
    assert_eq!(results.stats.rows_scanned, 2);
}

#[test]
fn test_operator_may_search_scooters_but_not_travellers() {
    let (_dir, vault, admin) = seeded();
    let operator = common::user(&vault, "operator1", Role::Operator);
    vault
        .create_scooter(&admin, &common::scooter("SN1234567890"))
        .expect("scooter should be created");

    let scooters = vault
        .search_scooters(&operator, &SearchQuery::new("ninebot"))
        .expect("search should succeed");
    assert_eq!(scooters.records.len(), 1);

    assert!(vault
        .search_travellers(&operator, &SearchQuery::new("Anna"))
        .is_err());
}

#[test]
fn test_user_search_by_name() {
    let (_dir, vault, admin) = seeded();
    common::user(&vault, "operator1", Role::Operator);

    let results = vault
        .search_users(&admin, &SearchQuery::new("OPERATOR"))
        .expect("search should succeed");
    assert_eq!(results.records.len(), 1);
    assert_eq!(results.records[0].username, "operator1");
}
