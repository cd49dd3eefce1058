//! Searchable record types and their column classes.

use crate::crypto::FieldCipher;
use crate::error::Result;
use crate::model::{
    SealedScooter, SealedTraveller, SealedUser, Scooter, Stored, Traveller, User,
};
use crate::search::QueryClass;
use crate::storage::Store;

/// A record type the engine can search.
///
/// `COLUMNS` lists every encrypted column a caller may target explicitly;
/// `columns_for` picks the subset decrypted for a classified query.
pub trait Searchable: Sized {
    type Sealed;

    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn columns_for(class: QueryClass) -> &'static [&'static str];

    fn fetch(store: &Store, ids: &[i64]) -> Result<Vec<Stored<Self::Sealed>>>;

    fn open(stored: &Stored<Self::Sealed>, cipher: &FieldCipher) -> Result<Self>;
}

impl Searchable for Traveller {
    type Sealed = SealedTraveller;

    const TABLE: &'static str = "travellers";
    const COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "birth_date",
        "gender",
        "street_name",
        "house_number",
        "zip_code",
        "city",
        "email",
        "mobile_phone",
        "license_number",
    ];

    fn columns_for(class: QueryClass) -> &'static [&'static str] {
        match class {
            QueryClass::Numeric => &["mobile_phone", "zip_code", "house_number", "license_number"],
            QueryClass::Email => &["email"],
            // Partial addresses like "x.com" classify as text
            QueryClass::Text => &["first_name", "last_name", "street_name", "city", "email"],
        }
    }

    fn fetch(store: &Store, ids: &[i64]) -> Result<Vec<Stored<SealedTraveller>>> {
        store.fetch_travellers(ids)
    }

    fn open(stored: &Stored<SealedTraveller>, cipher: &FieldCipher) -> Result<Self> {
        stored.open(cipher)
    }
}

impl Searchable for Scooter {
    type Sealed = SealedScooter;

    const TABLE: &'static str = "scooters";
    const COLUMNS: &'static [&'static str] = &["brand", "model", "serial_number"];

    fn columns_for(class: QueryClass) -> &'static [&'static str] {
        match class {
            QueryClass::Numeric => &["serial_number"],
            QueryClass::Email => &[],
            QueryClass::Text => &["brand", "model", "serial_number"],
        }
    }

    fn fetch(store: &Store, ids: &[i64]) -> Result<Vec<Stored<SealedScooter>>> {
        store.fetch_scooters(ids)
    }

    fn open(stored: &Stored<SealedScooter>, cipher: &FieldCipher) -> Result<Self> {
        stored.open(cipher)
    }
}

impl Searchable for User {
    type Sealed = SealedUser;

    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["username", "first_name", "last_name"];

    fn columns_for(class: QueryClass) -> &'static [&'static str] {
        match class {
            QueryClass::Numeric => &["username"],
            QueryClass::Email => &[],
            QueryClass::Text => &["username", "first_name", "last_name"],
        }
    }

    fn fetch(store: &Store, ids: &[i64]) -> Result<Vec<Stored<SealedUser>>> {
        store.fetch_users(ids)
    }

    fn open(stored: &Stored<SealedUser>, cipher: &FieldCipher) -> Result<Self> {
        stored.open(cipher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_class_columns_are_searchable<T: Searchable>() {
        for class in [QueryClass::Numeric, QueryClass::Email, QueryClass::Text] {
            for column in T::columns_for(class) {
                assert!(T::COLUMNS.contains(column), "{} not in {}", column, T::TABLE);
            }
        }
    }

    #[test]
    fn test_class_columns_are_subsets() {
        assert_class_columns_are_searchable::<Traveller>();
        assert_class_columns_are_searchable::<Scooter>();
        assert_class_columns_are_searchable::<User>();
    }

    #[test]
    fn test_traveller_classes_decrypt_at_most_five_columns() {
        assert_eq!(Traveller::columns_for(QueryClass::Email), &["email"]);
        assert_eq!(Traveller::columns_for(QueryClass::Numeric).len(), 4);
        assert!(!Traveller::columns_for(QueryClass::Numeric).contains(&"email"));
    }
}
