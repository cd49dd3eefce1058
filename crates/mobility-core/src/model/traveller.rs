//! Travellers: customers of the scooter service.
//!
//! Every personal field is encrypted individually; only the identifier and
//! the registration timestamp are stored in clear.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::crypto::FieldCipher;
use crate::error::{MobilityError, Result};
use crate::model::validate;
use crate::model::Stored;

/// Field bundle for registering a traveller.
#[derive(Debug, Clone, Default)]
pub struct NewTraveller {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub gender: String,
    pub street_name: String,
    pub house_number: String,
    pub zip_code: String,
    pub city: String,
    pub email: String,
    pub mobile_phone: String,
    pub license_number: String,
}

/// Canonical plaintext values, produced only by validation.
struct CheckedTraveller {
    first_name: String,
    last_name: String,
    birth_date: NaiveDate,
    gender: String,
    street_name: String,
    house_number: String,
    zip_code: String,
    city: String,
    email: String,
    mobile_phone: String,
    license_number: String,
}

impl NewTraveller {
    fn check(&self, today: NaiveDate) -> Result<CheckedTraveller> {
        Ok(CheckedTraveller {
            first_name: validate::person_name("first_name", &self.first_name)?,
            last_name: validate::person_name("last_name", &self.last_name)?,
            birth_date: validate::birth_date(&self.birth_date, today)?,
            gender: validate::gender(&self.gender)?,
            street_name: validate::street_name(&self.street_name)?,
            house_number: validate::house_number(&self.house_number)?,
            zip_code: validate::zip_code(&self.zip_code)?,
            city: validate::city(&self.city)?,
            email: validate::email(&self.email)?,
            mobile_phone: validate::mobile_phone(&self.mobile_phone)?,
            license_number: validate::license_number(&self.license_number)?,
        })
    }

    /// Validate every field, then encrypt each one.
    pub fn seal(&self, cipher: &FieldCipher) -> Result<SealedTraveller> {
        let checked = self.check(Utc::now().date_naive())?;
        Ok(SealedTraveller {
            first_name: cipher.encrypt_field(&checked.first_name)?,
            last_name: cipher.encrypt_field(&checked.last_name)?,
            birth_date: cipher.encrypt_field(&checked.birth_date.format("%Y-%m-%d").to_string())?,
            gender: cipher.encrypt_field(&checked.gender)?,
            street_name: cipher.encrypt_field(&checked.street_name)?,
            house_number: cipher.encrypt_field(&checked.house_number)?,
            zip_code: cipher.encrypt_field(&checked.zip_code)?,
            city: cipher.encrypt_field(&checked.city)?,
            email: cipher.encrypt_field(&checked.email)?,
            mobile_phone: cipher.encrypt_field(&checked.mobile_phone)?,
            license_number: cipher.encrypt_field(&checked.license_number)?,
            registered_at: Utc::now(),
        })
    }
}

/// A traveller as persisted.
#[derive(Debug, Clone)]
pub struct SealedTraveller {
    pub(crate) first_name: Vec<u8>,
    pub(crate) last_name: Vec<u8>,
    pub(crate) birth_date: Vec<u8>,
    pub(crate) gender: Vec<u8>,
    pub(crate) street_name: Vec<u8>,
    pub(crate) house_number: Vec<u8>,
    pub(crate) zip_code: Vec<u8>,
    pub(crate) city: Vec<u8>,
    pub(crate) email: Vec<u8>,
    pub(crate) mobile_phone: Vec<u8>,
    pub(crate) license_number: Vec<u8>,
    pub(crate) registered_at: DateTime<Utc>,
}

impl SealedTraveller {
    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    pub fn email(&self, cipher: &FieldCipher) -> Result<String> {
        cipher.decrypt_field(&self.email)
    }

    pub fn full_name(&self, cipher: &FieldCipher) -> Result<String> {
        Ok(format!(
            "{} {}",
            cipher.decrypt_field(&self.first_name)?,
            cipher.decrypt_field(&self.last_name)?
        ))
    }
}

impl Stored<SealedTraveller> {
    pub fn open(&self, cipher: &FieldCipher) -> Result<Traveller> {
        let birth_date = cipher.decrypt_field(&self.birth_date)?;
        let birth_date = NaiveDate::parse_from_str(&birth_date, "%Y-%m-%d")
            .map_err(|e| MobilityError::Decryption(format!("Stored birth date is malformed: {}", e)))?;
        Ok(Traveller {
            id: self.id,
            first_name: cipher.decrypt_field(&self.first_name)?,
            last_name: cipher.decrypt_field(&self.last_name)?,
            birth_date,
            gender: cipher.decrypt_field(&self.gender)?,
            street_name: cipher.decrypt_field(&self.street_name)?,
            house_number: cipher.decrypt_field(&self.house_number)?,
            zip_code: cipher.decrypt_field(&self.zip_code)?,
            city: cipher.decrypt_field(&self.city)?,
            email: cipher.decrypt_field(&self.email)?,
            mobile_phone: cipher.decrypt_field(&self.mobile_phone)?,
            license_number: cipher.decrypt_field(&self.license_number)?,
            registered_at: self.registered_at,
        })
    }
}

/// Fully decrypted traveller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Traveller {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub street_name: String,
    pub house_number: String,
    pub zip_code: String,
    pub city: String,
    pub email: String,
    pub mobile_phone: String,
    pub license_number: String,
    pub registered_at: DateTime<Utc>,
}

/// Partial update of a traveller.
#[derive(Debug, Clone, Default)]
pub struct TravellerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub street_name: Option<String>,
    pub house_number: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub email: Option<String>,
    pub mobile_phone: Option<String>,
    pub license_number: Option<String>,
}

impl TravellerUpdate {
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("first_name", self.first_name.is_some()),
            ("last_name", self.last_name.is_some()),
            ("birth_date", self.birth_date.is_some()),
            ("gender", self.gender.is_some()),
            ("street_name", self.street_name.is_some()),
            ("house_number", self.house_number.is_some()),
            ("zip_code", self.zip_code.is_some()),
            ("city", self.city.is_some()),
            ("email", self.email.is_some()),
            ("mobile_phone", self.mobile_phone.is_some()),
            ("license_number", self.license_number.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    /// Validate all present fields, then re-encrypt them onto `sealed`.
    ///
    /// Untouched fields keep their existing ciphertext; nothing is decrypted.
    pub(crate) fn apply(&self, sealed: &mut SealedTraveller, cipher: &FieldCipher) -> Result<()> {
        let today = Utc::now().date_naive();
        let mut staged: Vec<(&'static str, String)> = Vec::new();

        if let Some(ref v) = self.first_name {
            staged.push(("first_name", validate::person_name("first_name", v)?));
        }
        if let Some(ref v) = self.last_name {
            staged.push(("last_name", validate::person_name("last_name", v)?));
        }
        if let Some(ref v) = self.birth_date {
            let date = validate::birth_date(v, today)?;
            staged.push(("birth_date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(ref v) = self.gender {
            staged.push(("gender", validate::gender(v)?));
        }
        if let Some(ref v) = self.street_name {
            staged.push(("street_name", validate::street_name(v)?));
        }
        if let Some(ref v) = self.house_number {
            staged.push(("house_number", validate::house_number(v)?));
        }
        if let Some(ref v) = self.zip_code {
            staged.push(("zip_code", validate::zip_code(v)?));
        }
        if let Some(ref v) = self.city {
            staged.push(("city", validate::city(v)?));
        }
        if let Some(ref v) = self.email {
            staged.push(("email", validate::email(v)?));
        }
        if let Some(ref v) = self.mobile_phone {
            staged.push(("mobile_phone", validate::mobile_phone(v)?));
        }
        if let Some(ref v) = self.license_number {
            staged.push(("license_number", validate::license_number(v)?));
        }

        for (field, value) in staged {
            let encrypted = cipher.encrypt_field(&value)?;
            match field {
                "first_name" => sealed.first_name = encrypted,
                "last_name" => sealed.last_name = encrypted,
                "birth_date" => sealed.birth_date = encrypted,
                "gender" => sealed.gender = encrypted,
                "street_name" => sealed.street_name = encrypted,
                "house_number" => sealed.house_number = encrypted,
                "zip_code" => sealed.zip_code = encrypted,
                "city" => sealed.city = encrypted,
                "email" => sealed.email = encrypted,
                "mobile_phone" => sealed.mobile_phone = encrypted,
                "license_number" => sealed.license_number = encrypted,
                _ => {}
            }
        }
        Ok(())
    }
}
