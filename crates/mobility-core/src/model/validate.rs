//! Canonical field formats.
//!
//! Each check returns the canonical form of the value (trimmed, case-folded
//! where the format is case-insensitive) or a `Validation` error naming the
//! field. Checks never touch storage.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{MobilityError, Result};

/// Cities a traveller may reside in.
pub const CITIES: [&str; 10] = [
    "Rotterdam",
    "Amsterdam",
    "Den Haag",
    "Utrecht",
    "Eindhoven",
    "Groningen",
    "Tilburg",
    "Almere",
    "Breda",
    "Nijmegen",
];

pub const MIN_TRAVELLER_AGE: i32 = 18;

const PASSWORD_MIN: usize = 12;
const PASSWORD_MAX: usize = 30;
const PASSWORD_SYMBOLS: &str = "~!@#$%&_-+=`|\\(){}[]:;'<>,.?/";
const MAX_NAME_CHARS: usize = 50;
const MAX_STREET_CHARS: usize = 100;
const MAX_EMAIL_CHARS: usize = 254;
const MAX_TOP_SPEED: u32 = 120;
const MAX_BATTERY_WH: u32 = 100_000;

static USERNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_'.]{7,9}$").expect("username regex"));
static HOUSE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9][0-9]{0,4}[A-Z]?$").expect("house number regex"));
static ZIP_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}[A-Z]{2}$").expect("zip code regex"));
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9\-]+(\.[a-z0-9\-]+)*\.[a-z]{2,}$").expect("email regex")
});
static MOBILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\+31-?6-?)?([0-9]{8})$").expect("mobile regex"));
static LICENSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Z]{2}[0-9]{7}|[A-Z][0-9]{8})$").expect("license regex"));
static SERIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{10,17}$").expect("serial regex"));

/// Reject absent or blank mandatory values.
pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MobilityError::validation(field, "is required"));
    }
    Ok(trimmed)
}

/// Usernames: 8-10 characters, starting with a letter or underscore, then
/// letters, digits, `_`, `'` or `.`. Compared case-insensitively, so the
/// canonical form is lower case.
pub fn username(value: &str) -> Result<String> {
    let lowered = required("username", value)?.to_lowercase();
    if !USERNAME.is_match(&lowered) {
        return Err(MobilityError::validation(
            "username",
            "must be 8-10 characters, start with a letter or underscore, and contain only letters, digits, _ ' .",
        ));
    }
    Ok(lowered)
}

/// Passwords: 12-30 characters from letters, digits and the allowed symbols,
/// with at least one lower-case letter, upper-case letter, digit and symbol.
pub fn password(value: &str) -> Result<()> {
    let length = value.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
        return Err(MobilityError::validation(
            "password",
            format!(
                "must be {}-{} characters (got {})",
                PASSWORD_MIN, PASSWORD_MAX, length
            ),
        ));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !PASSWORD_SYMBOLS.contains(*c))
    {
        return Err(MobilityError::validation(
            "password",
            format!("contains a disallowed character '{}'", bad),
        ));
    }
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_symbol = value.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    if !(has_lower && has_upper && has_digit && has_symbol) {
        return Err(MobilityError::validation(
            "password",
            "needs a lower-case letter, an upper-case letter, a digit and a symbol",
        ));
    }
    Ok(())
}

/// Personal names: letters, spaces, hyphens and apostrophes.
pub fn person_name(field: &'static str, value: &str) -> Result<String> {
    let trimmed = required(field, value)?;
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(MobilityError::validation(
            field,
            format!("must be at most {} characters", MAX_NAME_CHARS),
        ));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'')
    {
        return Err(MobilityError::validation(
            field,
            "may contain only letters, spaces, hyphens and apostrophes",
        ));
    }
    Ok(trimmed.to_string())
}

/// An ISO-8601 calendar date (`YYYY-MM-DD`) that is not in the future.
pub fn iso_date(field: &'static str, value: &str, today: NaiveDate) -> Result<NaiveDate> {
    let trimmed = required(field, value)?;
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| MobilityError::validation(field, "must be a date in YYYY-MM-DD format"))?;
    if date > today {
        return Err(MobilityError::validation(field, "cannot be in the future"));
    }
    Ok(date)
}

/// Birth date of someone at least 18 years old on `today`.
pub fn birth_date(value: &str, today: NaiveDate) -> Result<NaiveDate> {
    let date = iso_date("birth_date", value, today)?;
    if age_on(date, today) < MIN_TRAVELLER_AGE {
        return Err(MobilityError::validation(
            "birth_date",
            format!("traveller must be at least {} years old", MIN_TRAVELLER_AGE),
        ));
    }
    Ok(date)
}

/// Whole years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

pub fn gender(value: &str) -> Result<String> {
    match required("gender", value)?.to_lowercase().as_str() {
        "male" | "m" => Ok("male".to_string()),
        "female" | "f" => Ok("female".to_string()),
        _ => Err(MobilityError::validation("gender", "must be male or female")),
    }
}

pub fn street_name(value: &str) -> Result<String> {
    let trimmed = required("street_name", value)?;
    if trimmed.chars().count() > MAX_STREET_CHARS {
        return Err(MobilityError::validation(
            "street_name",
            format!("must be at most {} characters", MAX_STREET_CHARS),
        ));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || " .'-".contains(c))
    {
        return Err(MobilityError::validation(
            "street_name",
            "contains a disallowed character",
        ));
    }
    Ok(trimmed.to_string())
}

/// House numbers such as `12` or `12B`.
pub fn house_number(value: &str) -> Result<String> {
    let canonical = required("house_number", value)?.to_uppercase();
    if !HOUSE_NUMBER.is_match(&canonical) {
        return Err(MobilityError::validation(
            "house_number",
            "must be a number with an optional letter suffix (e.g. 12B)",
        ));
    }
    Ok(canonical)
}

/// Dutch postal codes, `DDDDXX`.
pub fn zip_code(value: &str) -> Result<String> {
    let canonical: String = required("zip_code", value)?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if !ZIP_CODE.is_match(&canonical) {
        return Err(MobilityError::validation(
            "zip_code",
            "must be four digits followed by two letters (e.g. 3011AB)",
        ));
    }
    Ok(canonical)
}

pub fn city(value: &str) -> Result<String> {
    let trimmed = required("city", value)?;
    CITIES
        .iter()
        .find(|city| city.eq_ignore_ascii_case(trimmed))
        .map(|city| city.to_string())
        .ok_or_else(|| {
            MobilityError::validation("city", format!("must be one of: {}", CITIES.join(", ")))
        })
}

pub fn email(value: &str) -> Result<String> {
    let lowered = required("email", value)?.to_lowercase();
    if lowered.len() > MAX_EMAIL_CHARS || !EMAIL.is_match(&lowered) {
        return Err(MobilityError::validation(
            "email",
            "must be a valid e-mail address",
        ));
    }
    Ok(lowered)
}

/// Mobile numbers are stored as `+31-6-DDDDDDDD`; the eight trailing digits
/// alone are accepted as input.
pub fn mobile_phone(value: &str) -> Result<String> {
    let compact: String = required("mobile_phone", value)?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let digits = MOBILE
        .captures(&compact)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| {
            MobilityError::validation("mobile_phone", "must be eight digits (+31-6-DDDDDDDD)")
        })?;
    Ok(format!("+31-6-{}", digits.as_str()))
}

/// Driving licences: `XXDDDDDDD` or `XDDDDDDDD`.
pub fn license_number(value: &str) -> Result<String> {
    let canonical = required("license_number", value)?.to_uppercase();
    if !LICENSE.is_match(&canonical) {
        return Err(MobilityError::validation(
            "license_number",
            "must be two letters and seven digits, or one letter and eight digits",
        ));
    }
    Ok(canonical)
}

/// Scooter serial numbers: 10-17 alphanumeric characters.
pub fn serial_number(value: &str) -> Result<String> {
    let canonical = required("serial_number", value)?.to_uppercase();
    if !SERIAL.is_match(&canonical) {
        return Err(MobilityError::validation(
            "serial_number",
            "must be 10-17 letters or digits",
        ));
    }
    Ok(canonical)
}

/// Free-form short labels such as brand and model names.
pub fn label(field: &'static str, value: &str) -> Result<String> {
    let trimmed = required(field, value)?;
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(MobilityError::validation(
            field,
            format!("must be at most {} characters", MAX_NAME_CHARS),
        ));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(MobilityError::validation(
            field,
            "contains a control character",
        ));
    }
    Ok(trimmed.to_string())
}

pub fn percentage(field: &'static str, value: u8) -> Result<u8> {
    if value > 100 {
        return Err(MobilityError::validation(field, "must be between 0 and 100"));
    }
    Ok(value)
}

/// Target state-of-charge window; `min` must be strictly below `max`.
pub fn target_range(min: u8, max: u8) -> Result<(u8, u8)> {
    percentage("target_soc_min", min)?;
    percentage("target_soc_max", max)?;
    if min >= max {
        return Err(MobilityError::validation(
            "target_soc_min",
            format!("must be below target_soc_max ({} >= {})", min, max),
        ));
    }
    Ok((min, max))
}

pub fn latitude(value: f64) -> Result<f64> {
    if !value.is_finite() || !(-90.0..=90.0).contains(&value) {
        return Err(MobilityError::validation(
            "latitude",
            "must be between -90 and 90",
        ));
    }
    Ok(value)
}

pub fn longitude(value: f64) -> Result<f64> {
    if !value.is_finite() || !(-180.0..=180.0).contains(&value) {
        return Err(MobilityError::validation(
            "longitude",
            "must be between -180 and 180",
        ));
    }
    Ok(value)
}

pub fn top_speed(value: u32) -> Result<u32> {
    if value == 0 || value > MAX_TOP_SPEED {
        return Err(MobilityError::validation(
            "top_speed",
            format!("must be between 1 and {} km/h", MAX_TOP_SPEED),
        ));
    }
    Ok(value)
}

pub fn battery_capacity(value: u32) -> Result<u32> {
    if value == 0 || value > MAX_BATTERY_WH {
        return Err(MobilityError::validation(
            "battery_capacity",
            format!("must be between 1 and {} Wh", MAX_BATTERY_WH),
        ));
    }
    Ok(value)
}

pub fn mileage(value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(MobilityError::validation(
            "mileage",
            "must be zero or more kilometres",
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn field_of(err: MobilityError) -> &'static str {
        match err {
            MobilityError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_username_rules() {
        assert_eq!(username("Jan_Smit01").unwrap(), "jan_smit01");
        assert_eq!(username("_operator").unwrap(), "_operator");
        assert!(username("short").is_err());
        assert!(username("waytoolongname").is_err());
        assert!(username("1startsdigit").is_err());
        assert!(username("has space1").is_err());
        assert_eq!(field_of(username("").unwrap_err()), "username");
    }

    #[test]
    fn test_password_rules() {
        assert!(password("Abcdefgh12!x").is_ok());
        assert!(password("Abc1!").is_err());
        assert!(password(&format!("Aa1!{}", "x".repeat(27))).is_err());
        assert!(password("abcdefgh12!x").is_err());
        assert!(password("ABCDEFGH12!X").is_err());
        assert!(password("Abcdefghij!x").is_err());
        assert!(password("Abcdefgh12xx").is_err());
        assert!(password("Abcdefgh12!\u{e9}").is_err());
    }

    #[test]
    fn test_birth_date_requires_adult() {
        assert!(birth_date("2008-10-17", today()).is_ok());
        assert!(birth_date("2008-10-18", today()).is_err());
        assert!(birth_date("1990-02-30", today()).is_err());
        assert!(birth_date("17-10-1990", today()).is_err());
        assert!(birth_date("2030-01-01", today()).is_err());
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        let birth = NaiveDate::from_ymd_opt(2000, 10, 18).unwrap();
        assert_eq!(age_on(birth, today()), 25);
        let birth = NaiveDate::from_ymd_opt(2000, 10, 17).unwrap();
        assert_eq!(age_on(birth, today()), 26);
    }

    #[test]
    fn test_address_fields() {
        assert_eq!(zip_code("3011 ab").unwrap(), "3011AB");
        assert!(zip_code("301AB").is_err());
        assert_eq!(house_number("12b").unwrap(), "12B");
        assert!(house_number("0").is_err());
        assert_eq!(city("den haag").unwrap(), "Den Haag");
        assert_eq!(field_of(city("Paris").unwrap_err()), "city");
        assert!(street_name("Coolsingel").is_ok());
        assert!(street_name("Drop;Table").is_err());
    }

    #[test]
    fn test_contact_fields() {
        assert_eq!(email("Jan@Example.NL").unwrap(), "jan@example.nl");
        assert!(email("jan@localhost").is_err());
        assert!(email("no-at.example.nl").is_err());
        assert_eq!(mobile_phone("12345678").unwrap(), "+31-6-12345678");
        assert_eq!(mobile_phone("+31-6-12345678").unwrap(), "+31-6-12345678");
        assert!(mobile_phone("1234567").is_err());
    }

    #[test]
    fn test_license_and_serial() {
        assert_eq!(license_number("ab1234567").unwrap(), "AB1234567");
        assert!(license_number("A12345678").is_ok());
        assert!(license_number("ABC123456").is_err());
        assert!(serial_number("SN12345678").is_ok());
        assert!(serial_number("SN1234").is_err());
        assert!(serial_number("SN-12345678").is_err());
    }

    #[test]
    fn test_target_range_is_strict() {
        assert_eq!(target_range(20, 80).unwrap(), (20, 80));
        assert_eq!(field_of(target_range(50, 50).unwrap_err()), "target_soc_min");
        assert!(target_range(80, 20).is_err());
        assert_eq!(field_of(target_range(10, 101).unwrap_err()), "target_soc_max");
    }

    #[test]
    fn test_coordinates() {
        assert!(latitude(51.92250).is_ok());
        assert!(latitude(90.5).is_err());
        assert!(longitude(-180.0).is_ok());
        assert!(longitude(f64::NAN).is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(person_name("first_name", "  Anne-Marie ").unwrap(), "Anne-Marie");
        assert!(person_name("last_name", "O'Neil").is_ok());
        assert_eq!(field_of(person_name("last_name", "R2D2").unwrap_err()), "last_name");
    }
}
