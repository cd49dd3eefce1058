//! Named-column row decoding.
//!
//! Each `*Row` is the raw shape of one table row, read by column name so
//! entity construction never depends on physical column order. Conversion
//! into sealed records happens outside the rusqlite closure so parse errors
//! surface as `MobilityError::Storage`.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;

use crate::error::{MobilityError, Result};
use crate::model::{
    Backup, ResetCode, RestoreCode, Role, SealedLogEntry, SealedScooter, SealedTraveller,
    SealedUser, Stored,
};

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| MobilityError::Storage(format!("Invalid timestamp: {}", e)))
}

fn parse_optional_timestamp(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value.as_deref().map(parse_timestamp).transpose()
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| MobilityError::Storage(format!("Invalid date: {}", e)))
}

#[derive(Debug)]
pub(crate) struct UserRow {
    id: i64,
    username: Vec<u8>,
    password_hash: String,
    role: String,
    first_name: Vec<u8>,
    last_name: Vec<u8>,
    registered_at: String,
}

impl UserRow {
    pub(crate) const COLUMNS: &'static str =
        "id, username, password_hash, role, first_name, last_name, registered_at";

    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            password_hash: row.get("password_hash")?,
            role: row.get("role")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            registered_at: row.get("registered_at")?,
        })
    }
}

impl TryFrom<UserRow> for Stored<SealedUser> {
    type Error = MobilityError;

    fn try_from(row: UserRow) -> Result<Self> {
        let role: Role = row
            .role
            .parse()
            .map_err(|_| MobilityError::Storage(format!("Invalid role: {}", row.role)))?;
        Ok(Stored::new(
            row.id,
            SealedUser {
                username: row.username,
                password_hash: row.password_hash,
                role,
                first_name: row.first_name,
                last_name: row.last_name,
                registered_at: parse_timestamp(&row.registered_at)?,
            },
        ))
    }
}

#[derive(Debug)]
pub(crate) struct TravellerRow {
    id: i64,
    first_name: Vec<u8>,
    last_name: Vec<u8>,
    birth_date: Vec<u8>,
    gender: Vec<u8>,
    street_name: Vec<u8>,
    house_number: Vec<u8>,
    zip_code: Vec<u8>,
    city: Vec<u8>,
    email: Vec<u8>,
    mobile_phone: Vec<u8>,
    license_number: Vec<u8>,
    registered_at: String,
}

impl TravellerRow {
    pub(crate) const COLUMNS: &'static str = "id, first_name, last_name, birth_date, gender, \
        street_name, house_number, zip_code, city, email, mobile_phone, license_number, registered_at";

    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            birth_date: row.get("birth_date")?,
            gender: row.get("gender")?,
            street_name: row.get("street_name")?,
            house_number: row.get("house_number")?,
            zip_code: row.get("zip_code")?,
            city: row.get("city")?,
            email: row.get("email")?,
            mobile_phone: row.get("mobile_phone")?,
            license_number: row.get("license_number")?,
            registered_at: row.get("registered_at")?,
        })
    }
}

impl TryFrom<TravellerRow> for Stored<SealedTraveller> {
    type Error = MobilityError;

    fn try_from(row: TravellerRow) -> Result<Self> {
        Ok(Stored::new(
            row.id,
            SealedTraveller {
                first_name: row.first_name,
                last_name: row.last_name,
                birth_date: row.birth_date,
                gender: row.gender,
                street_name: row.street_name,
                house_number: row.house_number,
                zip_code: row.zip_code,
                city: row.city,
                email: row.email,
                mobile_phone: row.mobile_phone,
                license_number: row.license_number,
                registered_at: parse_timestamp(&row.registered_at)?,
            },
        ))
    }
}

#[derive(Debug)]
pub(crate) struct ScooterRow {
    id: i64,
    brand: Vec<u8>,
    model: Vec<u8>,
    serial_number: Vec<u8>,
    top_speed: u32,
    battery_capacity: u32,
    state_of_charge: u8,
    target_soc_min: u8,
    target_soc_max: u8,
    latitude: f64,
    longitude: f64,
    out_of_service: bool,
    mileage: f64,
    last_maintenance: Option<String>,
    in_service_at: String,
}

impl ScooterRow {
    pub(crate) const COLUMNS: &'static str = "id, brand, model, serial_number, top_speed, \
        battery_capacity, state_of_charge, target_soc_min, target_soc_max, latitude, longitude, \
        out_of_service, mileage, last_maintenance, in_service_at";

    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            brand: row.get("brand")?,
            model: row.get("model")?,
            serial_number: row.get("serial_number")?,
            top_speed: row.get("top_speed")?,
            battery_capacity: row.get("battery_capacity")?,
            state_of_charge: row.get("state_of_charge")?,
            target_soc_min: row.get("target_soc_min")?,
            target_soc_max: row.get("target_soc_max")?,
            latitude: row.get("latitude")?,
            longitude: row.get("longitude")?,
            out_of_service: row.get("out_of_service")?,
            mileage: row.get("mileage")?,
            last_maintenance: row.get("last_maintenance")?,
            in_service_at: row.get("in_service_at")?,
        })
    }
}

impl TryFrom<ScooterRow> for Stored<SealedScooter> {
    type Error = MobilityError;

    fn try_from(row: ScooterRow) -> Result<Self> {
        Ok(Stored::new(
            row.id,
            SealedScooter {
                brand: row.brand,
                model: row.model,
                serial_number: row.serial_number,
                top_speed: row.top_speed,
                battery_capacity: row.battery_capacity,
                state_of_charge: row.state_of_charge,
                target_soc_min: row.target_soc_min,
                target_soc_max: row.target_soc_max,
                latitude: row.latitude,
                longitude: row.longitude,
                out_of_service: row.out_of_service,
                mileage: row.mileage,
                last_maintenance: row.last_maintenance.as_deref().map(parse_date).transpose()?,
                in_service_at: parse_timestamp(&row.in_service_at)?,
            },
        ))
    }
}

#[derive(Debug)]
pub(crate) struct BackupRow {
    id: i64,
    file_name: String,
    created_by: Option<i64>,
    created_at: String,
}

impl BackupRow {
    pub(crate) const COLUMNS: &'static str = "id, file_name, created_by, created_at";

    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            file_name: row.get("file_name")?,
            created_by: row.get("created_by")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl TryFrom<BackupRow> for Backup {
    type Error = MobilityError;

    fn try_from(row: BackupRow) -> Result<Self> {
        Ok(Backup {
            id: row.id,
            file_name: row.file_name,
            created_by: row.created_by,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[derive(Debug)]
pub(crate) struct RestoreCodeRow {
    id: i64,
    backup_id: i64,
    requester_id: i64,
    code_hash: Option<String>,
    state: String,
    requested_at: String,
    issued_at: Option<String>,
    used_at: Option<String>,
}

impl RestoreCodeRow {
    pub(crate) const COLUMNS: &'static str =
        "id, backup_id, requester_id, code_hash, state, requested_at, issued_at, used_at";

    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            backup_id: row.get("backup_id")?,
            requester_id: row.get("requester_id")?,
            code_hash: row.get("code_hash")?,
            state: row.get("state")?,
            requested_at: row.get("requested_at")?,
            issued_at: row.get("issued_at")?,
            used_at: row.get("used_at")?,
        })
    }
}

impl TryFrom<RestoreCodeRow> for RestoreCode {
    type Error = MobilityError;

    fn try_from(row: RestoreCodeRow) -> Result<Self> {
        Ok(RestoreCode {
            id: row.id,
            backup_id: row.backup_id,
            requester_id: row.requester_id,
            code_hash: row.code_hash,
            state: row.state.parse()?,
            requested_at: parse_timestamp(&row.requested_at)?,
            issued_at: parse_optional_timestamp(row.issued_at)?,
            used_at: parse_optional_timestamp(row.used_at)?,
        })
    }
}

#[derive(Debug)]
pub(crate) struct ResetCodeRow {
    user_id: i64,
    code_hash: String,
    created_at: String,
    used: bool,
}

impl ResetCodeRow {
    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get("user_id")?,
            code_hash: row.get("code_hash")?,
            created_at: row.get("created_at")?,
            used: row.get("used")?,
        })
    }
}

impl TryFrom<ResetCodeRow> for ResetCode {
    type Error = MobilityError;

    fn try_from(row: ResetCodeRow) -> Result<Self> {
        Ok(ResetCode {
            user_id: row.user_id,
            code_hash: row.code_hash,
            created_at: parse_timestamp(&row.created_at)?,
            used: row.used,
        })
    }
}

#[derive(Debug)]
pub(crate) struct LogRow {
    id: i64,
    logged_at: String,
    username: Vec<u8>,
    description: Vec<u8>,
    additional_info: Vec<u8>,
    suspicious: bool,
    seen: bool,
}

impl LogRow {
    pub(crate) const COLUMNS: &'static str =
        "id, logged_at, username, description, additional_info, suspicious, seen";

    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            logged_at: row.get("logged_at")?,
            username: row.get("username")?,
            description: row.get("description")?,
            additional_info: row.get("additional_info")?,
            suspicious: row.get("suspicious")?,
            seen: row.get("seen")?,
        })
    }
}

impl TryFrom<LogRow> for Stored<SealedLogEntry> {
    type Error = MobilityError;

    fn try_from(row: LogRow) -> Result<Self> {
        Ok(Stored::new(
            row.id,
            SealedLogEntry {
                logged_at: parse_timestamp(&row.logged_at)?,
                username: row.username,
                description: row.description,
                additional_info: row.additional_info,
                suspicious: row.suspicious,
                seen: row.seen,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_round_trip() {
        let now = Utc::now();
        assert_eq!(parse_timestamp(&now.to_rfc3339()).unwrap(), now);
    }

    #[test]
    fn test_bad_timestamp_is_storage_error() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(MobilityError::Storage(_))
        ));
    }
}
