//! Scooters in the fleet.
//!
//! Brand, model and serial number are encrypted. Telemetry (speed, battery,
//! charge, location, mileage, service state) stays in clear so it can be
//! range-queried; it identifies no person.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::crypto::FieldCipher;
use crate::error::Result;
use crate::model::validate;
use crate::model::Stored;

/// Field bundle for putting a scooter into service.
#[derive(Debug, Clone)]
pub struct NewScooter {
    pub brand: String,
    pub model: String,
    pub serial_number: String,
    /// km/h
    pub top_speed: u32,
    /// Wh
    pub battery_capacity: u32,
    /// Percent
    pub state_of_charge: u8,
    pub target_soc_min: u8,
    pub target_soc_max: u8,
    pub latitude: f64,
    pub longitude: f64,
    pub out_of_service: bool,
    /// km
    pub mileage: f64,
    /// `YYYY-MM-DD`
    pub last_maintenance: Option<String>,
}

impl NewScooter {
    pub fn seal(&self, cipher: &FieldCipher) -> Result<SealedScooter> {
        let brand = validate::label("brand", &self.brand)?;
        let model = validate::label("model", &self.model)?;
        let serial_number = validate::serial_number(&self.serial_number)?;
        let top_speed = validate::top_speed(self.top_speed)?;
        let battery_capacity = validate::battery_capacity(self.battery_capacity)?;
        let state_of_charge = validate::percentage("state_of_charge", self.state_of_charge)?;
        let (target_soc_min, target_soc_max) =
            validate::target_range(self.target_soc_min, self.target_soc_max)?;
        let latitude = validate::latitude(self.latitude)?;
        let longitude = validate::longitude(self.longitude)?;
        let mileage = validate::mileage(self.mileage)?;
        let last_maintenance = self
            .last_maintenance
            .as_deref()
            .map(|value| validate::iso_date("last_maintenance", value, Utc::now().date_naive()))
            .transpose()?;

        Ok(SealedScooter {
            brand: cipher.encrypt_field(&brand)?,
            model: cipher.encrypt_field(&model)?,
            serial_number: cipher.encrypt_field(&serial_number)?,
            top_speed,
            battery_capacity,
            state_of_charge,
            target_soc_min,
            target_soc_max,
            latitude,
            longitude,
            out_of_service: self.out_of_service,
            mileage,
            last_maintenance,
            in_service_at: Utc::now(),
        })
    }
}

/// A scooter as persisted.
#[derive(Debug, Clone)]
pub struct SealedScooter {
    pub(crate) brand: Vec<u8>,
    pub(crate) model: Vec<u8>,
    pub(crate) serial_number: Vec<u8>,
    pub top_speed: u32,
    pub battery_capacity: u32,
    pub state_of_charge: u8,
    pub target_soc_min: u8,
    pub target_soc_max: u8,
    pub latitude: f64,
    pub longitude: f64,
    pub out_of_service: bool,
    pub mileage: f64,
    pub last_maintenance: Option<NaiveDate>,
    pub in_service_at: DateTime<Utc>,
}

impl SealedScooter {
    pub fn serial_number(&self, cipher: &FieldCipher) -> Result<String> {
        cipher.decrypt_field(&self.serial_number)
    }
}

impl Stored<SealedScooter> {
    pub fn open(&self, cipher: &FieldCipher) -> Result<Scooter> {
        Ok(Scooter {
            id: self.id,
            brand: cipher.decrypt_field(&self.brand)?,
            model: cipher.decrypt_field(&self.model)?,
            serial_number: cipher.decrypt_field(&self.serial_number)?,
            top_speed: self.top_speed,
            battery_capacity: self.battery_capacity,
            state_of_charge: self.state_of_charge,
            target_soc_min: self.target_soc_min,
            target_soc_max: self.target_soc_max,
            latitude: self.latitude,
            longitude: self.longitude,
            out_of_service: self.out_of_service,
            mileage: self.mileage,
            last_maintenance: self.last_maintenance,
            in_service_at: self.in_service_at,
        })
    }
}

/// Fully decrypted scooter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scooter {
    pub id: i64,
    pub brand: String,
    pub model: String,
    pub serial_number: String,
    pub top_speed: u32,
    pub battery_capacity: u32,
    pub state_of_charge: u8,
    pub target_soc_min: u8,
    pub target_soc_max: u8,
    pub latitude: f64,
    pub longitude: f64,
    pub out_of_service: bool,
    pub mileage: f64,
    pub last_maintenance: Option<NaiveDate>,
    pub in_service_at: DateTime<Utc>,
}

/// Partial update of a scooter.
#[derive(Debug, Clone, Default)]
pub struct ScooterUpdate {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub top_speed: Option<u32>,
    pub battery_capacity: Option<u32>,
    pub state_of_charge: Option<u8>,
    pub target_soc_min: Option<u8>,
    pub target_soc_max: Option<u8>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub out_of_service: Option<bool>,
    pub mileage: Option<f64>,
    pub last_maintenance: Option<String>,
}

impl ScooterUpdate {
    /// Fields an operator may change in the field.
    pub const OPERATOR_FIELDS: [&'static str; 6] = [
        "state_of_charge",
        "latitude",
        "longitude",
        "out_of_service",
        "mileage",
        "last_maintenance",
    ];

    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("brand", self.brand.is_some()),
            ("model", self.model.is_some()),
            ("serial_number", self.serial_number.is_some()),
            ("top_speed", self.top_speed.is_some()),
            ("battery_capacity", self.battery_capacity.is_some()),
            ("state_of_charge", self.state_of_charge.is_some()),
            ("target_soc_min", self.target_soc_min.is_some()),
            ("target_soc_max", self.target_soc_max.is_some()),
            ("latitude", self.latitude.is_some()),
            ("longitude", self.longitude.is_some()),
            ("out_of_service", self.out_of_service.is_some()),
            ("mileage", self.mileage.is_some()),
            ("last_maintenance", self.last_maintenance.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Changed fields outside [`Self::OPERATOR_FIELDS`].
    pub fn restricted_fields(&self) -> Vec<&'static str> {
        self.changed_fields()
            .into_iter()
            .filter(|field| !Self::OPERATOR_FIELDS.contains(field))
            .collect()
    }

    /// Validate the merged record, then write the changes onto `sealed`.
    ///
    /// The target charge window is checked against the resulting min and max,
    /// so `min < max` holds after every update.
    pub(crate) fn apply(&self, sealed: &mut SealedScooter, cipher: &FieldCipher) -> Result<()> {
        let brand = self.brand.as_deref().map(|v| validate::label("brand", v)).transpose()?;
        let model = self.model.as_deref().map(|v| validate::label("model", v)).transpose()?;
        let serial_number = self
            .serial_number
            .as_deref()
            .map(validate::serial_number)
            .transpose()?;
        let top_speed = self.top_speed.map(validate::top_speed).transpose()?;
        let battery_capacity = self
            .battery_capacity
            .map(validate::battery_capacity)
            .transpose()?;
        let state_of_charge = self
            .state_of_charge
            .map(|v| validate::percentage("state_of_charge", v))
            .transpose()?;
        let (target_soc_min, target_soc_max) = validate::target_range(
            self.target_soc_min.unwrap_or(sealed.target_soc_min),
            self.target_soc_max.unwrap_or(sealed.target_soc_max),
        )?;
        let latitude = self.latitude.map(validate::latitude).transpose()?;
        let longitude = self.longitude.map(validate::longitude).transpose()?;
        let mileage = self.mileage.map(validate::mileage).transpose()?;
        let last_maintenance = self
            .last_maintenance
            .as_deref()
            .map(|value| validate::iso_date("last_maintenance", value, Utc::now().date_naive()))
            .transpose()?;

        let brand = brand.map(|v| cipher.encrypt_field(&v)).transpose()?;
        let model = model.map(|v| cipher.encrypt_field(&v)).transpose()?;
        let serial_number = serial_number.map(|v| cipher.encrypt_field(&v)).transpose()?;

        if let Some(v) = brand {
            sealed.brand = v;
        }
        if let Some(v) = model {
            sealed.model = v;
        }
        if let Some(v) = serial_number {
            sealed.serial_number = v;
        }
        if let Some(v) = top_speed {
            sealed.top_speed = v;
        }
        if let Some(v) = battery_capacity {
            sealed.battery_capacity = v;
        }
        if let Some(v) = state_of_charge {
            sealed.state_of_charge = v;
        }
        sealed.target_soc_min = target_soc_min;
        sealed.target_soc_max = target_soc_max;
        if let Some(v) = latitude {
            sealed.latitude = v;
        }
        if let Some(v) = longitude {
            sealed.longitude = v;
        }
        if let Some(v) = self.out_of_service {
            sealed.out_of_service = v;
        }
        if let Some(v) = mileage {
            sealed.mileage = v;
        }
        if let Some(v) = last_maintenance {
            sealed.last_maintenance = Some(v);
        }
        Ok(())
    }
}
