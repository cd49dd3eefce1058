//! `scooters` table.

use rusqlite::OptionalExtension;

use super::row::ScooterRow;
use super::{in_id_order, placeholders, Store};
use crate::error::{MobilityError, Result};
use crate::model::{SealedScooter, Stored};

impl Store {
    pub fn insert_scooter(&self, scooter: &SealedScooter) -> Result<i64> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO scooters (
                brand, model, serial_number, top_speed, battery_capacity, state_of_charge,
                target_soc_min, target_soc_max, latitude, longitude, out_of_service, mileage,
                last_maintenance, in_service_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                scooter.brand,
                scooter.model,
                scooter.serial_number,
                scooter.top_speed,
                scooter.battery_capacity,
                scooter.state_of_charge,
                scooter.target_soc_min,
                scooter.target_soc_max,
                scooter.latitude,
                scooter.longitude,
                scooter.out_of_service,
                scooter.mileage,
                scooter.last_maintenance.map(|date| date.to_string()),
                scooter.in_service_at.to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_scooter(&self, id: i64) -> Result<Option<Stored<SealedScooter>>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM scooters WHERE id = ?", ScooterRow::COLUMNS),
                [id],
                ScooterRow::read,
            )
            .optional()?;
        row.map(Stored::try_from).transpose()
    }

    pub fn list_scooters(&self) -> Result<Vec<Stored<SealedScooter>>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM scooters ORDER BY id",
            ScooterRow::COLUMNS
        ))?;
        let rows = stmt.query_map([], ScooterRow::read)?;
        let mut scooters = Vec::new();
        for row in rows {
            scooters.push(Stored::try_from(row?)?);
        }
        Ok(scooters)
    }

    /// Fetch scooters by id, in the order given.
    pub fn fetch_scooters(&self, ids: &[i64]) -> Result<Vec<Stored<SealedScooter>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM scooters WHERE id IN ({})",
            ScooterRow::COLUMNS,
            placeholders(ids.len())
        ))?;
        let rows = stmt.query_map(rusqlite::params_from_iter(ids.iter()), ScooterRow::read)?;
        let mut scooters = Vec::new();
        for row in rows {
            let scooter = Stored::try_from(row?)?;
            scooters.push((scooter.id, scooter));
        }
        Ok(in_id_order(ids, scooters))
    }

    pub fn update_scooter(&self, id: i64, scooter: &SealedScooter) -> Result<()> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE scooters SET
                brand = ?, model = ?, serial_number = ?, top_speed = ?, battery_capacity = ?,
                state_of_charge = ?, target_soc_min = ?, target_soc_max = ?, latitude = ?,
                longitude = ?, out_of_service = ?, mileage = ?, last_maintenance = ?
            WHERE id = ?
            "#,
            rusqlite::params![
                scooter.brand,
                scooter.model,
                scooter.serial_number,
                scooter.top_speed,
                scooter.battery_capacity,
                scooter.state_of_charge,
                scooter.target_soc_min,
                scooter.target_soc_max,
                scooter.latitude,
                scooter.longitude,
                scooter.out_of_service,
                scooter.mileage,
                scooter.last_maintenance.map(|date| date.to_string()),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(MobilityError::NotFound(format!("Scooter #{}", id)));
        }
        Ok(())
    }

    pub fn delete_scooter(&self, id: i64) -> Result<bool> {
        let conn = self.lock_conn()?;
        Ok(conn.execute("DELETE FROM scooters WHERE id = ?", [id])? > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::crypto::{FieldCipher, FieldKey};
    use crate::model::scooter::tests::sample_scooter;
    use crate::storage::Store;

    #[test]
    fn test_telemetry_round_trips_in_clear() {
        let cipher = FieldCipher::new(FieldKey::generate());
        let store = Store::open_in_memory().unwrap();
        let sealed = sample_scooter("SN1234567890").seal(&cipher).unwrap();

        let id = store.insert_scooter(&sealed).unwrap();
        let stored = store.get_scooter(id).unwrap().unwrap();
        assert_eq!(stored.state_of_charge, sealed.state_of_charge);
        assert_eq!(stored.last_maintenance, sealed.last_maintenance);
        assert_eq!(stored.serial_number(&cipher).unwrap(), "SN1234567890");
    }
}
