//! `travellers` table.

use rusqlite::OptionalExtension;

use super::row::TravellerRow;
use super::{in_id_order, placeholders, Store};
use crate::error::{MobilityError, Result};
use crate::model::{SealedTraveller, Stored};

impl Store {
    pub fn insert_traveller(&self, traveller: &SealedTraveller) -> Result<i64> {
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO travellers (
                first_name, last_name, birth_date, gender, street_name, house_number,
                zip_code, city, email, mobile_phone, license_number, registered_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            rusqlite::params![
                traveller.first_name,
                traveller.last_name,
                traveller.birth_date,
                traveller.gender,
                traveller.street_name,
                traveller.house_number,
                traveller.zip_code,
                traveller.city,
                traveller.email,
                traveller.mobile_phone,
                traveller.license_number,
                traveller.registered_at.to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_traveller(&self, id: i64) -> Result<Option<Stored<SealedTraveller>>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM travellers WHERE id = ?", TravellerRow::COLUMNS),
                [id],
                TravellerRow::read,
            )
            .optional()?;
        row.map(Stored::try_from).transpose()
    }

    pub fn list_travellers(&self) -> Result<Vec<Stored<SealedTraveller>>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM travellers ORDER BY id",
            TravellerRow::COLUMNS
        ))?;
        let rows = stmt.query_map([], TravellerRow::read)?;
        let mut travellers = Vec::new();
        for row in rows {
            travellers.push(Stored::try_from(row?)?);
        }
        Ok(travellers)
    }

    /// Fetch travellers by id, in the order given.
    pub fn fetch_travellers(&self, ids: &[i64]) -> Result<Vec<Stored<SealedTraveller>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM travellers WHERE id IN ({})",
            TravellerRow::COLUMNS,
            placeholders(ids.len())
        ))?;
        let rows = stmt.query_map(rusqlite::params_from_iter(ids.iter()), TravellerRow::read)?;
        let mut travellers = Vec::new();
        for row in rows {
            let traveller = Stored::try_from(row?)?;
            travellers.push((traveller.id, traveller));
        }
        Ok(in_id_order(ids, travellers))
    }

    pub fn update_traveller(&self, id: i64, traveller: &SealedTraveller) -> Result<()> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE travellers SET
                first_name = ?, last_name = ?, birth_date = ?, gender = ?, street_name = ?,
                house_number = ?, zip_code = ?, city = ?, email = ?, mobile_phone = ?,
                license_number = ?
            WHERE id = ?
            "#,
            rusqlite::params![
                traveller.first_name,
                traveller.last_name,
                traveller.birth_date,
                traveller.gender,
                traveller.street_name,
                traveller.house_number,
                traveller.zip_code,
                traveller.city,
                traveller.email,
                traveller.mobile_phone,
                traveller.license_number,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(MobilityError::NotFound(format!("Traveller #{}", id)));
        }
        Ok(())
    }

    pub fn delete_traveller(&self, id: i64) -> Result<bool> {
        let conn = self.lock_conn()?;
        Ok(conn.execute("DELETE FROM travellers WHERE id = ?", [id])? > 0)
    }
}
