//! Scooter fleet records.
//!
//! Operators may read and search the fleet and update field telemetry
//! (see [`ScooterUpdate::OPERATOR_FIELDS`]); everything else requires
//! Administrator or SuperAdministrator.

use tracing::warn;

use crate::auth::{guard, AccessDenied, Actor, ADMINS, EVERYONE};
use crate::error::Result;
use crate::model::{NewLogEntry, NewScooter, Role, Scooter, ScooterUpdate};
use crate::search::{SearchQuery, SearchResults};
use crate::service::{not_found, nothing_to_update};
use crate::Vault;

impl Vault {
    pub fn create_scooter(&self, actor: &Actor, new: &NewScooter) -> Result<Scooter> {
        guard(actor, ADMINS, "create scooter", || -> Result<_> {
            let sealed = new.seal(&self.cipher)?;
            let id = self.store.insert_scooter(&sealed)?;
            self.audit(
                NewLogEntry::new(actor.username(), "New scooter added")
                    .with_info(format!("scooter #{}", id)),
            );
            self.load_scooter(id)
        })?
    }

    pub fn get_scooter(&self, actor: &Actor, id: i64) -> Result<Scooter> {
        guard(actor, EVERYONE, "view scooter", || self.load_scooter(id))?
    }

    pub fn list_scooters(&self, actor: &Actor) -> Result<Vec<Scooter>> {
        guard(actor, EVERYONE, "list scooters", || -> Result<_> {
            let mut scooters = Vec::new();
            for stored in self.store.list_scooters()? {
                match stored.open(&self.cipher) {
                    Ok(scooter) => scooters.push(scooter),
                    Err(err) => warn!(id = stored.id, error = %err, "skipping undecryptable scooter"),
                }
            }
            Ok(scooters)
        })?
    }

    pub fn update_scooter(&self, actor: &Actor, id: i64, update: &ScooterUpdate) -> Result<Scooter> {
        guard(actor, EVERYONE, "update scooter", || -> Result<_> {
            if actor.role() == Role::Operator && !update.restricted_fields().is_empty() {
                return Err(AccessDenied::new(actor.role(), ADMINS, "update scooter details").into());
            }
            if update.is_empty() {
                return Err(nothing_to_update());
            }
            let stored = self
                .store
                .get_scooter(id)?
                .ok_or_else(|| not_found("Scooter", id))?;
            let mut sealed = stored.record;
            update.apply(&mut sealed, &self.cipher)?;
            self.store.update_scooter(id, &sealed)?;
            self.audit(
                NewLogEntry::new(actor.username(), "Scooter updated").with_info(format!(
                    "scooter #{}: {}",
                    id,
                    update.changed_fields().join(", ")
                )),
            );
            self.load_scooter(id)
        })?
    }

    pub fn delete_scooter(&self, actor: &Actor, id: i64) -> Result<()> {
        guard(actor, ADMINS, "delete scooter", || -> Result<_> {
            if !self.store.delete_scooter(id)? {
                return Err(not_found("Scooter", id));
            }
            self.audit(
                NewLogEntry::new(actor.username(), "Scooter deleted")
                    .with_info(format!("scooter #{}", id)),
            );
            Ok(())
        })?
    }

    pub fn search_scooters(&self, actor: &Actor, query: &SearchQuery) -> Result<SearchResults<Scooter>> {
        guard(actor, EVERYONE, "search scooters", || self.search_engine().search(query))?
    }

    fn load_scooter(&self, id: i64) -> Result<Scooter> {
        self.store
            .get_scooter(id)?
            .ok_or_else(|| not_found("Scooter", id))?
            .open(&self.cipher)
    }
}
