//! Traveller records. Every operation requires Administrator or
//! SuperAdministrator.

use tracing::warn;

use crate::auth::{guard, Actor, ADMINS};
use crate::error::Result;
use crate::model::{NewLogEntry, NewTraveller, Traveller, TravellerUpdate};
use crate::search::{SearchQuery, SearchResults};
use crate::service::{not_found, nothing_to_update};
use crate::Vault;

impl Vault {
    pub fn create_traveller(&self, actor: &Actor, new: &NewTraveller) -> Result<Traveller> {
        guard(actor, ADMINS, "create traveller", || -> Result<_> {
            let sealed = new.seal(&self.cipher)?;
            let id = self.store.insert_traveller(&sealed)?;
            self.audit(
                NewLogEntry::new(actor.username(), "New traveller added")
                    .with_info(format!("traveller #{}", id)),
            );
            self.load_traveller(id)
        })?
    }

    pub fn get_traveller(&self, actor: &Actor, id: i64) -> Result<Traveller> {
        guard(actor, ADMINS, "view traveller", || self.load_traveller(id))?
    }

    pub fn list_travellers(&self, actor: &Actor) -> Result<Vec<Traveller>> {
        guard(actor, ADMINS, "list travellers", || -> Result<_> {
            let mut travellers = Vec::new();
            for stored in self.store.list_travellers()? {
                match stored.open(&self.cipher) {
                    Ok(traveller) => travellers.push(traveller),
                    Err(err) => warn!(id = stored.id, error = %err, "skipping undecryptable traveller"),
                }
            }
            Ok(travellers)
        })?
    }

    pub fn update_traveller(
        &self,
        actor: &Actor,
        id: i64,
        update: &TravellerUpdate,
    ) -> Result<Traveller> {
        guard(actor, ADMINS, "update traveller", || -> Result<_> {
            if update.is_empty() {
                return Err(nothing_to_update());
            }
            let stored = self
                .store
                .get_traveller(id)?
                .ok_or_else(|| not_found("Traveller", id))?;
            let mut sealed = stored.record;
            update.apply(&mut sealed, &self.cipher)?;
            self.store.update_traveller(id, &sealed)?;
            self.audit(
                NewLogEntry::new(actor.username(), "Traveller updated").with_info(format!(
                    "traveller #{}: {}",
                    id,
                    update.changed_fields().join(", ")
                )),
            );
            self.load_traveller(id)
        })?
    }

    pub fn delete_traveller(&self, actor: &Actor, id: i64) -> Result<()> {
        guard(actor, ADMINS, "delete traveller", || -> Result<_> {
            if !self.store.delete_traveller(id)? {
                return Err(not_found("Traveller", id));
            }
            self.audit(
                NewLogEntry::new(actor.username(), "Traveller deleted")
                    .with_info(format!("traveller #{}", id)),
            );
            Ok(())
        })?
    }

    pub fn search_travellers(
        &self,
        actor: &Actor,
        query: &SearchQuery,
    ) -> Result<SearchResults<Traveller>> {
        guard(actor, ADMINS, "search travellers", || -> Result<_> {
            self.search_engine().search(query)
        })?
    }

    fn load_traveller(&self, id: i64) -> Result<Traveller> {
        self.store
            .get_traveller(id)?
            .ok_or_else(|| not_found("Traveller", id))?
            .open(&self.cipher)
    }
}
