//! The assembled record store.

use std::fs;

use tracing::info;

use crate::auth::Actor;
use crate::config::VaultConfig;
use crate::crypto::{FieldCipher, FieldKey};
use crate::error::Result;
use crate::search::SearchEngine;
use crate::storage::Store;

/// Configuration, live store and field cipher, constructed once per process.
///
/// All guarded operations are methods on `Vault`, grouped by concern in the
/// `service`, `backup` and `auth::session` modules.
pub struct Vault {
    pub(crate) config: VaultConfig,
    pub(crate) store: Store,
    pub(crate) cipher: FieldCipher,
}

impl Vault {
    /// Load the field key and open the store.
    ///
    /// A missing or unreadable key is `KeyUnavailable`; callers must treat it
    /// as fatal.
    pub fn open(config: VaultConfig) -> Result<Self> {
        let cipher = FieldCipher::load(&config.key_path)?;
        Self::with_cipher(config, cipher)
    }

    /// Open with an already loaded key, ignoring `config.key_path`.
    ///
    /// Out of range code lifetimes are `InvalidInput`.
    pub fn with_key(config: VaultConfig, key: FieldKey) -> Result<Self> {
        Self::with_cipher(config, FieldCipher::new(key))
    }

    fn with_cipher(config: VaultConfig, cipher: FieldCipher) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.backup_dir)?;
        let store = Store::open(&config.store_path)?;
        info!(store = %config.store_path.display(), "vault opened");
        Ok(Self {
            config,
            store,
            cipher,
        })
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn cipher(&self) -> &FieldCipher {
        &self.cipher
    }

    /// The built-in super identity as an actor.
    pub fn super_admin(&self) -> Actor {
        Actor::super_admin(self.config.super_admin.username.clone())
    }

    /// Unguarded search engine over this vault; the `search_*` service
    /// methods wrap it with the role gate.
    pub fn search_engine(&self) -> SearchEngine<'_> {
        SearchEngine::new(&self.store, &self.cipher)
    }
}
