//! Application context for the Mobility CLI.
//!
//! Bundles CLI arguments with the lazily loaded config so handlers get the
//! vault and the logged-in operator from one place.

use once_cell::unsync::OnceCell;
use tracing::debug;

use mobility_core::{Session, Vault};

use crate::cli::Cli;
use crate::config::{missing_config_message, read_config, resolve_config_path, MobilityConfig};

use super::prompt::prompt_password;

pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<MobilityConfig>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    pub fn json(&self) -> bool {
        self.cli.json
    }

    /// Get the config, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&MobilityConfig> {
        self.config.get_or_try_init(|| {
            let path = resolve_config_path(self.cli.config.as_deref())?;
            if !path.exists() {
                return Err(anyhow::anyhow!(missing_config_message(&path)));
            }
            debug!(path = %path.display(), "loading config");
            read_config(&path)
        })
    }

    /// Open the vault. Fails before anything else when the field key is unavailable.
    pub fn open_vault(&self) -> anyhow::Result<Vault> {
        let config = self.config()?.vault.clone();
        Vault::open(config).map_err(|e| anyhow::anyhow!("{}", e))
    }

    /// Open the vault and log in the acting operator.
    ///
    /// A session on a temporary password may only change that password.
    pub fn login(&self) -> anyhow::Result<(Vault, Session)> {
        let (vault, session) = self.login_allowing_temporary()?;
        if session.must_change_password() {
            return Err(anyhow::anyhow!(
                "Logged in with a temporary password. Run `mobility passwd` to choose a new one."
            ));
        }
        Ok((vault, session))
    }

    pub fn login_allowing_temporary(&self) -> anyhow::Result<(Vault, Session)> {
        let vault = self.open_vault()?;
        let (username, password) = self.credentials()?;
        let session = vault
            .login(&username, &password)
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok((vault, session))
    }

    /// Username from `--user` / `MOBILITY_USER`, password from `MOBILITY_PASSWORD` or a prompt.
    pub fn credentials(&self) -> anyhow::Result<(String, String)> {
        let username = self
            .cli
            .user
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No user given. Use --user or set MOBILITY_USER."))?;
        let password = prompt_password("MOBILITY_PASSWORD", "Password", self.cli.no_input)?;
        Ok((username, password))
    }
}
