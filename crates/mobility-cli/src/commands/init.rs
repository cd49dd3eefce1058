//! `mobility init`: field key, store, backup directory and config file.

use std::path::PathBuf;

use tracing::info;

use mobility_core::config::SuperAdminConfig;
use mobility_core::crypto::{hash_secret, FieldKey};
use mobility_core::model::validate;
use mobility_core::{Vault, VaultConfig};

use crate::app::{prompt_new_password, AppContext};
use crate::cli::InitArgs;
use crate::config::{
    default_data_dir, default_key_path, resolve_config_path, write_config, MobilityConfig,
};

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path(ctx.cli().config.as_deref())?;
    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {}. Use --force to overwrite it.",
            config_path.display()
        ));
    }

    let data_dir = match args.data_dir {
        Some(ref dir) => PathBuf::from(dir),
        None => default_data_dir()?,
    };
    let key_path = match args.key_file {
        Some(ref path) => PathBuf::from(path),
        None => default_key_path()?,
    };

    let username = args.super_username.trim().to_lowercase();
    if username.is_empty() {
        return Err(anyhow::anyhow!("Super administrator username cannot be empty"));
    }
    let password = prompt_new_password(ctx.cli().no_input)?;
    validate::password(&password)?;

    // An existing key still decrypts existing data, so it is never replaced.
    let key_created = if key_path.exists() {
        FieldKey::load(&key_path)?;
        false
    } else {
        FieldKey::generate().write_new(&key_path)?;
        true
    };

    let vault_config = VaultConfig::new(
        &data_dir,
        key_path.clone(),
        SuperAdminConfig {
            username: username.clone(),
            password_hash: hash_secret(&password)?,
        },
    );
    let vault = Vault::open(vault_config.clone())?;
    write_config(
        &config_path,
        &MobilityConfig {
            vault: vault_config,
        },
    )?;
    info!(config = %config_path.display(), "initialized");

    if !ctx.quiet() {
        println!("Initialized store at {}", vault.store().path().display());
        if key_created {
            println!("Created field key at {}", key_path.display());
        } else {
            println!("Using existing field key at {}", key_path.display());
        }
        println!("Config written to {}", config_path.display());
        println!("Log in as {} with the password you just chose.", username);
    }
    Ok(())
}
