use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mobility_core::VaultConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct MobilityConfig {
    pub vault: VaultConfig,
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    xdg_data_dir()
}

pub fn default_key_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("field.key"))
}

/// `--config` / `MOBILITY_CONFIG`, else the XDG default.
pub fn resolve_config_path(flag: Option<&str>) -> anyhow::Result<PathBuf> {
    match flag {
        Some(value) if !value.trim().is_empty() => Ok(PathBuf::from(value)),
        _ => default_config_path(),
    }
}

pub fn read_config(path: &Path) -> anyhow::Result<MobilityConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    let mut config: MobilityConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
    if let Ok(value) = std::env::var("MOBILITY_KEY_FILE") {
        if !value.trim().is_empty() {
            config.vault.key_path = PathBuf::from(value);
        }
    }
    Ok(config)
}

pub fn write_config(path: &Path, config: &MobilityConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    // Holds the super administrator hash
    mobility_core::fs::restrict_permissions(path).map_err(|e| {
        anyhow::anyhow!("Failed to restrict config {}: {}", path.display(), e)
    })?;
    Ok(())
}

pub fn missing_config_message(path: &Path) -> String {
    format!(
        "No config found at {}. Run `mobility init` first.",
        path.display()
    )
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("mobility"));
        }
    }
    Ok(home_dir()?.join(".config").join("mobility"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("mobility"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("mobility"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
