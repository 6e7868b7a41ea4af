use super::Config;
use crate::error::ConfigError;
use crate::llm::SessionCredential;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// `~/.itinera`, where the config and default output live.
pub fn itinera_dir() -> Result<PathBuf> {
    UserDirs::new()
        .map(|u| u.home_dir().join(".itinera"))
        .context("Could not find home directory")
}

impl Config {
    /// Load `~/.itinera/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self> {
        let config_path = itinera_dir()?.join("config.toml");
        Self::load_or_init_at(&config_path)
    }

    /// Load `path`, writing defaults there if it does not exist yet.
    /// Environment overrides are applied before validation.
    pub fn load_or_init_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let mut config = if path.exists() {
            let contents = fs::read_to_string(path).context("Failed to read config file")?;
            let mut config: Config = toml::from_str(&contents)
                .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
            config.config_path = path.to_path_buf();
            config
        } else {
            let config = Self {
                config_path: path.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            tracing::info!(path = %path.display(), "wrote default config");
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}

/// Resolve the process-wide API key, loading `.env` from the working
/// directory first. Existing environment variables win over `.env`.
pub fn require_credential() -> Result<SessionCredential, crate::error::InputError> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(error) if error.not_found() => {}
        Err(error) => tracing::warn!(%error, "ignoring unreadable .env file"),
    }
    SessionCredential::from_env()
}
