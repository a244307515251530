use super::Config;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    /// Load `~/.flowbridge/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let flowbridge_dir = home.join(".flowbridge");
        let config_path = flowbridge_dir.join("config.toml");

        if !flowbridge_dir.exists() {
            fs::create_dir_all(&flowbridge_dir).context("Failed to create .flowbridge directory")?;
        }

        if !config_path.exists() {
            let config = Self {
                config_path: config_path.clone(),
                ..Self::default()
            };
            config.save()?;
        }

        Self::load_from(&config_path)
    }

    /// Load an explicit config file; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str::<Config>(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.config_path = path.to_path_buf();

        config.apply_env_overrides();
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
