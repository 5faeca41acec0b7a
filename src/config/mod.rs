use crate::models::{ModuleCatalog, UserConfig};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;

/// File name of the user preferences file
pub const USER_CONFIG_FILE: &str = "PyiBuilder Config.yaml";

/// File name of the common-module catalogue
pub const MODULE_CATALOG_FILE: &str = "PyiBuilder Modules.yaml";

/// Configuration manager for loading and saving YAML configuration files.
///
/// Manages two configuration files:
/// - User config (`PyiBuilder Config.yaml`): tool command, taskbar icon preference, logging
/// - Module catalogue (`PyiBuilder Modules.yaml`): common hidden imports by category
///
/// Build sessions are never written here.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    user_config_path: Utf8PathBuf,
    module_catalog_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing configuration files (e.g., "PyiBuilder Data")
    ///
    /// # Returns
    /// A new ConfigManager instance
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            user_config_path: config_dir.join(USER_CONFIG_FILE),
            module_catalog_path: config_dir.join(MODULE_CATALOG_FILE),
            config_dir,
        })
    }

    /// Load the user configuration file.
    ///
    /// # Returns
    /// The loaded UserConfig, or default if file doesn't exist
    pub fn load_user_config(&self) -> Result<UserConfig> {
        load_or_default(&self.user_config_path, "user config")
    }

    /// Save the user configuration file.
    pub fn save_user_config(&self, config: &UserConfig) -> Result<()> {
        save(&self.user_config_path, config, "user config")
    }

    /// Load the module catalogue.
    ///
    /// # Returns
    /// The loaded ModuleCatalog, or the built-in catalogue if file doesn't exist
    pub fn load_module_catalog(&self) -> Result<ModuleCatalog> {
        load_or_default(&self.module_catalog_path, "module catalog")
    }

    pub fn save_module_catalog(&self, catalog: &ModuleCatalog) -> Result<()> {
        save(&self.module_catalog_path, catalog, "module catalog")
    }

    /// Write default versions of any configuration file that is missing.
    ///
    /// Existing files are left untouched.
    ///
    /// # Returns
    /// The paths that were written
    pub fn init_defaults(&self) -> Result<Vec<Utf8PathBuf>> {
        let mut written = Vec::new();

        if !self.user_config_path.exists() {
            self.save_user_config(&UserConfig::default())?;
            written.push(self.user_config_path.clone());
        }

        if !self.module_catalog_path.exists() {
            self.save_module_catalog(&ModuleCatalog::default())?;
            written.push(self.module_catalog_path.clone());
        }

        Ok(written)
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn user_config_path(&self) -> &Utf8Path {
        &self.user_config_path
    }

    pub fn module_catalog_path(&self) -> &Utf8Path {
        &self.module_catalog_path
    }
}

fn load_or_default<T>(path: &Utf8Path, label: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        tracing::warn!("{} file not found at {}, using defaults", label, path);
        return Ok(T::default());
    }

    let file_contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}: {}", label, path))?;

    let config: T = serde_yaml_ng::from_str(&file_contents)
        .with_context(|| format!("Failed to parse {}: {}", label, path))?;

    tracing::info!("Loaded {} from {}", label, path);
    Ok(config)
}

fn save<T: Serialize>(path: &Utf8Path, config: &T, label: &str) -> Result<()> {
    let yaml_string = serde_yaml_ng::to_string(config)
        .with_context(|| format!("Failed to serialize {} to YAML", label))?;

    fs::write(path, yaml_string).with_context(|| format!("Failed to write {}: {}", label, path))?;

    tracing::info!("Saved {} to {}", label, path);
    Ok(())
}
