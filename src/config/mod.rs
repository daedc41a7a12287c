use crate::models::AppConfig;
use crate::store::FileStore;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the application configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "settings-core.yaml";

/// Prefix of environment variables that override the configuration file.
///
/// Nested keys are separated by `__`, e.g. `IDLER_SESSION__ERROR_DISPLAY_MS=2000`.
pub const ENV_PREFIX: &str = "IDLER";

/// Configuration manager for loading and saving the YAML application config.
///
/// Values are layered: built-in defaults, then `settings-core.yaml`, then
/// `IDLER_*` environment variables. Relative paths in the config are resolved
/// against the config directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing `settings-core.yaml`
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the application configuration.
    ///
    /// # Returns
    /// The layered AppConfig; defaults if neither the file nor any override exists
    pub fn load_app_config(&self) -> Result<AppConfig> {
        self.load_layered(None)
    }

    /// Layer defaults, the config file and `env` (the process environment when `None`)
    fn load_layered(&self, env: Option<config::Map<String, String>>) -> Result<AppConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, using defaults and environment",
                self.config_path
            );
        }

        let settings = config::Config::builder()
            .add_source(
                config::File::new(self.config_path.as_str(), config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let mut app_config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        app_config.data_dir = self.resolve(&app_config.data_dir);
        app_config.logging.log_dir = self.resolve(&app_config.logging.log_dir);

        tracing::info!(
            "Loaded app config: data_dir={}, log_dir={}",
            app_config.data_dir,
            app_config.logging.log_dir
        );
        Ok(app_config)
    }

    /// Save the application configuration file.
    ///
    /// # Arguments
    /// * `config` - The AppConfig to save
    pub fn save_app_config(&self, config: &AppConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize app config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write app config: {}", self.config_path))?;

        tracing::info!("Saved app config to {}", self.config_path);
        Ok(())
    }

    /// Open the file store at the configured data directory.
    pub fn open_store(&self, config: &AppConfig) -> Result<FileStore> {
        let data_dir = self.resolve(&config.data_dir);
        FileStore::open(&data_dir)
            .with_context(|| format!("Failed to open settings store at {}", data_dir))
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }
}
