use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AlertSyncConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub reconcile: ReconcileSettings,
}

const VALID_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

impl AlertSyncConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_level("logging.level", &self.logging.level)?;
        check_level("logging.dependencies", &self.logging.dependencies)
    }
}

fn check_level(key: &str, level: &str) -> Result<(), String> {
    if !VALID_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        return Err(format!("{key} must be one of {VALID_LEVELS:?}, got '{level}'"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level for the AlertSync crates.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Level for everything else (HTTP stacks, runtimes, ...).
    #[serde(default = "default_dependency_level")]
    pub dependencies: String,
}
fn default_log_level() -> String {
    "info".into()
}
fn default_dependency_level() -> String {
    "warn".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dependencies: default_dependency_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ReconcileSettings {
    /// Log outgoing create/update payloads at debug level.
    #[serde(default)]
    pub log_payloads: bool,
}

pub mod loader {
    use super::AlertSyncConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Default configuration file, looked up in the working directory.
    pub const DEFAULT_CONFIG_FILE: &str = "alertsync.toml";

    pub fn load_config(path: Option<&str>) -> Result<AlertSyncConfig, String> {
        let mut builder = Config::builder();
        let file = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if file.exists() {
            builder = builder.add_source(File::from(file));
        }
        // Environment variable overrides, e.g., ALERTSYNC__LOGGING__LEVEL=debug
        builder = builder.add_source(
            Environment::with_prefix("ALERTSYNC")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AlertSyncConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
