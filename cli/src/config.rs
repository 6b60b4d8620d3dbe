//! Optional TOML configuration file.
//!
//! Every field is optional; command-line flags override config values,
//! which override built-in defaults.
//!
//! ```toml
//! database = "data/library.db"
//!
//! [backup]
//! dir = "data/backup"
//! interval_secs = 10800
//! ```

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Default database file path.
    pub database: Option<String>,
    pub backup: BackupConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct BackupConfig {
    /// Directory holding artifacts and checkpoints.
    pub dir: Option<String>,
    /// Automatic backup interval in seconds; `-1` disables.
    pub interval_secs: Option<i64>,
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|err| format!("reading config file {}: {err}", path.display()))?;
    toml::from_str(&contents)
        .map_err(|err| format!("parsing config file {}: {err}", path.display()))
}
