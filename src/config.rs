//! Runtime configuration parsed from environment variables.
//!
//! Optional:
//! - `PIXEL_MIRROR_DATA_DIR`: directory for the database and settings (default `.pixel-mirror`)
//! - `PIXEL_MIRROR_DATABASE_URL`: SQLite URL (default `sqlite://<data_dir>/pixel-mirror.db`)
//! - `PIXEL_MIRROR_KEY_PREFIX`: settings key prefix (default `_PM-`)
//! - `PIXEL_MIRROR_VIEWPORT_WIDTH` / `PIXEL_MIRROR_VIEWPORT_HEIGHT`: headless viewport (default 1440 x 900)

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

use crate::consts::DEFAULT_KEY_PREFIX;

pub const DEFAULT_DATA_DIR: &str = ".pixel-mirror";
pub const DATABASE_FILE_NAME: &str = "pixel-mirror.db";
pub const SETTINGS_DIR_NAME: &str = "settings";
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1440.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 900.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub database_url: String,
    pub key_prefix: String,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Config {
    /// Build typed config from environment variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let data_dir = PathBuf::from(
            std::env::var("PIXEL_MIRROR_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()),
        );
        let database_url = std::env::var("PIXEL_MIRROR_DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite://{}", data_dir.join(DATABASE_FILE_NAME).display()));
        let key_prefix = match std::env::var("PIXEL_MIRROR_KEY_PREFIX") {
            Ok(prefix) if !prefix.is_empty() => prefix,
            _ => DEFAULT_KEY_PREFIX.to_string(),
        };

        Self {
            data_dir,
            database_url,
            key_prefix,
            viewport_width: env_parse("PIXEL_MIRROR_VIEWPORT_WIDTH", DEFAULT_VIEWPORT_WIDTH),
            viewport_height: env_parse("PIXEL_MIRROR_VIEWPORT_HEIGHT", DEFAULT_VIEWPORT_HEIGHT),
        }
    }

    /// Directory holding one file per settings key.
    #[must_use]
    pub fn settings_dir(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_DIR_NAME)
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
