mod config;
pub mod sqlite;
pub mod store;

pub use config::{AuthConfig, Config, DisplayConfig, TimerConfig};
pub use sqlite::SqliteStore;
pub use store::{
    fields, Document, DocumentStore, Fields, Query, Snapshot, StoreResult, Subscription,
    OWNER_FIELD,
};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `STUDYX_HOME` wins when set. Otherwise `~/.config/studyx`, or
/// `~/.config/studyx-dev` with `STUDYX_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = match std::env::var_os("STUDYX_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("STUDYX_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("studyx-dev")
            } else {
                base_dir.join("studyx")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
