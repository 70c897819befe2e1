//! Persisted configuration record.
//!
//! Each field of [`Config`] is one row of `plugin_config`. Booleans are stored
//! as `"true"`/`"false"`, labels comma-joined. Keys missing from the table take
//! their default value.

use crate::config::{
    Config, KEY_EXTRACT_PATH, KEY_IN_PLACE_EXTRACTION, KEY_PVR_SUPPORT, KEY_SUPPORTED_LABELS,
    KEY_USE_NAME_FOLDER, LabelSet,
};
use crate::error::DatabaseError;
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;

use super::Database;

impl Database {
    /// Load the configuration record, filling in defaults for missing keys
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the key when a stored flag is not
    /// `true` or `false`.
    pub async fn load_config(&self) -> Result<Config> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT key, value FROM plugin_config
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to load configuration: {}",
                e
            )))
        })?;

        let values: HashMap<String, String> = rows.into_iter().collect();
        let defaults = Config::default();

        Ok(Config {
            extract_path: values
                .get(KEY_EXTRACT_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.extract_path),
            supported_labels: values
                .get(KEY_SUPPORTED_LABELS)
                .map(|raw| LabelSet::parse(raw))
                .unwrap_or(defaults.supported_labels),
            use_name_folder: parse_flag(&values, KEY_USE_NAME_FOLDER, defaults.use_name_folder)?,
            in_place_extraction: parse_flag(
                &values,
                KEY_IN_PLACE_EXTRACTION,
                defaults.in_place_extraction,
            )?,
            pvr_support: parse_flag(&values, KEY_PVR_SUPPORT, defaults.pvr_support)?,
        })
    }

    /// Persist every key of the configuration record in one transaction
    ///
    /// The extraction path is stored as text and must be valid UTF-8; nothing
    /// is written otherwise.
    pub async fn save_config(&self, config: &Config) -> Result<()> {
        let extract_path = config.extract_path.to_str().ok_or_else(|| {
            Error::config_key(
                KEY_EXTRACT_PATH,
                format!(
                    "extraction path must be valid UTF-8, got '{}'",
                    config.extract_path.display()
                ),
            )
        })?;

        let now = chrono::Utc::now().timestamp();
        let entries = [
            (KEY_EXTRACT_PATH, extract_path.to_string()),
            (KEY_SUPPORTED_LABELS, config.supported_labels.to_string()),
            (KEY_USE_NAME_FOLDER, config.use_name_folder.to_string()),
            (
                KEY_IN_PLACE_EXTRACTION,
                config.in_place_extraction.to_string(),
            ),
            (KEY_PVR_SUPPORT, config.pvr_support.to_string()),
        ];

        let mut tx = self.pool.begin().await.map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to begin transaction: {}",
                e
            )))
        })?;

        for (key, value) in &entries {
            sqlx::query(
                r#"
                INSERT INTO plugin_config (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
            )
            .bind(*key)
            .bind(value.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to save configuration key {}: {}",
                    key, e
                )))
            })?;
        }

        tx.commit().await.map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to commit configuration: {}",
                e
            )))
        })?;

        tracing::debug!(?config, "configuration saved");
        Ok(())
    }
}

fn parse_flag(values: &HashMap<String, String>, key: &str, default: bool) -> Result<bool> {
    match values.get(key).map(String::as_str) {
        None => Ok(default),
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => Err(Error::config_key(
            key,
            format!("expected true or false, got '{}'", other),
        )),
    }
}
