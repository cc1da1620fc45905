//! sqlite storage, the blob is one row of the `settings` table

use async_trait::async_trait;
use rusqlite::OptionalExtension;

use super::traits::Storage;
use crate::common::dao::Dao;
use crate::common::error::RemoteError;
use crate::common::sqlite::SqliteConnection;
use crate::entity::dto::settings_dto::SettingsDto;
use crate::debug;

const LOG_TAG: &str = "sqlite_storage";

// key of the single settings row
const SETTINGS_KEY: &str = "servers";

pub struct SqliteStorage {
    connection: SqliteConnection,
}

#[async_trait]
impl Dao for SqliteStorage {
    fn connection(&self) -> &SqliteConnection {
        &self.connection
    }

    fn table_name(&self) -> &'static str {
        "settings"
    }

    async fn create_table(&self) -> Result<(), RemoteError> {
        let conn = self.connection.open().await?;
        conn.call(|conn| {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS settings (
                    key     TEXT PRIMARY KEY,
                    value   TEXT NOT NULL
                )",
                (),
            )
        })
        .await?;
        debug!(LOG_TAG, "settings table init");
        Ok(())
    }
}

impl SqliteStorage {
    pub fn new(file_name: &str) -> Self {
        SqliteStorage {
            connection: SqliteConnection::new(file_name),
        }
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get(&self) -> Result<Option<SettingsDto>, RemoteError> {
        self.ensure_table_exist().await?;
        let conn = self.connection.open().await?;

        let value: Option<String> = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT value FROM settings WHERE key = ?1",
                    [SETTINGS_KEY],
                    |row| row.get(0),
                )
                .optional()
            })
            .await?;

        match value {
            Some(json_str) => {
                let settings = serde_json::from_str(&json_str).map_err(|e| {
                    RemoteError::storage(format!("stored settings are corrupt: {e}"))
                })?;
                Ok(Some(settings))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, data: &SettingsDto) -> Result<(), RemoteError> {
        self.ensure_table_exist().await?;
        let json_str = serde_json::to_string(data)
            .map_err(|e| RemoteError::storage(format!("cannot serialize settings: {e}")))?;
        let conn = self.connection.open().await?;

        conn.call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                (SETTINGS_KEY, json_str),
            )
        })
        .await?;
        debug!(LOG_TAG, "settings saved to {}", self.connection.file_name());
        Ok(())
    }
}
