//! sqlite connection helper
//! tokio-rusqlite runs every statement on its own worker thread

use std::path::Path;

use tokio_rusqlite::Connection;

use super::error::RemoteError;
use crate::debug;

const LOG_TAG: &str = "sqlite";

pub struct SqliteConnection {
    // sqlite file path, ":memory:" is accepted
    file_name: String,
}

impl SqliteConnection {
    pub fn new(file_name: &str) -> Self {
        SqliteConnection {
            file_name: file_name.to_string(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// open the database, creating the parent folder of the file when missing
    pub async fn open(&self) -> Result<Connection, RemoteError> {
        if self.file_name != ":memory:" {
            if let Some(parent) = Path::new(&self.file_name).parent() {
                if !parent.as_os_str().is_empty() && tokio::fs::metadata(parent).await.is_err() {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        RemoteError::storage(format!(
                            "cannot create folder for {}: {e}",
                            self.file_name
                        ))
                    })?;
                    debug!(LOG_TAG, "created folder {:?}", parent);
                }
            }
        }
        let conn = Connection::open(self.file_name.as_str()).await?;
        Ok(conn)
    }
}
