//! persistence backends of the server list

pub mod file_storage;
pub mod memory_storage;
pub mod sqlite_storage;
pub mod traits;

use std::sync::Arc;

use serde::Deserialize;

pub use self::traits::Storage;
use self::file_storage::FileStorage;
use self::memory_storage::MemoryStorage;
use self::sqlite_storage::SqliteStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    File,
    Sqlite,
    Memory,
}

impl StorageKind {
    pub fn make(&self, path: &str) -> Arc<dyn Storage> {
        match self {
            StorageKind::File => Arc::new(FileStorage::new(path)),
            StorageKind::Sqlite => Arc::new(SqliteStorage::new(path)),
            StorageKind::Memory => Arc::new(MemoryStorage::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::dto::settings_dto::SettingsDto;

    #[tokio::test]
    async fn test_memory_kind_starts_empty() {
        let storage = StorageKind::Memory.make("ignored");
        assert_eq!(storage.get().await.unwrap(), None);
        storage.set(&SettingsDto::default()).await.unwrap();
        assert_eq!(storage.get().await.unwrap(), Some(SettingsDto::default()));
    }
}
