//! json file storage, the blob lives in a single file

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::traits::Storage;
use crate::common::error::RemoteError;
use crate::entity::dto::settings_dto::SettingsDto;
use crate::{debug, warn};

const LOG_TAG: &str = "file_storage";

pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileStorage {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self) -> Result<Option<SettingsDto>, RemoteError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(LOG_TAG, "no settings stored at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => {
                return Err(RemoteError::storage(format!(
                    "cannot read {:?}: {e}",
                    self.path
                )))
            }
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        let settings = serde_json::from_str(&content).map_err(|e| {
            warn!(LOG_TAG, "settings file {:?} is corrupt: {}", self.path, e);
            RemoteError::storage(format!("cannot parse {:?}: {e}", self.path))
        })?;
        Ok(Some(settings))
    }

    async fn set(&self, data: &SettingsDto) -> Result<(), RemoteError> {
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| RemoteError::storage(format!("cannot serialize settings: {e}")))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    RemoteError::storage(format!("cannot create {:?}: {e}", parent))
                })?;
            }
        }

        // temp file renamed over the target
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|e| RemoteError::storage(format!("cannot write {:?}: {e}", tmp_path)))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| RemoteError::storage(format!("cannot write {:?}: {e}", self.path)))?;
        debug!(LOG_TAG, "settings saved to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::dto::server_descriptor_dto::ServerDescriptorDto;

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("settings.json"));
        assert_eq!(storage.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_creates_folder_and_get_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested/settings.json"));
        let mut server = ServerDescriptorDto::new("kodi", "192.168.0.10", 19444, 50);
        server.selected = Some(true);
        let data = SettingsDto {
            servers: vec![server],
        };

        storage.set(&data).await.unwrap();
        assert_eq!(storage.get().await.unwrap(), Some(data));
    }

    #[tokio::test]
    async fn test_unreadable_medium_is_error() {
        let dir = tempfile::tempdir().unwrap();
        // a folder where the file should be
        let storage = FileStorage::new(dir.path());
        let err = storage.get().await.unwrap_err();
        assert_eq!(err.code, crate::common::error::ErrorCode::StorageError);
    }
}
