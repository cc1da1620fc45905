//! in process storage, nothing survives the process

use std::sync::Mutex;

use async_trait::async_trait;

use super::traits::Storage;
use crate::common::error::RemoteError;
use crate::entity::dto::settings_dto::SettingsDto;

#[derive(Default)]
pub struct MemoryStorage {
    data: Mutex<Option<SettingsDto>>,
    // simulates an unavailable medium
    unavailable: Mutex<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    pub fn with_data(data: SettingsDto) -> Self {
        MemoryStorage {
            data: Mutex::new(Some(data)),
            unavailable: Mutex::new(false),
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut flag) = self.unavailable.lock() {
            *flag = unavailable;
        }
    }

    fn check_available(&self) -> Result<(), RemoteError> {
        let unavailable = self
            .unavailable
            .lock()
            .map_err(|_| RemoteError::storage("memory storage lock poisoned"))?;
        if *unavailable {
            return Err(RemoteError::storage("storage unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self) -> Result<Option<SettingsDto>, RemoteError> {
        self.check_available()?;
        let data = self
            .data
            .lock()
            .map_err(|_| RemoteError::storage("memory storage lock poisoned"))?;
        Ok(data.clone())
    }

    async fn set(&self, data: &SettingsDto) -> Result<(), RemoteError> {
        self.check_available()?;
        let mut stored = self
            .data
            .lock()
            .map_err(|_| RemoteError::storage("memory storage lock poisoned"))?;
        *stored = Some(data.clone());
        Ok(())
    }
}
