use async_trait::async_trait;

use crate::common::error::RemoteError;
use crate::entity::dto::settings_dto::SettingsDto;

/// whole value persistence of the settings blob
/// - `get` yields the stored value, `None` when nothing was stored yet
/// - an unavailable medium is an `Err`, never a panic
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self) -> Result<Option<SettingsDto>, RemoteError>;

    async fn set(&self, data: &SettingsDto) -> Result<(), RemoteError>;
}
