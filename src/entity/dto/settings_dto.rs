use serde::{Deserialize, Serialize};

use super::server_descriptor_dto::ServerDescriptorDto;

/// persisted blob, always written as a whole
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsDto {
    #[serde(default)]
    pub servers: Vec<ServerDescriptorDto>,
}
