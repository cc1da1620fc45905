use crate::common::error::RemoteError;
use crate::entity::dto::server_descriptor_dto::ServerDescriptorDto;

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEvent {
    Loaded,
    Saved,
    Error(RemoteError),
    ServerAdded(ServerDescriptorDto),
    ServerChanged(ServerDescriptorDto),
    ServerRemoved,
}
