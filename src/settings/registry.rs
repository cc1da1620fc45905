use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use super::event::SettingsEvent;
use crate::common::error::{ErrorCode, RemoteError};
use crate::entity::dto::server_descriptor_dto::ServerDescriptorDto;
use crate::entity::dto::settings_dto::SettingsDto;
use crate::storage::Storage;
use crate::{debug, info, warn};

const LOG_TAG: &str = "settings";

pub struct Settings {
    storage: Arc<dyn Storage>,
    event_tx: UnboundedSender<SettingsEvent>,
    servers: Vec<ServerDescriptorDto>,
}

impl Settings {
    pub fn new(storage: Arc<dyn Storage>, event_tx: UnboundedSender<SettingsEvent>) -> Self {
        Settings {
            storage,
            event_tx,
            servers: Vec::new(),
        }
    }

    fn emit(&self, event: SettingsEvent) {
        // nobody listening is fine
        let _ = self.event_tx.send(event);
    }

    fn fail(&self, err: RemoteError) -> RemoteError {
        warn!(LOG_TAG, "{}", err);
        self.emit(SettingsEvent::Error(err.clone()));
        err
    }

    pub fn servers(&self) -> &[ServerDescriptorDto] {
        &self.servers
    }

    pub fn selected_server(&self) -> Option<&ServerDescriptorDto> {
        self.servers.iter().find(|s| s.is_selected())
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.servers.iter().position(|s| s.is_selected())
    }

    /// replace the in memory list with the stored one
    pub async fn load(&mut self) -> Result<(), RemoteError> {
        match self.storage.get().await {
            Ok(data) => {
                self.servers = data.map(|d| d.servers).unwrap_or_default();
                info!(LOG_TAG, "loaded {} servers", self.servers.len());
                self.emit(SettingsEvent::Loaded);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// write the whole list, memory is kept when the write fails
    pub async fn save(&self) -> Result<(), RemoteError> {
        let data = SettingsDto {
            servers: self.servers.clone(),
        };
        match self.storage.set(&data).await {
            Ok(()) => {
                debug!(LOG_TAG, "saved {} servers", self.servers.len());
                self.emit(SettingsEvent::Saved);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub async fn add_server(&mut self, server: ServerDescriptorDto) -> Result<(), RemoteError> {
        if self.index_of_server(&server).is_some() {
            debug!(LOG_TAG, "server {}:{} already known", server.address, server.port);
            return Ok(());
        }

        let mut server = server;
        if self.servers.is_empty() {
            server.selected = Some(true);
        } else if server.is_selected() {
            // selection only moves through set_selected_server
            server.selected = None;
        }
        info!(LOG_TAG, "server added: {}:{}", server.address, server.port);
        self.servers.push(server.clone());
        self.emit(SettingsEvent::ServerAdded(server));
        self.save().await
    }

    pub async fn set_selected_server(&mut self, index: usize) -> Result<(), RemoteError> {
        if index >= self.servers.len() {
            return Err(self.fail(RemoteError::out_of_bounds(index, self.servers.len())));
        }
        for server in self.servers.iter_mut() {
            server.selected = Some(false);
        }
        self.servers[index].selected = Some(true);
        info!(LOG_TAG, "server selected: {}", index);
        self.emit(SettingsEvent::ServerChanged(self.servers[index].clone()));
        self.save().await
    }

    pub async fn remove_server(&mut self, index: usize) -> Result<(), RemoteError> {
        if index >= self.servers.len() {
            return Err(self.fail(RemoteError::out_of_bounds(index, self.servers.len())));
        }
        let removed = self.servers.remove(index);
        if removed.is_selected() {
            if let Some(first) = self.servers.first_mut() {
                first.selected = Some(true);
            }
        }
        info!(LOG_TAG, "server removed: {}:{}", removed.address, removed.port);
        self.emit(SettingsEvent::ServerRemoved);
        self.save().await
    }

    /// returns false when the index is out of bounds
    /// an endpoint owned by another slot is rejected
    pub async fn update_server(
        &mut self,
        index: usize,
        server: ServerDescriptorDto,
    ) -> Result<bool, RemoteError> {
        if index >= self.servers.len() {
            return Ok(false);
        }
        if let Some(other) = self.index_of_server(&server) {
            if other != index {
                return Err(self.fail(RemoteError::new(
                    ErrorCode::InvalidServer,
                    format!("Server {}:{} already known", server.address, server.port),
                )));
            }
        }
        let Some(slot) = self.servers.get_mut(index) else {
            return Ok(false);
        };
        let mut server = server;
        server.selected = slot.selected;
        *slot = server.clone();
        self.emit(SettingsEvent::ServerChanged(server));
        self.save().await?;
        Ok(true)
    }

    pub fn index_of_server(&self, server: &ServerDescriptorDto) -> Option<usize> {
        self.servers.iter().position(|s| s.same_endpoint(server))
    }
}
