use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use crate::common::error::{ErrorCode, RemoteError};
use crate::common::setting::DEFAULT_PRIORITY;
use crate::entity::bo::color_bo::ColorBo;
use crate::entity::bo::transform_bo::TransformAdjustmentBo;
use crate::entity::dto::server_descriptor_dto::ServerDescriptorDto;
use crate::entity::dto::server_info_dto::{EffectDto, ServerInfoDto};
use crate::network::scanner::ServerScanner;
use crate::network::InterfaceDiscovery;
use crate::server_control::{ServerControl, ServerControlEvent, ServerTarget};
use crate::settings::Settings;
use crate::socket::SocketFactory;
use crate::{debug, info, trace, warn};

const LOG_TAG: &str = "remote_controller";

pub struct RemoteController {
    settings: Settings,
    socket_factory: SocketFactory,
    control_tx: UnboundedSender<ServerControlEvent>,
    discovery: Box<dyn InterfaceDiscovery>,
    scanner: ServerScanner,
    // dropped on transport errors, the next command reconnects
    session: Option<ServerControl>,
    effects: Vec<EffectDto>,
    transform: Option<Value>,
}

impl RemoteController {
    pub fn new(
        settings: Settings,
        socket_factory: SocketFactory,
        control_tx: UnboundedSender<ServerControlEvent>,
        discovery: Box<dyn InterfaceDiscovery>,
        scanner: ServerScanner,
    ) -> Self {
        RemoteController {
            settings,
            socket_factory,
            control_tx,
            discovery,
            scanner,
            session: None,
            effects: Vec::new(),
            transform: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn effects(&self) -> &[EffectDto] {
        &self.effects
    }

    pub fn transform(&self) -> Option<&Value> {
        self.transform.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn fail(&self, err: RemoteError) -> RemoteError {
        warn!(LOG_TAG, "{}", err);
        let _ = self.control_tx.send(ServerControlEvent::Error(err.clone()));
        err
    }

    /// load the server list without connecting
    pub async fn load(&mut self) -> Result<(), RemoteError> {
        self.settings.load().await
    }

    /// load the server list and connect to the selected server
    pub async fn init(&mut self) -> Result<(), RemoteError> {
        self.load().await?;
        match self.settings.selected_server().cloned() {
            Some(server) => self.connect_to_server(&server).await,
            None => {
                info!(LOG_TAG, "no server selected");
                Ok(())
            }
        }
    }

    /// replace the session, then fetch effects and transform of the server
    pub async fn connect_to_server(
        &mut self,
        server: &ServerDescriptorDto,
    ) -> Result<(), RemoteError> {
        debug!(LOG_TAG, "connecting to {}:{}", server.address, server.port);
        self.close_session().await;

        let session = ServerControl::new(
            Some(ServerTarget::from(server)),
            (self.socket_factory)(),
            self.control_tx.clone(),
        );
        let opened = match session.connect().await {
            Ok(()) => session.get_server_info().await,
            Err(e) => Err(e),
        };
        let info = match opened {
            Ok(info) => info,
            Err(e) => {
                if let Err(close_err) = session.disconnect().await {
                    trace!(LOG_TAG, "disconnect after failure: {}", close_err);
                }
                return Err(e);
            }
        };
        self.session = Some(session);
        self.apply_server_info(server, &info).await
    }

    async fn apply_server_info(
        &mut self,
        server: &ServerDescriptorDto,
        info: &Value,
    ) -> Result<(), RemoteError> {
        let info = ServerInfoDto::from_info(info)?;

        let hostname = info.hostname.clone().unwrap_or_default();
        if server.name.is_empty() && !hostname.is_empty() {
            if let Some(index) = self.settings.index_of_server(server) {
                let mut named = self.settings.servers()[index].clone();
                named.name = hostname.clone();
                self.settings.update_server(index, named).await?;
            }
        }

        self.effects = info.effects;
        self.transform = info.transform.into_iter().next();
        let name = if server.name.is_empty() { hostname } else { server.name.clone() };
        info!(LOG_TAG, "connected to {}", name);
        Ok(())
    }

    async fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.disconnect().await {
                trace!(LOG_TAG, "disconnect: {}", e);
            }
        }
        self.effects.clear();
        self.transform = None;
    }

    fn selected(&self) -> Result<ServerDescriptorDto, RemoteError> {
        match self.settings.selected_server() {
            Some(server) => Ok(server.clone()),
            None => Err(self.fail(RemoteError::new(
                ErrorCode::MissingServer,
                "No server selected",
            ))),
        }
    }

    /// the live session, connected on first use
    async fn session(&mut self) -> Result<&ServerControl, RemoteError> {
        let selected = self.selected()?;
        if self.session.is_none() {
            self.connect_to_server(&selected).await?;
        }
        self.session.as_ref().ok_or_else(RemoteError::no_connection)
    }

    fn after_command(&mut self, result: Result<(), RemoteError>) -> Result<(), RemoteError> {
        if let Err(e) = result.as_ref() {
            if matches!(e.code, ErrorCode::TransportError | ErrorCode::NoConnection) {
                self.session = None;
            }
        }
        result
    }

    /// `duration_secs` falls back to the duration of the selected server
    pub async fn set_color(
        &mut self,
        color: &ColorBo,
        duration_secs: Option<u64>,
    ) -> Result<(), RemoteError> {
        let duration = duration_secs.or(self.selected()?.duration);
        let result = self.session().await?.set_color(color, duration).await;
        self.after_command(result)
    }

    pub async fn clear(&mut self) -> Result<(), RemoteError> {
        let result = self.session().await?.clear().await;
        self.after_command(result)
    }

    pub async fn clearall(&mut self) -> Result<(), RemoteError> {
        let result = self.session().await?.clearall().await;
        self.after_command(result)
    }

    pub async fn run_effect(&mut self, name: &str) -> Result<(), RemoteError> {
        self.session().await?;
        let effect = match self.effects.iter().find(|e| e.name == name) {
            Some(effect) => effect.clone(),
            None => {
                return Err(self.fail(RemoteError::new(
                    ErrorCode::UnknownError,
                    format!("Unknown effect: {name}"),
                )))
            }
        };
        let result = self.session().await?.run_effect(Some(&effect)).await;
        self.after_command(result)
    }

    /// patch the cached transform and send it as a whole
    pub async fn adjust_transform(
        &mut self,
        adjustment: &TransformAdjustmentBo,
    ) -> Result<(), RemoteError> {
        self.session().await?;
        let mut transform = self.transform.clone().unwrap_or(Value::Null);
        adjustment.apply(&mut transform);
        self.transform = Some(transform.clone());
        let result = self.session().await?.set_transform(Some(transform)).await;
        self.after_command(result)
    }

    fn checked(&self, server: ServerDescriptorDto) -> Result<ServerDescriptorDto, RemoteError> {
        if !server.is_valid() {
            return Err(self.fail(RemoteError::new(
                ErrorCode::InvalidServer,
                "Invalid server data",
            )));
        }
        let mut server = server;
        if server.priority == 0 {
            server.priority = DEFAULT_PRIORITY;
        }
        Ok(server)
    }

    /// follow a selection change of the server list
    async fn sync_selection(
        &mut self,
        before: Option<ServerDescriptorDto>,
        force: bool,
    ) -> Result<(), RemoteError> {
        match self.settings.selected_server().cloned() {
            None => {
                self.close_session().await;
                Ok(())
            }
            Some(selected) => {
                let changed = match before.as_ref() {
                    Some(before) => force || !before.same_endpoint(&selected),
                    None => true,
                };
                if changed {
                    self.connect_to_server(&selected).await
                } else {
                    Ok(())
                }
            }
        }
    }

    pub async fn add_server(&mut self, server: ServerDescriptorDto) -> Result<(), RemoteError> {
        let server = self.checked(server)?;
        let before = self.settings.selected_server().cloned();
        self.settings.add_server(server).await?;
        self.sync_selection(before, false).await
    }

    pub async fn select_server(&mut self, index: usize) -> Result<(), RemoteError> {
        let before = self.settings.selected_server().cloned();
        self.settings.set_selected_server(index).await?;
        self.sync_selection(before, false).await
    }

    pub async fn remove_server(&mut self, index: usize) -> Result<(), RemoteError> {
        let before = self.settings.selected_server().cloned();
        self.settings.remove_server(index).await?;
        self.sync_selection(before, false).await
    }

    pub async fn update_server(
        &mut self,
        index: usize,
        server: ServerDescriptorDto,
    ) -> Result<bool, RemoteError> {
        let server = self.checked(server)?;
        let before = self.settings.selected_server().cloned();
        let was_selected = self.settings.selected_index() == Some(index);
        if !self.settings.update_server(index, server).await? {
            return Ok(false);
        }
        self.sync_selection(before, was_selected).await?;
        Ok(true)
    }

    /// scan the local subnets and add every server found
    pub async fn detect_servers(&mut self) -> Result<Vec<ServerDescriptorDto>, RemoteError> {
        if !self.discovery.can_detect_local_address() {
            return Err(self.fail(RemoteError::new(
                ErrorCode::DiscoveryError,
                "Local address detection is not supported",
            )));
        }
        let local_ips = match self.discovery.get_local_interfaces().await {
            Ok(ips) => ips,
            Err(e) => return Err(self.fail(e)),
        };
        info!(LOG_TAG, "local interfaces: {:?}", local_ips);

        let found = self.scanner.scan(&local_ips).await;
        let before = self.settings.selected_server().cloned();
        let mut first_err = None;
        for server in found.iter() {
            if let Err(e) = self.settings.add_server(server.clone()).await {
                first_err.get_or_insert(e);
            }
        }
        // one reconnect once every server is stored
        if let Err(e) = self.sync_selection(before, false).await {
            first_err.get_or_insert(e);
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(found),
        }
    }
}
