//! application level remote: server list plus the current session

pub mod remote_controller;

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

pub use self::remote_controller::RemoteController;
use crate::common::setting::AppConfig;
use crate::network::default_discovery;
use crate::network::scanner::ServerScanner;
use crate::server_control::ServerControlEvent;
use crate::settings::{Settings, SettingsEvent};
use crate::socket::socket_factory;

/// settings registry backed by the configured storage
pub fn build_settings(config: &AppConfig, settings_tx: UnboundedSender<SettingsEvent>) -> Settings {
    let storage = config.storage.kind.make(&config.storage.path);
    Settings::new(storage, settings_tx)
}

/// controller wired from the app config
pub fn build_controller(
    config: &AppConfig,
    settings_tx: UnboundedSender<SettingsEvent>,
    control_tx: UnboundedSender<ServerControlEvent>,
) -> RemoteController {
    let factory = socket_factory(config.transport.kind, config.transport.connect_timeout());
    let scanner = ServerScanner::from_config(&config.scan, Arc::clone(&factory));
    RemoteController::new(
        build_settings(config, settings_tx),
        factory,
        control_tx,
        default_discovery(),
        scanner,
    )
}
