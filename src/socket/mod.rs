//! pluggable transports for the json protocol

pub mod null_socket;
pub mod tcp_socket;
pub mod traits;
pub mod web_socket;

#[cfg(test)]
pub mod mock_socket;

use std::time::Duration;

use serde::Deserialize;

pub use self::traits::{Peer, Socket};
use self::null_socket::NullSocket;
use self::tcp_socket::TcpSocket;
use self::web_socket::WebSocket;

/// supported transports, picked from the config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketKind {
    Tcp,
    #[serde(alias = "ws")]
    WebSocket,
    #[serde(alias = "null")]
    None,
}

impl SocketKind {
    pub fn make(&self, connect_timeout: Option<Duration>) -> Box<dyn Socket> {
        match self {
            SocketKind::Tcp => Box::new(TcpSocket::new(connect_timeout)),
            SocketKind::WebSocket => Box::new(WebSocket::new()),
            SocketKind::None => Box::new(NullSocket::new()),
        }
    }
}

/// creates one fresh socket per session
pub type SocketFactory = std::sync::Arc<dyn Fn() -> Box<dyn Socket> + Send + Sync>;

pub fn socket_factory(kind: SocketKind, connect_timeout: Option<Duration>) -> SocketFactory {
    std::sync::Arc::new(move || kind.make(connect_timeout))
}
