use async_trait::async_trait;

use crate::common::error::RemoteError;

/// remote endpoint a socket connects to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub address: String,
    pub port: u16,
}

impl Peer {
    pub fn new(address: &str, port: u16) -> Self {
        Peer {
            address: address.to_string(),
            port,
        }
    }
}

/// byte stream transport used by the server control session
/// - `read` hands out the next complete inbound unit (one line, one message)
/// - `is_connected` never fails
/// - `close` releases the underlying handle
#[async_trait]
pub trait Socket: Send {
    async fn create(&mut self) -> Result<(), RemoteError>;

    async fn connect(&mut self, peer: &Peer) -> Result<(), RemoteError>;

    async fn is_connected(&mut self) -> bool;

    async fn close(&mut self) -> Result<(), RemoteError>;

    async fn read(&mut self) -> Result<Vec<u8>, RemoteError>;

    async fn write(&mut self, data: &[u8]) -> Result<(), RemoteError>;
}
