//! no-op base transport, never reaches a peer

use async_trait::async_trait;

use super::traits::{Peer, Socket};
use crate::common::error::RemoteError;
use crate::debug;

const LOG_TAG: &str = "null_socket";

#[derive(Debug, Default)]
pub struct NullSocket;

impl NullSocket {
    pub fn new() -> Self {
        NullSocket
    }
}

#[async_trait]
impl Socket for NullSocket {
    async fn create(&mut self) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn connect(&mut self, peer: &Peer) -> Result<(), RemoteError> {
        debug!(LOG_TAG, "connect to {}:{} ignored", peer.address, peer.port);
        Err(RemoteError::transport(format!(
            "Could not connect to {}:{}",
            peer.address, peer.port
        )))
    }

    async fn is_connected(&mut self) -> bool {
        false
    }

    async fn close(&mut self) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<u8>, RemoteError> {
        Err(RemoteError::transport("No connection to peer"))
    }

    async fn write(&mut self, _data: &[u8]) -> Result<(), RemoteError> {
        Err(RemoteError::transport("No connection to peer"))
    }
}
