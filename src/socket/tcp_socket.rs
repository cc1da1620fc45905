//! raw tcp transport
//! - inbound data is split into lines by `LinesCodec`, one line per `read`
//! - outbound bytes are written as is, the caller adds the `\n`

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, LinesCodec};

use super::traits::{Peer, Socket};
use crate::common::error::RemoteError;
use crate::{debug, trace, warn};

const LOG_TAG: &str = "tcp_socket";

// serverinfo replies of big setups can reach a few hundred kilobytes
const MAX_LINE_LENGTH: usize = 4 * 1024 * 1024;

pub struct TcpSocket {
    // allocated by create, cleared by close
    handle: Option<String>,
    reader: Option<FramedRead<OwnedReadHalf, LinesCodec>>,
    writer: Option<OwnedWriteHalf>,
    connected: bool,
    connect_timeout: Option<Duration>,
}

impl TcpSocket {
    pub fn new(connect_timeout: Option<Duration>) -> Self {
        TcpSocket {
            handle: None,
            reader: None,
            writer: None,
            connected: false,
            connect_timeout,
        }
    }

    fn invalid_handle() -> RemoteError {
        RemoteError::transport("Socket handle is invalid")
    }

    fn drop_stream(&mut self) {
        self.reader = None;
        self.writer = None;
        self.connected = false;
    }
}

#[async_trait]
impl Socket for TcpSocket {
    async fn create(&mut self) -> Result<(), RemoteError> {
        if self.handle.is_some() {
            self.drop_stream();
        }
        let handle = uuid::Uuid::new_v4().to_string();
        debug!(LOG_TAG, "socket created: {}", handle);
        self.handle = Some(handle);
        Ok(())
    }

    async fn connect(&mut self, peer: &Peer) -> Result<(), RemoteError> {
        if self.handle.is_none() {
            return Err(Self::invalid_handle());
        }
        debug!(LOG_TAG, "connecting to peer {}:{}", peer.address, peer.port);

        let connecting = TcpStream::connect((peer.address.as_str(), peer.port));
        let result = match self.connect_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, connecting).await {
                Ok(r) => r,
                Err(_) => {
                    warn!(LOG_TAG, "connect to {}:{} timed out", peer.address, peer.port);
                    return Err(RemoteError::transport(format!(
                        "Could not connect to {}:{}",
                        peer.address, peer.port
                    )));
                }
            },
            None => connecting.await,
        };

        let stream = result.map_err(|e| {
            debug!(LOG_TAG, "connect result: {}", e);
            RemoteError::transport(format!("Could not connect to {}:{}", peer.address, peer.port))
        })?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!(LOG_TAG, "cannot set nodelay: {}", e);
        }

        let (read_half, write_half) = stream.into_split();
        self.reader = Some(FramedRead::new(
            read_half,
            LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
        ));
        self.writer = Some(write_half);
        self.connected = true;
        Ok(())
    }

    async fn is_connected(&mut self) -> bool {
        self.handle.is_some() && self.connected
    }

    async fn close(&mut self) -> Result<(), RemoteError> {
        let handle = self.handle.take().ok_or_else(Self::invalid_handle)?;
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.shutdown().await {
                trace!(LOG_TAG, "shutdown of {} failed: {}", handle, e);
            }
        }
        self.drop_stream();
        debug!(LOG_TAG, "socket closed: {}", handle);
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<u8>, RemoteError> {
        if self.handle.is_none() {
            return Err(Self::invalid_handle());
        }
        if !self.connected {
            return Err(RemoteError::transport("No connection to peer"));
        }
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| RemoteError::transport("No connection to peer"))?;

        match reader.next().await {
            Some(Ok(line)) => {
                trace!(LOG_TAG, "< {}", data_encoding::HEXLOWER.encode(line.as_bytes()));
                Ok(line.into_bytes())
            }
            Some(Err(e)) => {
                self.drop_stream();
                Err(RemoteError::transport(format!("Socket read error: {e}")))
            }
            None => {
                self.drop_stream();
                Err(RemoteError::transport("Connection closed by peer"))
            }
        }
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), RemoteError> {
        if self.handle.is_none() {
            return Err(Self::invalid_handle());
        }
        let writer = match (self.connected, self.writer.as_mut()) {
            (true, Some(writer)) => writer,
            _ => return Err(RemoteError::transport("No connection to peer")),
        };

        trace!(LOG_TAG, "> {}", data_encoding::HEXLOWER.encode(data));
        let mut written = writer.write_all(data).await;
        if written.is_ok() {
            written = writer.flush().await;
        }

        if let Err(e) = written {
            self.drop_stream();
            return Err(RemoteError::transport(format!("Socket write error: {e}")));
        }
        Ok(())
    }
}
