//! websocket transport, `ws://address:port`
//! one text or binary message is one inbound unit

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::traits::{Peer, Socket};
use crate::common::error::RemoteError;
use crate::{debug, trace};

const LOG_TAG: &str = "web_socket";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Default)]
pub struct WebSocket {
    sink: Option<SplitSink<WsStream, Message>>,
    stream: Option<SplitStream<WsStream>>,
    open: bool,
}

impl WebSocket {
    pub fn new() -> Self {
        WebSocket::default()
    }

    fn invalid_handle() -> RemoteError {
        RemoteError::transport("Socket handle is invalid")
    }

    fn mark_closed(&mut self) {
        self.open = false;
    }
}

#[async_trait]
impl Socket for WebSocket {
    async fn create(&mut self) -> Result<(), RemoteError> {
        // the handle only exists once connected
        Ok(())
    }

    async fn connect(&mut self, peer: &Peer) -> Result<(), RemoteError> {
        let url = format!("ws://{}:{}", peer.address, peer.port);
        debug!(LOG_TAG, "connecting to peer {}", url);

        let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| RemoteError::transport(format!("WebSocket error: {e}")))?;
        let (sink, stream) = ws_stream.split();
        self.sink = Some(sink);
        self.stream = Some(stream);
        self.open = true;
        Ok(())
    }

    async fn is_connected(&mut self) -> bool {
        self.sink.is_some() && self.open
    }

    async fn close(&mut self) -> Result<(), RemoteError> {
        let mut sink = self.sink.take().ok_or_else(Self::invalid_handle)?;
        if self.open {
            if let Err(e) = sink.close().await {
                trace!(LOG_TAG, "close handshake failed: {}", e);
            }
        }
        self.stream = None;
        self.mark_closed();
        debug!(LOG_TAG, "socket closed");
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<u8>, RemoteError> {
        if self.sink.is_none() {
            return Err(Self::invalid_handle());
        }
        if !self.open {
            return Err(RemoteError::transport("No connection to peer"));
        }
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| RemoteError::transport("No connection to peer"))?;

        loop {
            match stream.next().await {
                Some(Ok(msg @ Message::Text(_))) | Some(Ok(msg @ Message::Binary(_))) => {
                    let data = msg.into_data();
                    trace!(LOG_TAG, "< {}", data_encoding::HEXLOWER.encode(&data));
                    return Ok(data.to_vec());
                }
                Some(Ok(Message::Close(_))) | None => {
                    self.mark_closed();
                    return Err(RemoteError::transport("Connection closed by peer"));
                }
                // ping, pong and raw frames are not protocol units
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    self.mark_closed();
                    return Err(RemoteError::transport(format!("WebSocket error: {e}")));
                }
            }
        }
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), RemoteError> {
        let open = self.open;
        let sink = self.sink.as_mut().ok_or_else(Self::invalid_handle)?;
        if !open {
            return Err(RemoteError::transport("No connection to peer"));
        }

        trace!(LOG_TAG, "> {}", data_encoding::HEXLOWER.encode(data));
        let text = String::from_utf8_lossy(data).into_owned();
        let sent = sink.send(Message::Text(text.into())).await;
        if let Err(e) = sent {
            self.mark_closed();
            return Err(RemoteError::transport(format!("WebSocket error: {e}")));
        }
        Ok(())
    }
}
