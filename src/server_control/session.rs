use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;

use super::event::ServerControlEvent;
use crate::common::error::{ErrorCode, RemoteError};
use crate::entity::bo::color_bo::ColorBo;
use crate::entity::dto::command_dto::{CommandDto, EffectCommandDto, Outbound};
use crate::entity::dto::server_descriptor_dto::ServerDescriptorDto;
use crate::entity::dto::server_info_dto::EffectDto;
use crate::socket::{Peer, Socket};
use crate::{debug, info, trace, warn};

const LOG_TAG: &str = "server_control";

// acks of earlier commands that may still sit in front of a serverinfo reply
const MAX_STALE_REPLIES: usize = 16;

/// endpoint and priority used for every command of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTarget {
    pub address: String,
    pub port: u16,
    pub priority: i32,
}

impl ServerTarget {
    pub fn new(address: &str, port: u16, priority: i32) -> Self {
        ServerTarget {
            address: address.to_string(),
            port,
            priority,
        }
    }

    fn peer(&self) -> Peer {
        Peer::new(&self.address, self.port)
    }
}

impl From<&ServerDescriptorDto> for ServerTarget {
    fn from(dto: &ServerDescriptorDto) -> Self {
        ServerTarget::new(&dto.address, dto.port, dto.priority)
    }
}

pub struct ServerControl {
    target: Option<ServerTarget>,
    socket: Mutex<Box<dyn Socket>>,
    connecting: AtomicBool,
    event_tx: UnboundedSender<ServerControlEvent>,
}

impl ServerControl {
    pub fn new(
        target: Option<ServerTarget>,
        socket: Box<dyn Socket>,
        event_tx: UnboundedSender<ServerControlEvent>,
    ) -> Self {
        ServerControl {
            target,
            socket: Mutex::new(socket),
            connecting: AtomicBool::new(false),
            event_tx,
        }
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting.load(Ordering::SeqCst)
    }

    fn emit(&self, event: ServerControlEvent) {
        let _ = self.event_tx.send(event);
    }

    fn fail(&self, err: RemoteError) -> RemoteError {
        warn!(LOG_TAG, "{}", err);
        self.emit(ServerControlEvent::Error(err.clone()));
        err
    }

    fn priority(&self) -> i32 {
        self.target
            .as_ref()
            .map(|t| t.priority)
            .unwrap_or(crate::common::setting::DEFAULT_PRIORITY)
    }

    pub async fn connect(&self) -> Result<(), RemoteError> {
        let target = match self.target.as_ref() {
            Some(target) => target,
            None => return Err(self.fail(RemoteError::missing_server())),
        };

        self.connecting.store(true, Ordering::SeqCst);
        let mut socket = self.socket.lock().await;
        let mut result = socket.create().await;
        if result.is_ok() {
            result = socket.connect(&target.peer()).await;
        }

        let result = match result {
            Ok(()) => {
                info!(LOG_TAG, "connected to {}:{}", target.address, target.port);
                self.emit(ServerControlEvent::Connected);
                Ok(())
            }
            Err(e) => {
                if let Err(close_err) = socket.close().await {
                    trace!(LOG_TAG, "close after failed connect: {}", close_err);
                }
                Err(self.fail(e))
            }
        };
        self.connecting.store(false, Ordering::SeqCst);
        result
    }

    pub async fn disconnect(&self) -> Result<(), RemoteError> {
        let mut socket = self.socket.lock().await;
        debug!(LOG_TAG, "disconnecting");
        socket.close().await
    }

    /// `duration_secs` of zero means no duration
    pub async fn set_color(
        &self,
        color: &ColorBo,
        duration_secs: Option<u64>,
    ) -> Result<(), RemoteError> {
        let duration = match duration_secs.filter(|d| *d > 0) {
            Some(secs) => match secs.checked_mul(1000) {
                Some(ms) => Some(ms),
                None => {
                    return Err(self.fail(RemoteError::new(
                        ErrorCode::InvalidCommand,
                        format!("Color duration too long: {secs}s"),
                    )))
                }
            },
            None => None,
        };
        let cmd = CommandDto::Color {
            color: color.to_int_array(),
            priority: self.priority(),
            duration,
        };
        self.send_command(cmd).await
    }

    pub async fn clear(&self) -> Result<(), RemoteError> {
        self.send_command(CommandDto::Clear {
            priority: self.priority(),
        })
        .await
    }

    pub async fn clearall(&self) -> Result<(), RemoteError> {
        self.send_command(CommandDto::Clearall).await
    }

    pub async fn run_effect(&self, effect: Option<&EffectDto>) -> Result<(), RemoteError> {
        let Some(effect) = effect else {
            return Ok(());
        };
        let cmd = CommandDto::Effect {
            effect: EffectCommandDto {
                name: effect.name.clone(),
                args: effect.args.clone(),
            },
            priority: self.priority(),
        };
        self.send_command(cmd).await
    }

    pub async fn set_transform(&self, transform: Option<Value>) -> Result<(), RemoteError> {
        match transform {
            None | Some(Value::Null) => Ok(()),
            Some(transform) => self.send_command(CommandDto::Transform { transform }).await,
        }
    }

    pub async fn send_command(&self, command: impl Into<Outbound>) -> Result<(), RemoteError> {
        let command = command.into();
        let payload = match command.payload() {
            Ok(Some(payload)) => payload,
            Ok(None) => return Ok(()),
            Err(e) => return Err(self.fail(e)),
        };

        let mut socket = self.socket.lock().await;
        if !socket.is_connected().await {
            return Err(self.fail(RemoteError::no_connection()));
        }
        let line = format!("{payload}\n");
        match socket.write(line.as_bytes()).await {
            Ok(()) => {
                debug!(LOG_TAG, "command sent: {}", payload);
                self.emit(ServerControlEvent::CmdSent(command));
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// request the server info and wait for its reply
    pub async fn get_server_info(&self) -> Result<Value, RemoteError> {
        let payload = Outbound::from(CommandDto::Serverinfo).payload()?.unwrap_or_default();

        let mut socket = self.socket.lock().await;
        if !socket.is_connected().await {
            return Err(self.fail(RemoteError::no_connection()));
        }
        let line = format!("{payload}\n");
        if let Err(e) = socket.write(line.as_bytes()).await {
            return Err(self.fail(e));
        }

        for _ in 0..=MAX_STALE_REPLIES {
            let data = match socket.read().await {
                Ok(data) => data,
                Err(e) => return Err(self.fail(e)),
            };
            match parse_reply(&data) {
                Ok(Reply::Info(info)) => {
                    debug!(LOG_TAG, "server info received");
                    self.emit(ServerControlEvent::ServerInfo(info.clone()));
                    return Ok(info);
                }
                Ok(Reply::Ack(command)) => {
                    trace!(LOG_TAG, "skipping stale {} reply", command);
                    continue;
                }
                Ok(Reply::Failed(reason)) => {
                    return Err(self.fail(RemoteError::new(ErrorCode::ServerError, reason)))
                }
                Err(e) => return Err(self.malformed(e)),
            }
        }
        Err(self.malformed(RemoteError::malformed("No server info in reply")))
    }

    fn malformed(&self, err: RemoteError) -> RemoteError {
        warn!(LOG_TAG, "{}", err);
        self.emit(ServerControlEvent::MalformedResponse(err.msg.clone()));
        err
    }
}

enum Reply {
    Info(Value),
    // reply to another command still queued on the stream
    Ack(String),
    // the server rejected the serverinfo request
    Failed(String),
}

fn parse_reply(data: &[u8]) -> Result<Reply, RemoteError> {
    let text = std::str::from_utf8(data)
        .map_err(|e| RemoteError::malformed(format!("Reply is not utf-8: {e}")))?;
    let mut value: Value = serde_json::from_str(text.trim())?;
    if let Some(info) = value.get_mut("info") {
        return Ok(Reply::Info(info.take()));
    }
    let command = value.get("command").and_then(Value::as_str).unwrap_or_default();
    if !command.is_empty() && command != "serverinfo" {
        return Ok(Reply::Ack(command.to_string()));
    }
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let reason = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Server info request failed");
        return Ok(Reply::Failed(reason.to_string()));
    }
    Err(RemoteError::malformed("No server info in reply"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::ErrorCode;
    use crate::socket::mock_socket::MockSocket;
    use serde_json::json;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn make(
        target: Option<ServerTarget>,
        socket: &MockSocket,
    ) -> (ServerControl, UnboundedReceiver<ServerControlEvent>) {
        let (tx, rx) = unbounded_channel();
        let control = ServerControl::new(target, Box::new(socket.clone()), tx);
        (control, rx)
    }

    fn target() -> Option<ServerTarget> {
        Some(ServerTarget::new("192.168.1.5", 19444, 50))
    }

    fn drain(rx: &mut UnboundedReceiver<ServerControlEvent>) -> Vec<ServerControlEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    #[tokio::test]
    async fn test_connect_without_server() {
        let socket = MockSocket::new();
        let (control, mut rx) = make(None, &socket);

        let err = control.connect().await.unwrap_err();
        assert_eq!(err.msg, "Missing server info");
        assert_eq!(err.code, ErrorCode::MissingServer);
        assert_eq!(socket.operations(), 0);
        assert_eq!(drain(&mut rx), vec![ServerControlEvent::Error(err)]);
    }

    #[tokio::test]
    async fn test_connect() {
        let socket = MockSocket::new();
        let (control, mut rx) = make(target(), &socket);

        control.connect().await.unwrap();
        assert!(!control.is_connecting());
        assert_eq!(drain(&mut rx), vec![ServerControlEvent::Connected]);
        let state = socket.state.lock().unwrap();
        assert_eq!(state.created, 1);
        assert_eq!(state.peers, vec![Peer::new("192.168.1.5", 19444)]);
    }

    #[tokio::test]
    async fn test_connect_failure_closes_socket() {
        let socket = MockSocket::new();
        socket.state.lock().unwrap().connect_error = Some("Could not connect to 192.168.1.5:19444".into());
        let (control, mut rx) = make(target(), &socket);

        let err = control.connect().await.unwrap_err();
        assert_eq!(err.msg, "Could not connect to 192.168.1.5:19444");
        assert!(!control.is_connecting());
        assert_eq!(socket.state.lock().unwrap().closed, 1);
        assert_eq!(drain(&mut rx), vec![ServerControlEvent::Error(err)]);
    }

    #[tokio::test]
    async fn test_send_raw_command() {
        let socket = MockSocket::connected();
        let (control, mut rx) = make(target(), &socket);

        control.send_command(r#"{"command":"clearall"}"#).await.unwrap();
        assert_eq!(socket.writes(), vec!["{\"command\":\"clearall\"}\n"]);
        assert_eq!(
            drain(&mut rx),
            vec![ServerControlEvent::CmdSent(Outbound::from(r#"{"command":"clearall"}"#))]
        );
    }

    #[tokio::test]
    async fn test_set_color() {
        let socket = MockSocket::connected();
        let (control, _rx) = make(target(), &socket);

        control
            .set_color(&ColorBo::new(10.7, 0.2, 255.9), Some(5))
            .await
            .unwrap();
        control.set_color(&ColorBo::black(), Some(0)).await.unwrap();
        assert_eq!(
            socket.writes(),
            vec![
                "{\"command\":\"color\",\"color\":[10,0,255],\"priority\":50,\"duration\":5000}\n",
                "{\"command\":\"color\",\"color\":[0,0,0],\"priority\":50}\n",
            ]
        );
    }

    #[tokio::test]
    async fn test_command_shapes() {
        let socket = MockSocket::connected();
        let (control, _rx) = make(Some(ServerTarget::new("10.0.0.1", 19444, 100)), &socket);

        control.clear().await.unwrap();
        control.clearall().await.unwrap();
        let effect = EffectDto {
            name: "Knight rider".to_string(),
            script: None,
            args: Some(json!({"speed": 1.5})),
        };
        control.run_effect(Some(&effect)).await.unwrap();
        control.set_transform(Some(json!({"id": "default"}))).await.unwrap();

        assert_eq!(
            socket.writes(),
            vec![
                "{\"command\":\"clear\",\"priority\":100}\n",
                "{\"command\":\"clearall\"}\n",
                "{\"command\":\"effect\",\"effect\":{\"name\":\"Knight rider\",\"args\":{\"speed\":1.5}},\"priority\":100}\n",
                "{\"command\":\"transform\",\"transform\":{\"id\":\"default\"}}\n",
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_commands_are_noops() {
        let socket = MockSocket::connected();
        let (control, mut rx) = make(target(), &socket);

        control.run_effect(None).await.unwrap();
        control.set_transform(None).await.unwrap();
        control.set_transform(Some(Value::Null)).await.unwrap();
        control.send_command("").await.unwrap();
        control.send_command(Value::Null).await.unwrap();
        assert!(socket.writes().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_send_while_disconnected() {
        let socket = MockSocket::new();
        let (control, mut rx) = make(target(), &socket);

        let err = control.clearall().await.unwrap_err();
        assert_eq!(err.msg, "No server connection");
        assert_eq!(err.code, ErrorCode::NoConnection);
        assert!(socket.writes().is_empty());
        assert_eq!(drain(&mut rx), vec![ServerControlEvent::Error(err)]);
    }

    #[tokio::test]
    async fn test_write_failure() {
        let socket = MockSocket::connected();
        socket.state.lock().unwrap().write_error = Some("Socket write error: broken pipe".into());
        let (control, mut rx) = make(target(), &socket);

        let err = control.clear().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TransportError);
        assert_eq!(drain(&mut rx), vec![ServerControlEvent::Error(err)]);
    }

    #[tokio::test]
    async fn test_server_info() {
        let socket = MockSocket::connected();
        socket.push_reply(r#"{"info":{"foo":1}}"#);
        let (control, mut rx) = make(target(), &socket);

        let info = control.get_server_info().await.unwrap();
        assert_eq!(info, json!({"foo": 1}));
        assert_eq!(socket.writes(), vec!["{\"command\":\"serverinfo\"}\n"]);
        assert_eq!(
            drain(&mut rx),
            vec![ServerControlEvent::ServerInfo(json!({"foo": 1}))]
        );
    }

    #[tokio::test]
    async fn test_server_info_skips_acks() {
        let socket = MockSocket::connected();
        socket.push_reply(r#"{"command":"color","success":true}"#);
        socket.push_reply(r#"{"command":"effect","success":false,"error":"unknown effect"}"#);
        socket.push_reply(r#"{"command":"serverinfo","info":{"hostname":"pi"},"success":true}"#);
        let (control, _rx) = make(target(), &socket);

        let info = control.get_server_info().await.unwrap();
        assert_eq!(info["hostname"], "pi");
    }

    #[tokio::test]
    async fn test_malformed_reply() {
        let socket = MockSocket::connected();
        socket.push_reply("not json");
        socket.push_reply(r#"{"foo":1}"#);
        let (control, mut rx) = make(target(), &socket);

        let err = control.get_server_info().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedResponse);
        let events = drain(&mut rx);
        assert!(matches!(events.as_slice(), [ServerControlEvent::MalformedResponse(_)]));

        let err = control.get_server_info().await.unwrap_err();
        assert_eq!(err.msg, "No server info in reply");
        assert_eq!(
            drain(&mut rx),
            vec![ServerControlEvent::MalformedResponse("No server info in reply".to_string())]
        );
    }

    #[tokio::test]
    async fn test_server_info_rejected_over_tcp() {
        use crate::socket::tcp_socket::TcpSocket;
        use std::time::Duration;
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut lines = BufReader::new(read_half).lines();
            let _request = lines.next_line().await.unwrap();
            let reply = "{\"command\":\"serverinfo\",\"error\":\"No Authorization\",\"success\":false,\"tan\":0}\n";
            write_half.write_all(reply.as_bytes()).await.unwrap();
            // the connection stays open until the client is done
            let _ = lines.next_line().await;
        });

        let (tx, mut rx) = unbounded_channel();
        let control = ServerControl::new(
            Some(ServerTarget::new("127.0.0.1", port, 50)),
            Box::new(TcpSocket::new(None)),
            tx,
        );
        control.connect().await.unwrap();

        let err = tokio::time::timeout(Duration::from_secs(5), control.get_server_info())
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ServerError);
        assert_eq!(err.msg, "No Authorization");
        assert_eq!(
            drain(&mut rx),
            vec![ServerControlEvent::Connected, ServerControlEvent::Error(err)]
        );

        control.disconnect().await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_server_info_rejected_without_error_text() {
        let socket = MockSocket::connected();
        socket.push_reply(r#"{"command":"serverinfo","success":false}"#);
        let (control, _rx) = make(target(), &socket);

        let err = control.get_server_info().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ServerError);
        assert_eq!(err.msg, "Server info request failed");
    }

    #[tokio::test]
    async fn test_color_duration_overflow() {
        let socket = MockSocket::connected();
        let (control, mut rx) = make(target(), &socket);

        let err = control
            .set_color(&ColorBo::new(1.0, 2.0, 3.0), Some(u64::MAX / 10))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCommand);
        assert!(socket.writes().is_empty());
        assert_eq!(drain(&mut rx), vec![ServerControlEvent::Error(err)]);

        // the largest duration that still fits goes out as is
        control
            .set_color(&ColorBo::black(), Some(u64::MAX / 1000))
            .await
            .unwrap();
        assert_eq!(socket.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_every_send_needs_a_connection() {
        let socket = MockSocket::new();
        let (control, mut rx) = make(target(), &socket);

        let err = control.set_color(&ColorBo::new(10.0, 20.0, 30.0), Some(5)).await.unwrap_err();
        assert_eq!(err.msg, "No server connection");
        let err = control.get_server_info().await.unwrap_err();
        assert_eq!(err.msg, "No server connection");
        let err = control.clear().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoConnection);

        assert!(socket.writes().is_empty());
        assert_eq!(socket.operations(), 0);
        assert_eq!(drain(&mut rx).len(), 3);
    }

    #[tokio::test]
    async fn test_server_info_read_failure() {
        // no reply queued, the mock read fails
        let socket = MockSocket::connected();
        let (control, mut rx) = make(target(), &socket);

        let err = control.get_server_info().await.unwrap_err();
        assert_eq!(err.msg, "No connection to peer");
        assert_eq!(drain(&mut rx), vec![ServerControlEvent::Error(err)]);
    }

    #[tokio::test]
    async fn test_disconnect() {
        let socket = MockSocket::connected();
        let (control, _rx) = make(target(), &socket);

        control.disconnect().await.unwrap();
        assert_eq!(socket.state.lock().unwrap().closed, 1);
        assert!(control.clearall().await.is_err());
    }
}
