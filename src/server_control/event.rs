use serde_json::Value;

use crate::common::error::RemoteError;
use crate::entity::dto::command_dto::Outbound;

#[derive(Debug, Clone, PartialEq)]
pub enum ServerControlEvent {
    Connected,
    Error(RemoteError),
    // the `info` object of a serverinfo reply
    ServerInfo(Value),
    CmdSent(Outbound),
    MalformedResponse(String),
}
