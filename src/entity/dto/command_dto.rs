//! outbound commands of the json protocol
//! every command goes out as one json document followed by `\n`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::error::RemoteError;

/// effect reference inside an `effect` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectCommandDto {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum CommandDto {
    Color {
        color: [i64; 3],
        priority: i32,
        // milliseconds
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<u64>,
    },
    Clear {
        priority: i32,
    },
    // no priority, clears every source
    Clearall,
    Effect {
        effect: EffectCommandDto,
        priority: i32,
    },
    // no priority either
    Transform {
        transform: Value,
    },
    Serverinfo,
}

/// anything `send_command` accepts
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Command(CommandDto),
    Json(Value),
    // sent as is
    Raw(String),
}

impl Outbound {
    /// the text to put on the wire, `None` for an empty command
    pub fn payload(&self) -> Result<Option<String>, RemoteError> {
        match self {
            Outbound::Command(cmd) => Ok(Some(serde_json::to_string(cmd)?)),
            Outbound::Json(Value::Null) => Ok(None),
            Outbound::Json(value) => Ok(Some(serde_json::to_string(value)?)),
            Outbound::Raw(s) if s.is_empty() => Ok(None),
            Outbound::Raw(s) => Ok(Some(s.clone())),
        }
    }
}

impl From<CommandDto> for Outbound {
    fn from(cmd: CommandDto) -> Self {
        Outbound::Command(cmd)
    }
}

impl From<Value> for Outbound {
    fn from(value: Value) -> Self {
        Outbound::Json(value)
    }
}

impl From<String> for Outbound {
    fn from(s: String) -> Self {
        Outbound::Raw(s)
    }
}

impl From<&str> for Outbound {
    fn from(s: &str) -> Self {
        Outbound::Raw(s.to_string())
    }
}
