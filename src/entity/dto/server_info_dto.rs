//! typed view of the `info` object of a serverinfo reply
//! unknown fields are ignored, missing ones fall back to defaults

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::error::RemoteError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDto {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerInfoDto {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub effects: Vec<EffectDto>,
    #[serde(default)]
    pub transform: Vec<Value>,
}

impl ServerInfoDto {
    pub fn from_info(info: &Value) -> Result<Self, RemoteError> {
        let dto = serde_json::from_value(info.clone())?;
        Ok(dto)
    }
}
