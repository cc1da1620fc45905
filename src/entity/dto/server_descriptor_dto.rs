//! server descriptor, one entry of the known server list

use serde::{Deserialize, Serialize};

use crate::common::setting::DEFAULT_PRIORITY;

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerDescriptorDto {
    // display name, filled from the server hostname when empty
    #[serde(default)]
    pub name: String,
    pub address: String,
    pub port: u16,
    #[serde(default = "default_priority")]
    pub priority: i32,
    // color duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl ServerDescriptorDto {
    pub fn new(name: &str, address: &str, port: u16, priority: i32) -> Self {
        ServerDescriptorDto {
            name: name.to_string(),
            address: address.to_string(),
            port,
            priority,
            duration: None,
            selected: None,
        }
    }

    pub fn is_selected(&self) -> bool {
        self.selected.unwrap_or(false)
    }

    /// descriptors are identified by address and port
    pub fn same_endpoint(&self, other: &ServerDescriptorDto) -> bool {
        self.port == other.port && self.address == other.address
    }

    pub fn is_valid(&self) -> bool {
        !self.address.trim().is_empty() && self.port != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_optional_fields() {
        let dto: ServerDescriptorDto =
            serde_json::from_str(r#"{"address":"192.168.1.5","port":19444}"#).unwrap();
        assert_eq!(dto.name, "");
        assert_eq!(dto.priority, 50);
        assert!(!dto.is_selected());

        let json = serde_json::to_string(&dto).unwrap();
        assert!(!json.contains("selected"));
        assert!(!json.contains("duration"));
    }

    #[test]
    fn test_same_endpoint_ignores_name() {
        let a = ServerDescriptorDto::new("living room", "10.0.0.2", 19444, 50);
        let b = ServerDescriptorDto::new("", "10.0.0.2", 19444, 100);
        let c = ServerDescriptorDto::new("living room", "10.0.0.2", 19445, 50);
        assert!(a.same_endpoint(&b));
        assert!(!a.same_endpoint(&c));
    }
}
