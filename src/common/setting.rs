//! application config
//! - defaults for every field
//! - optional `config_<ENV>.toml` in the working directory
//! - `HYPERION__<SECTION>__<KEY>` environment overrides

use std::env;
use std::time::Duration;

use lazy_static::lazy_static;
use serde::Deserialize;

use super::error::RemoteError;
use crate::socket::SocketKind;
use crate::storage::StorageKind;

pub const DEFAULT_JSON_PORT: u16 = 19444;
pub const DEFAULT_PRIORITY: i32 = 50;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Env {
    pub env: String,
    pub log_level: String,
}

impl Default for Env {
    fn default() -> Self {
        Env {
            env: String::from("dev"),
            log_level: String::from("info"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Transport {
    pub kind: SocketKind,
    // no timeout when absent
    pub connect_timeout_ms: Option<u64>,
}

impl Default for Transport {
    fn default() -> Self {
        Transport {
            kind: SocketKind::Tcp,
            connect_timeout_ms: None,
        }
    }
}

impl Transport {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Storage {
    pub kind: StorageKind,
    pub path: String,
}

impl Default for Storage {
    fn default() -> Self {
        Storage {
            kind: StorageKind::File,
            path: String::from("cache/settings.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Server {
    pub default_port: u16,
    pub default_priority: i32,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            default_port: DEFAULT_JSON_PORT,
            default_priority: DEFAULT_PRIORITY,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Scan {
    pub port: u16,
    pub probe_timeout_ms: u64,
    pub chunk_size: usize,
}

impl Default for Scan {
    fn default() -> Self {
        Scan {
            port: DEFAULT_JSON_PORT,
            probe_timeout_ms: 1500,
            chunk_size: 64,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub env: Env,
    pub transport: Transport,
    pub storage: Storage,
    pub server: Server,
    pub scan: Scan,
}

impl AppConfig {
    /// build the config from `config_<env>.toml` (optional) and the environment
    pub fn load(env_name: &str) -> Result<Self, RemoteError> {
        let file_path = format!("config_{}", env_name);
        let config = config::Config::builder()
            .add_source(config::File::with_name(file_path.as_str()).required(false))
            .add_source(config::Environment::with_prefix("HYPERION").separator("__"))
            .build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;
        app_config.env.env = env_name.to_string();
        Ok(app_config)
    }

    pub fn get<'a>() -> &'a Self {
        // lazily loaded once per process
        lazy_static! {
            static ref CACHE: AppConfig = {
                let env_name = match env::var("ENV") {
                    Ok(e) => e,
                    Err(_) => String::from("dev"),
                };
                match AppConfig::load(env_name.as_str()) {
                    Ok(c) => c,
                    Err(e) => {
                        log::warn!("cannot load config for env '{}', use defaults: {}", env_name, e);
                        AppConfig::default()
                    }
                }
            };
        }
        &CACHE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.default_port, 19444);
        assert_eq!(config.server.default_priority, 50);
        assert_eq!(config.scan.chunk_size, 64);
        assert_eq!(config.transport.kind, SocketKind::Tcp);
        assert!(config.transport.connect_timeout().is_none());
    }

    #[test]
    fn test_load_without_file_falls_back_to_defaults() {
        let config = AppConfig::load("no_such_env_for_tests").unwrap();
        assert_eq!(config.env.env, "no_such_env_for_tests");
        assert_eq!(config.storage.kind, StorageKind::File);
    }
}
