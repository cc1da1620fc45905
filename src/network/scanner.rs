//! sweeps the /24 of every local interface for json servers
//! chunks run one after the other, probes inside a chunk run concurrently

use std::net::Ipv4Addr;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc;

use crate::common::error::RemoteError;
use crate::common::setting::{self, DEFAULT_PRIORITY};
use crate::entity::dto::server_descriptor_dto::ServerDescriptorDto;
use crate::entity::dto::server_info_dto::ServerInfoDto;
use crate::server_control::{ServerControl, ServerTarget};
use crate::socket::SocketFactory;
use crate::{debug, info};

const LOG_TAG: &str = "scanner";

pub struct ServerScanner {
    port: u16,
    probe_timeout: Duration,
    chunk_size: usize,
    socket_factory: SocketFactory,
}

impl ServerScanner {
    pub fn new(
        port: u16,
        probe_timeout: Duration,
        chunk_size: usize,
        socket_factory: SocketFactory,
    ) -> Self {
        ServerScanner {
            port,
            probe_timeout,
            chunk_size: chunk_size.max(1),
            socket_factory,
        }
    }

    pub fn from_config(config: &setting::Scan, socket_factory: SocketFactory) -> Self {
        ServerScanner::new(
            config.port,
            Duration::from_millis(config.probe_timeout_ms),
            config.chunk_size,
            socket_factory,
        )
    }

    /// `.1` to `.254` of every interface subnet, subnets shared by two
    /// interfaces are swept once
    pub fn candidate_addresses(local_ips: &[String]) -> Vec<String> {
        let mut subnets: Vec<[u8; 3]> = Vec::new();
        for ip in local_ips.iter() {
            let Ok(ip) = ip.parse::<Ipv4Addr>() else {
                continue;
            };
            let [a, b, c, _] = ip.octets();
            if !subnets.contains(&[a, b, c]) {
                subnets.push([a, b, c]);
            }
        }

        subnets
            .iter()
            .flat_map(|[a, b, c]| (1..=254u8).map(move |d| format!("{a}.{b}.{c}.{d}")))
            .collect()
    }

    pub async fn scan(&self, local_ips: &[String]) -> Vec<ServerDescriptorDto> {
        let candidates = Self::candidate_addresses(local_ips);
        info!(
            LOG_TAG,
            "scanning {} addresses on port {}",
            candidates.len(),
            self.port
        );

        let mut found: Vec<ServerDescriptorDto> = Vec::new();
        for chunk in candidates.chunks(self.chunk_size) {
            let results = join_all(chunk.iter().map(|address| self.probe(address))).await;
            for server in results.into_iter().flatten() {
                if !found.iter().any(|s| s.same_endpoint(&server)) {
                    info!(LOG_TAG, "server found: {}:{}", server.address, server.port);
                    found.push(server);
                }
            }
        }
        found
    }

    /// a throw away session: connect, serverinfo, disconnect
    pub async fn probe(&self, address: &str) -> Option<ServerDescriptorDto> {
        // session events are not interesting here
        let (tx, _rx) = mpsc::unbounded_channel();
        let control = ServerControl::new(
            Some(ServerTarget::new(address, self.port, DEFAULT_PRIORITY)),
            (self.socket_factory)(),
            tx,
        );

        let result = self.fetch_info(&control).await;
        if let Ok(Err(e)) | Err(e) = self.bounded(control.disconnect()).await {
            debug!(LOG_TAG, "disconnect {}: {}", address, e);
        }

        match result {
            Ok(info) => {
                let hostname = ServerInfoDto::from_info(&info)
                    .ok()
                    .and_then(|dto| dto.hostname)
                    .unwrap_or_default();
                Some(ServerDescriptorDto::new(
                    &hostname,
                    address,
                    self.port,
                    DEFAULT_PRIORITY,
                ))
            }
            Err(e) => {
                debug!(LOG_TAG, "no server at {}: {}", address, e);
                None
            }
        }
    }

    async fn fetch_info(&self, control: &ServerControl) -> Result<serde_json::Value, RemoteError> {
        self.bounded(control.connect()).await??;
        self.bounded(control.get_server_info()).await?
    }

    async fn bounded<F, T>(&self, fut: F) -> Result<T, RemoteError>
    where
        F: std::future::Future<Output = T>,
    {
        tokio::time::timeout(self.probe_timeout, fut)
            .await
            .map_err(|_| RemoteError::transport("Probe timed out"))
    }
}
