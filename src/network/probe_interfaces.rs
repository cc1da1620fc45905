//! fallback discovery: a udp socket "connected" towards a routable target
//! is bound by the os to the source address of the matching interface
//! nothing is sent on the wire

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use super::traits::{push_candidate, InterfaceDiscovery};
use crate::common::error::RemoteError;
use crate::{debug, trace};

const LOG_TAG: &str = "probe_interfaces";

// result is handed out this long after the last candidate
const QUIESCENCE: Duration = Duration::from_millis(200);

const PROBE_TARGETS: [&str; 5] = [
    "8.8.8.8:53",
    "10.0.0.1:9",
    "172.16.0.1:9",
    "192.168.0.1:9",
    "224.0.0.251:5353",
];

pub struct ProbeInterfaces {
    targets: Vec<String>,
    quiescence: Duration,
}

impl Default for ProbeInterfaces {
    fn default() -> Self {
        ProbeInterfaces {
            targets: PROBE_TARGETS.iter().map(|t| t.to_string()).collect(),
            quiescence: QUIESCENCE,
        }
    }
}

impl ProbeInterfaces {
    pub fn new() -> Self {
        ProbeInterfaces::default()
    }

    pub fn with_targets(targets: Vec<String>, quiescence: Duration) -> Self {
        ProbeInterfaces {
            targets,
            quiescence,
        }
    }
}

async fn probe(target: &str) -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").await.ok()?;
    if let Err(e) = socket.connect(target).await {
        trace!(LOG_TAG, "probe {} failed: {}", target, e);
        return None;
    }
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(_) => None,
    }
}

#[async_trait]
impl InterfaceDiscovery for ProbeInterfaces {
    fn can_detect_local_address(&self) -> bool {
        true
    }

    async fn get_local_interfaces(&self) -> Result<Vec<String>, RemoteError> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        for target in self.targets.iter() {
            let tx = tx.clone();
            let target = target.clone();
            tokio::spawn(async move {
                if let Some(ip) = probe(&target).await {
                    let _ = tx.send(ip);
                }
            });
        }
        // the channel closes once every probe is done
        drop(tx);

        let mut ips = Vec::new();
        loop {
            match tokio::time::timeout(self.quiescence, rx.recv()).await {
                Ok(Some(ip)) => {
                    if push_candidate(&mut ips, ip) {
                        debug!(LOG_TAG, "candidate: {}", ip);
                    }
                }
                Ok(None) | Err(_) => break,
            }
        }
        Ok(ips)
    }
}
