//! interface enumeration through getifaddrs, unix only

use async_trait::async_trait;

use super::traits::InterfaceDiscovery;
use crate::common::error::{ErrorCode, RemoteError};
use crate::debug;

const LOG_TAG: &str = "platform_interfaces";

#[derive(Default)]
pub struct PlatformInterfaces;

impl PlatformInterfaces {
    pub fn new() -> Self {
        PlatformInterfaces
    }
}

#[async_trait]
impl InterfaceDiscovery for PlatformInterfaces {
    fn can_detect_local_address(&self) -> bool {
        cfg!(unix)
    }

    async fn get_local_interfaces(&self) -> Result<Vec<String>, RemoteError> {
        let ips = enumerate()?;
        debug!(LOG_TAG, "local interfaces: {:?}", ips);
        Ok(ips)
    }
}

#[cfg(unix)]
fn enumerate() -> Result<Vec<String>, RemoteError> {
    use std::net::Ipv4Addr;

    use super::traits::push_candidate;

    let mut addrs: *mut libc::ifaddrs = std::ptr::null_mut();
    if unsafe { libc::getifaddrs(&mut addrs) } != 0 {
        return Err(RemoteError::new(
            ErrorCode::DiscoveryError,
            format!("getifaddrs failed: {}", std::io::Error::last_os_error()),
        ));
    }

    let mut ips = Vec::new();
    let mut cursor = addrs;
    while !cursor.is_null() {
        // the list stays valid until freeifaddrs
        let ifa = unsafe { &*cursor };
        if !ifa.ifa_addr.is_null() {
            let family = unsafe { (*ifa.ifa_addr).sa_family } as libc::c_int;
            if family == libc::AF_INET {
                let sin = unsafe { &*(ifa.ifa_addr as *const libc::sockaddr_in) };
                let ip = Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr));
                push_candidate(&mut ips, ip);
            }
        }
        cursor = ifa.ifa_next;
    }
    unsafe { libc::freeifaddrs(addrs) };
    Ok(ips)
}

#[cfg(not(unix))]
fn enumerate() -> Result<Vec<String>, RemoteError> {
    Err(RemoteError::new(
        ErrorCode::DiscoveryError,
        "Interface enumeration is not supported on this platform",
    ))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn test_enumerate() {
        let discovery = PlatformInterfaces::new();
        assert!(discovery.can_detect_local_address());

        let ips = discovery.get_local_interfaces().await.unwrap();
        for ip in ips.iter() {
            let parsed: Ipv4Addr = ip.parse().unwrap();
            assert!(!parsed.is_loopback());
        }
        let mut deduped = ips.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), ips.len());
    }
}
