use std::net::Ipv4Addr;

use async_trait::async_trait;

use crate::common::error::RemoteError;

#[async_trait]
pub trait InterfaceDiscovery: Send + Sync {
    fn can_detect_local_address(&self) -> bool;

    /// dotted quad ipv4 addresses of this host, no loopback, no duplicates
    async fn get_local_interfaces(&self) -> Result<Vec<String>, RemoteError>;
}

pub(crate) fn is_usable(ip: &Ipv4Addr) -> bool {
    !ip.is_loopback() && !ip.is_unspecified() && !ip.is_multicast() && !ip.is_broadcast()
}

/// keeps discovery order
pub(crate) fn push_candidate(list: &mut Vec<String>, ip: Ipv4Addr) -> bool {
    if !is_usable(&ip) {
        return false;
    }
    let ip = ip.to_string();
    if list.contains(&ip) {
        return false;
    }
    list.push(ip);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_candidate() {
        let mut list = Vec::new();
        assert!(push_candidate(&mut list, Ipv4Addr::new(192, 168, 1, 20)));
        assert!(!push_candidate(&mut list, Ipv4Addr::new(192, 168, 1, 20)));
        assert!(!push_candidate(&mut list, Ipv4Addr::LOCALHOST));
        assert!(!push_candidate(&mut list, Ipv4Addr::UNSPECIFIED));
        assert!(push_candidate(&mut list, Ipv4Addr::new(10, 0, 0, 3)));
        assert_eq!(list, vec!["192.168.1.20", "10.0.0.3"]);
    }
}
