//! local interface discovery and lan scan for servers

pub mod platform_interfaces;
pub mod probe_interfaces;
pub mod scanner;
pub mod traits;

pub use self::traits::InterfaceDiscovery;

use self::platform_interfaces::PlatformInterfaces;
use self::probe_interfaces::ProbeInterfaces;

/// interface enumeration when the platform supports it, udp probes otherwise
pub fn default_discovery() -> Box<dyn InterfaceDiscovery> {
    let platform = PlatformInterfaces::new();
    if platform.can_detect_local_address() {
        Box::new(platform)
    } else {
        Box::new(ProbeInterfaces::new())
    }
}
