//! known server registry
//! - unique by address and port
//! - exactly one selected entry while the list is not empty

pub mod event;
pub mod registry;

pub use self::event::SettingsEvent;
pub use self::registry::Settings;
