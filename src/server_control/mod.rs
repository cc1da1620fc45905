//! one session with one hyperion server
//! every exchange goes through the socket mutex, so a serverinfo
//! request and its reply never interleave with other commands

pub mod event;
pub mod session;

pub use self::event::ServerControlEvent;
pub use self::session::{ServerControl, ServerTarget};
