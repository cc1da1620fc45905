use std::fmt;
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    // unknown error
    UnknownError = 1000,
    // no target server configured for the session
    MissingServer = 1001,
    // socket create / connect / read / write failed
    TransportError = 1002,
    // tried to talk to the server without a live connection
    NoConnection = 1003,
    // persistence medium unavailable or failed
    StorageError = 1004,
    // reply from the server could not be decoded
    MalformedResponse = 1005,
    // server list index out of range
    IndexOutOfBounds = 1006,
    // server descriptor lacks address or port
    InvalidServer = 1007,
    // local interface / server discovery failed
    DiscoveryError = 1008,
    // application config could not be loaded
    ConfigError = 1009,
    // the server answered a request with success false
    ServerError = 1010,
    // command arguments out of range
    InvalidCommand = 1011,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u16)
    }
}

/// Error shared by every component of the remote client.
///
/// `msg` is the human readable reason which is also what the event
/// consumers display, e.g. `"No server connection"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("hyperion remote error code: {code}, msg: {msg}")]
pub struct RemoteError {
    pub code: ErrorCode,
    pub msg: String,
}

impl RemoteError {
    pub fn new(code: ErrorCode, msg: impl Into<String>) -> Self {
        RemoteError {
            code,
            msg: msg.into(),
        }
    }

    pub fn missing_server() -> Self {
        Self::new(ErrorCode::MissingServer, "Missing server info")
    }

    pub fn no_connection() -> Self {
        Self::new(ErrorCode::NoConnection, "No server connection")
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::TransportError, msg)
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, msg)
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedResponse, msg)
    }

    pub fn out_of_bounds(index: usize, len: usize) -> Self {
        Self::new(
            ErrorCode::IndexOutOfBounds,
            format!("Server index {index} out of bounds, list has {len} entries"),
        )
    }
}

impl From<std::io::Error> for RemoteError {
    fn from(e: std::io::Error) -> Self {
        RemoteError::transport(e.to_string())
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        RemoteError::malformed(e.to_string())
    }
}

impl From<tokio_rusqlite::Error> for RemoteError {
    fn from(e: tokio_rusqlite::Error) -> Self {
        RemoteError::storage(format!("sqlite error: {e}"))
    }
}

impl From<rusqlite::Error> for RemoteError {
    fn from(e: rusqlite::Error) -> Self {
        RemoteError::storage(format!("sqlite error: {e}"))
    }
}

impl From<config::ConfigError> for RemoteError {
    fn from(e: config::ConfigError) -> Self {
        RemoteError::new(ErrorCode::ConfigError, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_code_and_msg() {
        let e = RemoteError::no_connection();
        assert_eq!(e.to_string(), "hyperion remote error code: 1003, msg: No server connection");
    }

    #[test]
    fn test_io_error_is_transport() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let e: RemoteError = io.into();
        assert_eq!(e.code, ErrorCode::TransportError);
        assert_eq!(e.msg, "refused");
    }
}
