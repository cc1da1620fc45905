//! logger setup
//! all modules log through the tagged macros below

use super::error::RemoteError;
use super::setting::AppConfig;

fn level_filter(level: &str) -> log::LevelFilter {
    match level {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        "off" => log::LevelFilter::Off,
        _ => log::LevelFilter::Info,
    }
}

/// init the logger backend, level comes from the app config
pub fn init_logger() -> Result<(), RemoteError> {
    init_logger_with_level(AppConfig::get().env.log_level.as_str())
}

pub fn init_logger_with_level(level: &str) -> Result<(), RemoteError> {
    // tests call this from many threads, a second init is not an error
    if log::max_level() != log::LevelFilter::Off {
        return Ok(());
    }

    let _ = pretty_env_logger::formatted_builder()
        .target(pretty_env_logger::env_logger::Target::Stderr)
        .filter_level(level_filter(level))
        .try_init();
    Ok(())
}

/// log with a `[TAG]` prefix, supports trace debug info warn error
#[macro_export]
macro_rules! warn {
    ($tag:expr, $($arg:tt)*) => ({
        log::warn!("[{}] {}", $tag, format_args!($($arg)*));
    })
}

#[macro_export]
macro_rules! error {
    ($tag:expr, $($arg:tt)*) => ({
        log::error!("[{}] {}", $tag, format_args!($($arg)*));
    })
}

#[macro_export]
macro_rules! info {
    ($tag:expr, $($arg:tt)*) => ({
        log::info!("[{}] {}", $tag, format_args!($($arg)*));
    })
}

#[macro_export]
macro_rules! debug {
    ($tag:expr, $($arg:tt)*) => ({
        log::debug!("[{}] {}", $tag, format_args!($($arg)*));
    })
}

#[macro_export]
macro_rules! trace {
    ($tag:expr, $($arg:tt)*) => ({
        log::trace!("[{}] {}", $tag, format_args!($($arg)*));
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter("debug"), log::LevelFilter::Debug);
        assert_eq!(level_filter("nonsense"), log::LevelFilter::Info);
    }

    #[test]
    fn test_init_twice() {
        init_logger_with_level("debug").unwrap();
        init_logger_with_level("trace").unwrap();
    }
}
