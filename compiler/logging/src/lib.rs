#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Simple logging utilities for wsbridge.
//!
//! Library crates emit `tracing` events; binaries call [`init`] once to
//! print them.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use config::LoggingConfig;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

/// Prints a trace message to stderr with module prefix.
pub fn trace(module: &str, msg: &str) {
    eprintln!("[TRACE][{}] {}", module, msg);
}

/// Build the subscriber described by `config`, without installing it.
///
/// Events are filtered by `RUST_LOG`, falling back to the configured level,
/// and appended to the configured file or written to stderr.
pub fn subscriber(config: &LoggingConfig) -> io::Result<Box<dyn Subscriber + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Ok(Box::new(builder.with_ansi(false).with_writer(Mutex::new(file)).finish()))
        }
        None => Ok(Box::new(builder.with_writer(io::stderr).finish())),
    }
}

/// Install the subscriber described by `config` as the global default.
///
/// Returns `Ok(false)` when a global subscriber was already installed;
/// calling this more than once is harmless. Fails when the log file cannot
/// be opened.
pub fn init(config: &LoggingConfig) -> io::Result<bool> {
    let subscriber = subscriber(config)?;
    Ok(tracing::subscriber::set_global_default(subscriber).is_ok())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig { level: "debug".to_string(), file: None };
        init(&config).expect("stderr needs no file");
        assert!(!init(&config).expect("stderr needs no file"));
        tracing::debug!("subscriber installed");
    }

    #[test]
    fn test_events_go_to_the_configured_file() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("bridge.log");
        let config = LoggingConfig { level: "info".to_string(), file: Some(path.clone()) };

        let subscriber = subscriber(&config).expect("log file opens");
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("wsdl cache miss");
            tracing::trace!("below the configured level");
        });

        let contents = fs::read_to_string(&path).expect("log file written");
        assert!(contents.contains("wsdl cache miss"));
        assert!(!contents.contains("below the configured level"));
    }

    #[test]
    fn test_unwritable_log_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let config = LoggingConfig { level: "info".to_string(), file: Some(dir.path().join("missing/bridge.log")) };
        assert!(subscriber(&config).is_err());
    }
}
