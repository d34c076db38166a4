//! Logging setup and configuration

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn build_filter(default_level: &str) -> crate::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| crate::Error::Config(format!("Invalid log filter: {}", e)))
}

/// Setup tracing subscriber for the application
///
/// Logs go to stderr, or are appended to `log_file` when one is given.
/// The terminal UI passes a file so log lines never land on the screen.
pub fn setup_logging(default_level: &str, log_file: Option<&Path>) -> crate::Result<()> {
    let filter = build_filter(default_level)?;

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()
                .map_err(|e| crate::Error::Config(format!("Logging already set up: {}", e)))?;
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| crate::Error::Config(format!("Logging already set up: {}", e)))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_rejected() {
        // RUST_LOG takes precedence over the default level
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(build_filter("info").is_ok());
        assert!(build_filter("client=debug,protocol=warn").is_ok());
        assert!(build_filter("client=loud").is_err());
    }

    #[test]
    fn test_log_file_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("client.log");

        setup_logging("info", Some(&path)).unwrap();
        tracing::info!("written to file");

        assert!(path.exists());
        // Only one global subscriber per process
        assert!(setup_logging("info", None).is_err());
    }
}
