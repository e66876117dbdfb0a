// src/logging.rs
//! Process-wide log subscriber.
//!
//! Call [`init`] once at program start. Library code only emits `tracing`
//! events; without an installed subscriber those are no-ops.

use crate::error::{PricerError, PricerResult};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber, plus a plain-text file layer when `log_file`
/// is given. The file is appended to, never truncated. `RUST_LOG` takes
/// precedence over `default_directive` (e.g. `"info"`, `"mc_pricer=debug"`).
pub fn init(default_directive: &str, log_file: Option<&Path>) -> PricerResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|e| PricerError::Config(format!("invalid log directive: {}", e)))?,
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    PricerError::Config(format!(
                        "Failed to open log file: {}: {}",
                        path.display(),
                        e
                    ))
                })?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_thread_names(true)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_names(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .try_init()
        .map_err(|e| PricerError::Config(format!("logger already initialised: {}", e)))?;

    if let Some(path) = log_file {
        tracing::info!(path = %path.display(), "logging to file");
    }
    Ok(())
}
