//! Logging prelude module for convenient access to tracing macros.
//!
//! Diagnostic logs go to stderr through `tracing`. Human-readable status
//! lines for the user are a separate channel, see [`crate::callbacks`].
//!
//! # Usage
//!
//! ```ignore
//! use crate::logging::*;
//!
//! info!("Synced pair");
//! debug!("Walked tree");
//! ```

pub use tracing::{debug, error, info, trace, warn};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Initialize the tracing subscriber with environment filter support.
///
/// Control the log level with the `RUST_LOG` environment variable:
///
/// ```bash
/// RUST_LOG=debug hashmirror
/// RUST_LOG=hashmirror::fingerprint=trace hashmirror
/// ```
pub fn init_tracing() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
		)
		.with_writer(std::io::stderr)
		.init();
}

// vim: ts=4
