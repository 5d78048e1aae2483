//! Hearth Telemetry - logging setup for Hearth binaries.
//!
//! Library crates only emit `tracing` events; binaries call
//! [`setup_logging`] once at startup.
//!
//! # Example
//!
//! ```rust,no_run
//! use hearth_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), hearth_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Json)
//!     .with_directive("hearth_store=debug");
//! setup_logging(&config)?;
//! tracing::info!("ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_logging};
