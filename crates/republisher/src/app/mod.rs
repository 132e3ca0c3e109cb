//! Binary-side wiring for the `republisher` tool.
//!
//! ## Submodules
//!
//! - [`config`] - CLI and environment parsing into a validated
//!   [`config::RepublishConfig`].
//! - [`telemetry`] - `tracing` subscriber setup, with optional span export.

pub mod config;
pub mod telemetry;
