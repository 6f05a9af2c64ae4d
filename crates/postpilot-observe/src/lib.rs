//! Observability setup for PostPilot: structured logging via `tracing` and
//! optional OpenTelemetry span export.

pub mod tracing_setup;

pub use tracing_setup::{LogFormat, init_tracing, shutdown_tracing};
