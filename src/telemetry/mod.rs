//! Logging infrastructure
//!
//! Structured logging through tracing, with console, JSON and file output.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogGuard};
