//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber with
//! JSON or pretty stdout output.

pub mod logger;

pub use logger::init_logging;
