//! Core infrastructure shared by Stratum binaries.
//!
//! Currently this is the logging setup: [`TracingConfig`] installs a
//! `tracing` subscriber with an environment filter and one of the
//! [`TracingFormat`] output layers.

mod tracing_config;

pub use tracing_config::{
    LOG_FILTER_ENV, LOG_FORMAT_ENV, TracingConfig, TracingFormat, TracingInitError,
};
