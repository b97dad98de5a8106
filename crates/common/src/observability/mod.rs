//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events. Binaries and test harnesses call
//! [`init_tracing`] once to decide where they go.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset or invalid
pub const DEFAULT_DIRECTIVE: &str = "info";

#[derive(Debug, Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct TracingInitError(String);

/// Subscriber options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Filter directive used when `RUST_LOG` is absent
    pub default_directive: String,
    /// Emit one JSON object per event instead of human-readable lines
    pub json: bool,
    pub with_target: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self { default_directive: DEFAULT_DIRECTIVE.to_string(), json: false, with_target: true }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    #[must_use]
    pub fn with_default_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = directive.into();
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.default_directive))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
    }
}

/// Install the global `fmt` subscriber.
///
/// # Errors
/// Returns [`TracingInitError`] if a global subscriber is already set.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TracingInitError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_target(config.with_target);

    let result = if config.json { builder.json().try_init() } else { builder.try_init() };
    result.map_err(|e| TracingInitError(e.to_string()))
}
