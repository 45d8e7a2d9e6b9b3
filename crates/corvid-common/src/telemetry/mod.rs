//! Logging setup
//!
//! Thin wrapper over `tracing-subscriber`. Filtering comes from `RUST_LOG`
//! (falling back to `info`); setting `LOG_FORMAT=json` switches the output
//! to newline-delimited JSON for log shippers.

use tracing_subscriber::{fmt, EnvFilter};

/// Telemetry initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("a global tracing subscriber is already installed")]
    AlreadySet,
}

/// Install the global tracing subscriber
///
/// # Panics
/// Panics if a subscriber is already installed; use
/// [`try_init_tracing`] when that is not a bug.
pub fn init_tracing() {
    try_init_tracing().expect("global tracing subscriber already installed");
}

/// Install the global tracing subscriber, reporting an error if one is
/// already installed
pub fn try_init_tracing() -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter);

    let installed = if json_output_requested() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|_| TelemetryError::AlreadySet)
}

fn json_output_requested() -> bool {
    std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global subscriber can only be set once per process, so the
    // double-init behavior is covered by a single test.
    #[test]
    fn test_second_init_is_rejected() {
        assert!(try_init_tracing().is_ok());
        assert!(matches!(
            try_init_tracing(),
            Err(TelemetryError::AlreadySet)
        ));
    }
}
