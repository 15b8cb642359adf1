//! Logging initialization.
//!
//! Diagnostics go through `tracing` to stderr; stdout is reserved for the
//! progress bar, the summary and JSON progress lines.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Level used when `RUST_LOG` is not set
fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "image_transformer=debug"
    } else {
        "warn"
    }
}

/// Initialize the logging subsystem.
///
/// * `verbose` - enables DEBUG level for this crate; otherwise only warnings
/// * `json_format` - structured JSON lines instead of human-readable output
///
/// The RUST_LOG environment variable overrides the level.
pub fn init(verbose: bool, json_format: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_writer(std::io::stderr)
                    .with_ansi(console::colors_enabled_stderr()),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false), "warn");
        assert_eq!(default_level(true), "image_transformer=debug");
    }
}
