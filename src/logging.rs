//! Tracing subscriber setup for the binary.
//!
//! Logs go to stderr so stdout carries only reports and plots.

use tracing_subscriber::EnvFilter;

/// Default directive for a verbosity count (`-v` = 1).
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "watertrace=info",
        1 => "watertrace=debug",
        _ => "watertrace=trace",
    }
}

/// Install the global fmt subscriber. `RUST_LOG` wins over `verbose`.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
