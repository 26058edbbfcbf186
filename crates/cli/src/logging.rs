//! Tracing subscriber setup.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.
//! `RUST_LOG` wins when set; otherwise the level is `warn`, or `debug` once
//! `--debug` or `display.debug` asks for it.

use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

/// Handle for raising the log level after configuration is resolved.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

fn default_filter(debug: bool) -> EnvFilter {
    EnvFilter::new(if debug { "debug" } else { "warn" })
}

/// Installs the global subscriber.
pub fn init(debug: bool) -> LogHandle {
    let from_env = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    let filter = if from_env {
        EnvFilter::from_default_env()
    } else {
        default_filter(debug)
    };
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .init();

    LogHandle {
        filter: handle,
        from_env,
    }
}

impl LogHandle {
    /// Switches to debug level unless `RUST_LOG` chose the filter.
    pub fn enable_debug(&self) {
        if self.from_env {
            return;
        }
        if let Err(e) = self.filter.reload(default_filter(true)) {
            tracing::warn!(error = %e, "Could not raise log level");
        }
    }
}
