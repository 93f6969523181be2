//! Process-wide logger setup over `env_logger`.
//!
//! Library code only uses the `log` macros; a driver calls [`init`] once.
//! `RUST_LOG` overrides the default filter.

use env_logger::{Builder, Env};

const DEFAULT_FILTER: &str = "info";

/// Initialize logging with the `info` default filter
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Initialize logging with `default_filter` unless `RUST_LOG` is set.
/// Later calls are no-ops.
pub fn init_with_filter(default_filter: &str) {
    let _ = Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .try_init();
}
