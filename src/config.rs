//! Environment configuration.

use std::env;

/// Default cursor-query attempt budget when `RAWLINE_QUERY_RETRIES` is unset.
pub const DEFAULT_QUERY_RETRIES: usize = 8;

#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Hint that callers should cooperatively yield after each input cycle.
    pub yield_io: bool,
    /// Verbose tracing of redraw-flag processing.
    pub debug_redraw: bool,
    /// Attempt budget for the cursor-position query.
    pub query_retries: usize,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            yield_io: env_flag("RAWLINE_YIELD_IO"),
            debug_redraw: env_flag("RAWLINE_DEBUG_REDRAW"),
            query_retries: env_usize("RAWLINE_QUERY_RETRIES", DEFAULT_QUERY_RETRIES),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            yield_io: false,
            debug_redraw: false,
            query_retries: DEFAULT_QUERY_RETRIES,
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}
