//! Connection options

use std::time::Duration;

/// Environment variable that turns on statement logging when non-empty
pub const QUERY_DEBUG_ENV: &str = "DB_QUERY_DEBUG";

/// Default connect / per-statement timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options applied when opening a gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbOptions {
    /// Bound on pool acquisition and on each executed statement
    pub timeout: Duration,

    /// Log every executed statement
    pub log_queries: bool,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            log_queries: false,
        }
    }
}

impl DbOptions {
    /// Default options, with statement logging taken from `DB_QUERY_DEBUG`
    pub fn from_env() -> Self {
        Self {
            log_queries: std::env::var(QUERY_DEBUG_ENV).is_ok_and(|v| !v.is_empty()),
            ..Self::default()
        }
    }

    /// Replace the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
