//! Settings read from the environment.

use std::env;

/// Pager used for `diff` output when `PAGER` is unset or empty.
pub const DEFAULT_PAGER: &str = "less";

/// Environment variable holding `tracing` filter directives.
pub const LOG_ENV: &str = "GIT_SUBTREES_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Shell command receiving paged output.
    pub pager: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pager = lookup("PAGER")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PAGER.to_string());

        Self { pager }
    }
}
