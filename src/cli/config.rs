//! CLI configuration structs bridging CLI arguments to domain types.
//!
//! These structs decouple the CLI parsing layer from the session logic,
//! so the runner works with a validated, typed configuration.

use std::time::Duration;

use thiserror::Error;

use crate::session::UniverseSource;

/// Errors that can occur when validating CLI arguments.
#[derive(Debug, Error)]
pub enum CliConfigError {
    #[error("No trading universe: pass --watchlist or --symbols")]
    EmptyUniverse,

    #[error("Polling interval must be at least 1 second")]
    ZeroInterval,
}

/// Validated configuration for a trading session run.
#[derive(Debug, Clone)]
pub struct SessionRunConfig {
    /// Named brokerage watchlist (takes precedence over explicit symbols)
    pub watchlist: Option<String>,
    /// Explicit symbol list, uppercased
    pub symbols: Vec<String>,
    /// Delay between polling iterations
    pub poll_interval: Duration,
    /// Paper-trading mode
    pub paper: bool,
}

impl SessionRunConfig {
    /// Validate raw CLI values into a run configuration.
    pub fn new(
        watchlist: Option<String>,
        symbols: Vec<String>,
        interval_secs: u64,
        paper: bool,
    ) -> Result<Self, CliConfigError> {
        let symbols: Vec<String> = symbols
            .into_iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        if watchlist.is_none() && symbols.is_empty() {
            return Err(CliConfigError::EmptyUniverse);
        }
        if interval_secs == 0 {
            return Err(CliConfigError::ZeroInterval);
        }

        Ok(Self {
            watchlist,
            symbols,
            poll_interval: Duration::from_secs(interval_secs),
            paper,
        })
    }

    /// The universe source for session connect.
    pub fn universe_source(&self) -> UniverseSource {
        UniverseSource {
            watchlist: self.watchlist.clone(),
            symbols: self.symbols.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_some_universe() {
        assert!(matches!(
            SessionRunConfig::new(None, vec![], 10, true),
            Err(CliConfigError::EmptyUniverse)
        ));
        assert!(SessionRunConfig::new(Some("bot".into()), vec![], 10, true).is_ok());
        assert!(SessionRunConfig::new(None, vec!["sofi".into()], 10, true).is_ok());
    }

    #[test]
    fn test_symbols_normalized() {
        let config =
            SessionRunConfig::new(None, vec![" sofi ".into(), "aapl".into(), "".into()], 10, true)
                .unwrap();
        assert_eq!(config.symbols, ["SOFI", "AAPL"]);
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(matches!(
            SessionRunConfig::new(Some("bot".into()), vec![], 0, true),
            Err(CliConfigError::ZeroInterval)
        ));
    }
}
