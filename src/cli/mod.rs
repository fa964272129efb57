//! Command-line interface.

mod config;

use clap::Parser;

pub use config::{CliConfigError, SessionRunConfig};

/// Session-scoped equities trading assistant.
#[derive(Parser, Debug)]
#[command(name = "stockpilot", version, about)]
pub struct Cli {
    /// Named brokerage watchlist to trade on (takes precedence over --symbols)
    #[arg(long)]
    pub watchlist: Option<String>,

    /// Comma-separated symbols to trade on
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Seconds between polling iterations
    #[arg(long, default_value_t = 10)]
    pub interval_secs: u64,

    /// Trade against the live brokerage instead of the paper gateway
    #[arg(long)]
    pub live: bool,
}

impl Cli {
    /// Validate into a run configuration.
    pub fn into_config(self) -> Result<SessionRunConfig, CliConfigError> {
        SessionRunConfig::new(self.watchlist, self.symbols, self.interval_secs, !self.live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols_list() {
        let cli = Cli::parse_from(["stockpilot", "--symbols", "sofi,aapl"]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.symbols, ["SOFI", "AAPL"]);
        assert!(config.paper);
    }

    #[test]
    fn test_watchlist_flag() {
        let cli = Cli::parse_from(["stockpilot", "--watchlist", "bot", "--interval-secs", "5"]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.watchlist.as_deref(), Some("bot"));
        assert_eq!(config.poll_interval.as_secs(), 5);
    }
}
