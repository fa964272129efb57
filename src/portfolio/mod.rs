//! Portfolio snapshot built from brokerage holdings and open positions.
//!
//! The snapshot is a read-only view used to decide whether a position may be
//! opened or closed. It is rebuilt wholesale on each refresh; there is no
//! incremental mutation.

use std::collections::HashMap;

use chrono::DateTime;
use chrono_tz::America::New_York;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info};

use crate::gateway::{BrokerageGateway, GatewayError, SessionHandle};

/// One held symbol with its acquisition metadata.
#[derive(Debug, Clone)]
pub struct Holding {
    pub symbol: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    /// When the open position was created, in US Eastern (the market's
    /// reference timezone). Present only when the symbol appears in both the
    /// holdings and open-positions queries.
    pub acquired_at: Option<DateTime<Tz>>,
    /// Brokerage fields not modelled explicitly
    pub raw: HashMap<String, Value>,
}

/// Symbol-keyed view of current holdings.
#[derive(Debug, Default)]
pub struct PortfolioSnapshot {
    holdings: HashMap<String, Holding>,
}

impl PortfolioSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the snapshot from the brokerage.
    ///
    /// Cross-references the holdings query with the open-positions query:
    /// each position's instrument ref is resolved to a symbol, and symbols
    /// present in both result sets get their position's creation time
    /// attached, converted to US Eastern. A symbol present in only one
    /// result set is surfaced without the timestamp; the two queries can be
    /// transiently inconsistent and that is tolerated, not an error.
    pub async fn refresh<G: BrokerageGateway>(
        &mut self,
        gateway: &G,
        session: &SessionHandle,
    ) -> Result<(), GatewayError> {
        let records = gateway.holdings(session).await?;
        let positions = gateway.open_positions(session).await?;

        let mut holdings: HashMap<String, Holding> = records
            .into_iter()
            .map(|(symbol, record)| {
                let holding = Holding {
                    symbol: symbol.clone(),
                    quantity: record.quantity,
                    average_cost: record.average_cost,
                    acquired_at: None,
                    raw: record.raw,
                };
                (symbol, holding)
            })
            .collect();

        for position in positions {
            let info = gateway
                .resolve_instrument(session, &position.instrument_ref)
                .await?;
            let acquired_at = position.created_at.with_timezone(&New_York);

            match holdings.get_mut(&info.symbol) {
                Some(holding) => {
                    holding.acquired_at = Some(acquired_at);
                }
                None => {
                    debug!(
                        symbol = %info.symbol,
                        "Open position without matching holding"
                    );
                    holdings.insert(
                        info.symbol.clone(),
                        Holding {
                            symbol: info.symbol,
                            quantity: position.quantity,
                            average_cost: Decimal::ZERO,
                            acquired_at: None,
                            raw: position.raw,
                        },
                    );
                }
            }
        }

        info!(symbols = holdings.len(), "Portfolio snapshot refreshed");
        self.holdings = holdings;
        Ok(())
    }

    /// Look up a holding by symbol.
    pub fn get(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.get(symbol)
    }

    /// Check whether a symbol is currently held.
    pub fn contains(&self, symbol: &str) -> bool {
        self.holdings.contains_key(symbol)
    }

    /// Currently held symbols.
    pub fn symbols(&self) -> Vec<String> {
        self.holdings.keys().cloned().collect()
    }

    /// All holdings keyed by symbol.
    pub fn holdings(&self) -> &HashMap<String, Holding> {
        &self.holdings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{HoldingRecord, PositionEntry};
    use crate::testutil::StubGateway;
    use chrono::{TimeZone, Timelike, Utc};
    use rust_decimal_macros::dec;

    fn holding_record(quantity: Decimal, average_cost: Decimal) -> HoldingRecord {
        HoldingRecord {
            quantity,
            average_cost,
            raw: HashMap::new(),
        }
    }

    fn position(instrument_ref: &str, quantity: Decimal, created_at_utc: &str) -> PositionEntry {
        PositionEntry {
            instrument_ref: instrument_ref.to_string(),
            quantity,
            created_at: created_at_utc.parse().unwrap(),
            raw: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_timestamp_attached_only_on_intersection() {
        let gateway = StubGateway::new();
        {
            let mut holdings = gateway.holdings.lock().unwrap();
            holdings.insert("AAPL".to_string(), holding_record(dec!(10), dec!(150)));
            holdings.insert("MSFT".to_string(), holding_record(dec!(5), dec!(300)));
        }
        gateway.positions.lock().unwrap().extend([
            position("aapl", dec!(10), "2024-01-02T15:00:00Z"),
            position("tsla", dec!(2), "2024-01-02T16:00:00Z"),
        ]);

        let session = SessionHandle::new("stub");
        let mut snapshot = PortfolioSnapshot::new();
        snapshot.refresh(&gateway, &session).await.unwrap();

        // In both queries: timestamp attached.
        assert!(snapshot.get("AAPL").unwrap().acquired_at.is_some());
        // Holding without a position: no timestamp, no error.
        assert!(snapshot.get("MSFT").unwrap().acquired_at.is_none());
        // Position without a holding: surfaced as-is, no timestamp.
        let tsla = snapshot.get("TSLA").unwrap();
        assert!(tsla.acquired_at.is_none());
        assert_eq!(tsla.quantity, dec!(2));
    }

    #[tokio::test]
    async fn test_acquired_at_converted_to_eastern() {
        let gateway = StubGateway::new();
        gateway
            .holdings
            .lock()
            .unwrap()
            .insert("AAPL".to_string(), holding_record(dec!(1), dec!(100)));
        gateway
            .positions
            .lock()
            .unwrap()
            // 15:00 UTC on a January date is 10:00 US Eastern (EST).
            .push(position("aapl", dec!(1), "2024-01-02T15:00:00Z"));

        let session = SessionHandle::new("stub");
        let mut snapshot = PortfolioSnapshot::new();
        snapshot.refresh(&gateway, &session).await.unwrap();

        let acquired = snapshot.get("AAPL").unwrap().acquired_at.unwrap();
        assert_eq!(acquired.hour(), 10);
        let expected = Utc
            .with_ymd_and_hms(2024, 1, 2, 15, 0, 0)
            .unwrap()
            .with_timezone(&New_York);
        assert_eq!(acquired, expected);
    }

    #[tokio::test]
    async fn test_refresh_rebuilds_wholesale() {
        let gateway = StubGateway::new();
        gateway
            .holdings
            .lock()
            .unwrap()
            .insert("AAPL".to_string(), holding_record(dec!(1), dec!(100)));

        let session = SessionHandle::new("stub");
        let mut snapshot = PortfolioSnapshot::new();
        snapshot.refresh(&gateway, &session).await.unwrap();
        assert!(snapshot.contains("AAPL"));

        // Position sold: gone from the next refresh entirely.
        gateway.holdings.lock().unwrap().clear();
        snapshot.refresh(&gateway, &session).await.unwrap();
        assert!(snapshot.is_empty());
    }
}
