//! In-memory registry of outstanding orders.
//!
//! Maps brokerage order ids to tracked records, holding only orders not yet
//! known terminal. Seeded from the brokerage's open-orders query at session
//! start, grown by accepted submissions, and shrunk by reconciliation.
//!
//! The session drives all mutation from a single logical thread of control,
//! so the registry is a plain map with no internal locking.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::types::{OrderId, OrderRecord, OrderState};
use crate::gateway::{BrokerageGateway, GatewayError, SessionHandle};

/// Registry of orders awaiting a terminal state.
#[derive(Debug, Default)]
pub struct OrderRegistry {
    orders: HashMap<OrderId, OrderRecord>,
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry from the brokerage's currently-open orders.
    ///
    /// Each open order references its instrument by ref; the symbol is
    /// resolved before the record is inserted. Returns the number of orders
    /// loaded.
    pub async fn seed<G: BrokerageGateway>(
        &mut self,
        gateway: &G,
        session: &SessionHandle,
    ) -> Result<usize, GatewayError> {
        let open = gateway.open_orders(session).await?;
        let count = open.len();

        for entry in open {
            let info = gateway
                .resolve_instrument(session, &entry.instrument_ref)
                .await?;
            let record = OrderRecord {
                id: entry.order_id.clone(),
                symbol: info.symbol,
                side: entry.side,
                shape: entry.shape,
                submitted_at: entry.submitted_at,
                state: OrderState::Open,
            };
            debug!(order_id = %record.id, symbol = %record.symbol, "Loaded open order");
            self.orders.insert(entry.order_id, record);
        }

        info!(count = count, "Order registry seeded from brokerage");
        Ok(count)
    }

    /// Track a freshly accepted submission.
    pub fn track(&mut self, record: OrderRecord) {
        debug!(order_id = %record.id, symbol = %record.symbol, "Order registered");
        self.orders.insert(record.id.clone(), record);
    }

    /// Look up a tracked order.
    pub fn get(&self, id: &OrderId) -> Option<&OrderRecord> {
        self.orders.get(id)
    }

    /// Check whether an order is tracked.
    pub fn contains(&self, id: &OrderId) -> bool {
        self.orders.contains_key(id)
    }

    /// Ids of all tracked orders.
    pub fn order_ids(&self) -> Vec<OrderId> {
        self.orders.keys().cloned().collect()
    }

    /// All tracked records.
    pub fn records(&self) -> impl Iterator<Item = &OrderRecord> {
        self.orders.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Reconcile tracked orders against brokerage-reported state.
    ///
    /// Queries the brokerage once per tracked order (O(n) round trips, a
    /// deliberate trade-off for small personal portfolios). Orders reported
    /// `filled` or `cancelled` are marked for removal; `rejected` orders
    /// additionally log their reject reason. Anything else is retained
    /// unchanged. Removal is applied only after the full scan completes, and
    /// a transport failure mid-scan removes nothing.
    ///
    /// Returns the number of orders removed. Idempotent: a second call with
    /// no brokerage-state change removes zero.
    pub async fn reconcile<G: BrokerageGateway>(
        &mut self,
        gateway: &G,
        session: &SessionHandle,
    ) -> Result<usize, GatewayError> {
        let mut terminal: Vec<(OrderId, OrderState)> = Vec::new();

        for id in self.order_ids() {
            let report = gateway.order_state(session, &id).await?;
            match report.state {
                OrderState::Filled | OrderState::Cancelled => {
                    terminal.push((id, report.state));
                }
                OrderState::Rejected => {
                    warn!(
                        order_id = %id,
                        reason = report.reject_reason.as_deref().unwrap_or("unknown"),
                        "Order rejected by brokerage"
                    );
                    terminal.push((id, OrderState::Rejected));
                }
                _ => {}
            }
        }

        for (id, state) in &terminal {
            if let Some(record) = self.orders.remove(id) {
                info!(
                    order_id = %id,
                    symbol = %record.symbol,
                    side = %record.side,
                    shape = %record.shape,
                    state = %state,
                    "Order resolved"
                );
            }
        }

        Ok(terminal.len())
    }
}
