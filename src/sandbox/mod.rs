//! Paper brokerage gateway.
//!
//! An in-memory [`BrokerageGateway`] used for paper trading and integration
//! tests. It is a simple order book simulator, not a matching engine:
//! market and fractional orders fill on the next state query, limit orders
//! stay working until cancelled, and seeded holdings/positions are static.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::gateway::{
    BrokerageGateway, CancelStatus, Credentials, GatewayError, HoldingRecord, InstrumentInfo,
    OpenOrderEntry, OrderPlacement, OrderStatusReport, OrderSubmission, PositionEntry,
    SessionHandle,
};
use crate::orders::{OrderId, OrderState};
use crate::types::{OrderShape, OrderSide};

#[derive(Debug, Clone)]
struct PaperOrder {
    symbol: String,
    side: OrderSide,
    shape: OrderShape,
    state: OrderState,
    submitted_at: DateTime<Utc>,
    /// Market and fractional orders fill on the next state query
    fills_on_query: bool,
}

#[derive(Default)]
struct PaperBooks {
    watchlists: HashMap<String, Vec<String>>,
    holdings: HashMap<String, HoldingRecord>,
    positions: Vec<PositionEntry>,
    prices: HashMap<String, Decimal>,
    orders: HashMap<OrderId, PaperOrder>,
    order_sequence: Vec<OrderId>,
    cash: Decimal,
    next_id: u64,
}

/// In-memory paper brokerage.
pub struct PaperGateway {
    books: Mutex<PaperBooks>,
}

impl PaperGateway {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(PaperBooks::default()),
        }
    }

    /// Seed a named watchlist.
    pub fn with_watchlist(self, name: impl Into<String>, symbols: Vec<String>) -> Self {
        self.books
            .lock()
            .unwrap()
            .watchlists
            .insert(name.into(), symbols);
        self
    }

    /// Seed a quoted price. Orders for unquoted symbols are rejected.
    pub fn with_price(self, symbol: impl Into<String>, price: Decimal) -> Self {
        self.books.lock().unwrap().prices.insert(symbol.into(), price);
        self
    }

    /// Seed available cash.
    pub fn with_cash(self, cash: Decimal) -> Self {
        self.books.lock().unwrap().cash = cash;
        self
    }

    /// Seed a holding together with its open position.
    pub fn with_holding(
        self,
        symbol: impl Into<String>,
        quantity: Decimal,
        average_cost: Decimal,
        acquired_at: DateTime<Utc>,
    ) -> Self {
        let symbol = symbol.into();
        {
            let mut books = self.books.lock().unwrap();
            books.holdings.insert(
                symbol.clone(),
                HoldingRecord {
                    quantity,
                    average_cost,
                    raw: HashMap::new(),
                },
            );
            books.positions.push(PositionEntry {
                instrument_ref: instrument_ref(&symbol),
                quantity,
                created_at: acquired_at,
                raw: HashMap::new(),
            });
        }
        self
    }
}

impl Default for PaperGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn instrument_ref(symbol: &str) -> String {
    format!("paper:instrument/{}", symbol.to_lowercase())
}

fn symbol_of(instrument_ref: &str) -> Option<String> {
    instrument_ref
        .strip_prefix("paper:instrument/")
        .map(str::to_uppercase)
}

#[async_trait]
impl BrokerageGateway for PaperGateway {
    async fn login(&self, credentials: &Credentials) -> Result<SessionHandle, GatewayError> {
        // Paper mode accepts any credentials.
        debug!(username = %credentials.username, "Paper login");
        Ok(SessionHandle::new(format!(
            "paper-session-{}",
            credentials.username
        )))
    }

    async fn logout(&self, _: &SessionHandle) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn watchlist(&self, _: &SessionHandle, name: &str) -> Result<Vec<String>, GatewayError> {
        self.books
            .lock()
            .unwrap()
            .watchlists
            .get(name)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("watchlist '{}'", name)))
    }

    async fn open_positions(&self, _: &SessionHandle) -> Result<Vec<PositionEntry>, GatewayError> {
        Ok(self.books.lock().unwrap().positions.clone())
    }

    async fn holdings(
        &self,
        _: &SessionHandle,
    ) -> Result<HashMap<String, HoldingRecord>, GatewayError> {
        Ok(self.books.lock().unwrap().holdings.clone())
    }

    async fn resolve_instrument(
        &self,
        _: &SessionHandle,
        instrument_ref: &str,
    ) -> Result<InstrumentInfo, GatewayError> {
        symbol_of(instrument_ref)
            .map(|symbol| InstrumentInfo {
                symbol,
                raw: HashMap::new(),
            })
            .ok_or_else(|| GatewayError::NotFound(format!("instrument '{}'", instrument_ref)))
    }

    async fn open_orders(&self, _: &SessionHandle) -> Result<Vec<OpenOrderEntry>, GatewayError> {
        let books = self.books.lock().unwrap();
        Ok(books
            .order_sequence
            .iter()
            .filter_map(|id| {
                let order = books.orders.get(id)?;
                if order.state.is_terminal() {
                    return None;
                }
                Some(OpenOrderEntry {
                    order_id: id.clone(),
                    instrument_ref: instrument_ref(&order.symbol),
                    side: order.side,
                    shape: order.shape,
                    submitted_at: order.submitted_at,
                })
            })
            .collect())
    }

    async fn place_order(
        &self,
        _: &SessionHandle,
        submission: &OrderSubmission,
    ) -> Result<OrderPlacement, GatewayError> {
        let mut books = self.books.lock().unwrap();

        if !books.prices.contains_key(&submission.symbol) {
            // Business rejection: the call succeeded but no order exists.
            return Ok(OrderPlacement {
                order_id: None,
                reject_reason: Some(format!("unknown symbol '{}'", submission.symbol)),
                raw: HashMap::new(),
            });
        }

        books.next_id += 1;
        let id = OrderId::new(format!("paper-{}", books.next_id));
        let fills_on_query = !matches!(submission.shape, OrderShape::Limit);

        books.orders.insert(
            id.clone(),
            PaperOrder {
                symbol: submission.symbol.clone(),
                side: submission.side,
                shape: submission.shape,
                state: OrderState::Open,
                submitted_at: Utc::now(),
                fills_on_query,
            },
        );
        books.order_sequence.push(id.clone());

        Ok(OrderPlacement {
            order_id: Some(id),
            reject_reason: None,
            raw: HashMap::new(),
        })
    }

    async fn cancel_order(
        &self,
        _: &SessionHandle,
        order_id: &OrderId,
    ) -> Result<CancelStatus, GatewayError> {
        let mut books = self.books.lock().unwrap();
        let order = books
            .orders
            .get_mut(order_id)
            .ok_or_else(|| GatewayError::NotFound(format!("order '{}'", order_id)))?;

        if order.state.is_terminal() {
            return Ok(CancelStatus::Refused {
                reason: format!("order already {}", order.state),
            });
        }
        order.state = OrderState::Cancelled;
        Ok(CancelStatus::Acknowledged)
    }

    async fn cancel_all_orders(
        &self,
        session: &SessionHandle,
    ) -> Result<Vec<CancelStatus>, GatewayError> {
        let open: Vec<OrderId> = {
            let books = self.books.lock().unwrap();
            books
                .order_sequence
                .iter()
                .filter(|id| {
                    books
                        .orders
                        .get(*id)
                        .is_some_and(|o| !o.state.is_terminal())
                })
                .cloned()
                .collect()
        };

        let mut statuses = Vec::with_capacity(open.len());
        for id in open {
            statuses.push(self.cancel_order(session, &id).await?);
        }
        Ok(statuses)
    }

    async fn order_state(
        &self,
        _: &SessionHandle,
        order_id: &OrderId,
    ) -> Result<OrderStatusReport, GatewayError> {
        let mut books = self.books.lock().unwrap();
        let order = books
            .orders
            .get_mut(order_id)
            .ok_or_else(|| GatewayError::NotFound(format!("order '{}'", order_id)))?;

        if !order.state.is_terminal() && order.fills_on_query {
            order.state = OrderState::Filled;
        }

        Ok(OrderStatusReport {
            state: order.state,
            reject_reason: None,
        })
    }

    async fn cash_balance(&self, _: &SessionHandle) -> Result<Decimal, GatewayError> {
        Ok(self.books.lock().unwrap().cash)
    }

    async fn latest_prices(
        &self,
        _: &SessionHandle,
        symbols: &[String],
    ) -> Result<HashMap<String, Decimal>, GatewayError> {
        let books = self.books.lock().unwrap();
        Ok(symbols
            .iter()
            .filter_map(|s| books.prices.get(s).map(|p| (s.clone(), *p)))
            .collect())
    }
}
