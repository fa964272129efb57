//! Configurable in-memory gateway stub for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::gateway::{
    BrokerageGateway, CancelStatus, Credentials, GatewayError, HoldingRecord, InstrumentInfo,
    OpenOrderEntry, OrderPlacement, OrderStatusReport, OrderSubmission, PositionEntry,
    SessionHandle,
};
use crate::orders::{OrderId, OrderState};

/// Stub gateway with canned responses and call counters.
///
/// Every collection is preloaded by the test; unknown lookups behave like the
/// brokerage would (watchlists and order states miss with `NotFound`,
/// instrument refs resolve to their uppercased ref).
#[derive(Default)]
pub(crate) struct StubGateway {
    pub watchlists: Mutex<HashMap<String, Vec<String>>>,
    pub positions: Mutex<Vec<PositionEntry>>,
    pub holdings: Mutex<HashMap<String, HoldingRecord>>,
    pub instruments: Mutex<HashMap<String, InstrumentInfo>>,
    pub open: Mutex<Vec<OpenOrderEntry>>,
    /// Responses served by `place_order`, in order. Empty queue serves a
    /// no-id placement (business rejection).
    pub placements: Mutex<VecDeque<OrderPlacement>>,
    pub states: Mutex<HashMap<OrderId, OrderStatusReport>>,
    pub prices: Mutex<HashMap<String, Decimal>>,
    pub cash: Mutex<Decimal>,
    pub place_calls: AtomicUsize,
    pub state_calls: AtomicUsize,
    pub cancel_calls: AtomicUsize,
    pub price_calls: AtomicUsize,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_placement(&self, placement: OrderPlacement) {
        self.placements.lock().unwrap().push_back(placement);
    }

    pub fn accept_next_order(&self, id: &str) {
        self.queue_placement(OrderPlacement {
            order_id: Some(OrderId::new(id)),
            reject_reason: None,
            raw: HashMap::new(),
        });
    }

    pub fn set_state(&self, id: &str, state: OrderState, reject_reason: Option<&str>) {
        self.states.lock().unwrap().insert(
            OrderId::new(id),
            OrderStatusReport {
                state,
                reject_reason: reject_reason.map(String::from),
            },
        );
    }

    pub fn set_price(&self, symbol: &str, price: Decimal) {
        self.prices.lock().unwrap().insert(symbol.to_string(), price);
    }

    pub fn place_call_count(&self) -> usize {
        self.place_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrokerageGateway for StubGateway {
    async fn login(&self, credentials: &Credentials) -> Result<SessionHandle, GatewayError> {
        Ok(SessionHandle::new(format!("stub-{}", credentials.username)))
    }

    async fn logout(&self, _: &SessionHandle) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn watchlist(&self, _: &SessionHandle, name: &str) -> Result<Vec<String>, GatewayError> {
        self.watchlists
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("watchlist '{}'", name)))
    }

    async fn open_positions(&self, _: &SessionHandle) -> Result<Vec<PositionEntry>, GatewayError> {
        Ok(self.positions.lock().unwrap().clone())
    }

    async fn holdings(
        &self,
        _: &SessionHandle,
    ) -> Result<HashMap<String, HoldingRecord>, GatewayError> {
        Ok(self.holdings.lock().unwrap().clone())
    }

    async fn resolve_instrument(
        &self,
        _: &SessionHandle,
        instrument_ref: &str,
    ) -> Result<InstrumentInfo, GatewayError> {
        Ok(self
            .instruments
            .lock()
            .unwrap()
            .get(instrument_ref)
            .cloned()
            .unwrap_or_else(|| InstrumentInfo {
                symbol: instrument_ref.to_uppercase(),
                raw: HashMap::new(),
            }))
    }

    async fn open_orders(&self, _: &SessionHandle) -> Result<Vec<OpenOrderEntry>, GatewayError> {
        Ok(self.open.lock().unwrap().clone())
    }

    async fn place_order(
        &self,
        _: &SessionHandle,
        _: &OrderSubmission,
    ) -> Result<OrderPlacement, GatewayError> {
        self.place_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .placements
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn cancel_order(
        &self,
        _: &SessionHandle,
        _: &OrderId,
    ) -> Result<CancelStatus, GatewayError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CancelStatus::Acknowledged)
    }

    async fn cancel_all_orders(
        &self,
        _: &SessionHandle,
    ) -> Result<Vec<CancelStatus>, GatewayError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn order_state(
        &self,
        _: &SessionHandle,
        order_id: &OrderId,
    ) -> Result<OrderStatusReport, GatewayError> {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        self.states
            .lock()
            .unwrap()
            .get(order_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(order_id.to_string()))
    }

    async fn cash_balance(&self, _: &SessionHandle) -> Result<Decimal, GatewayError> {
        Ok(*self.cash.lock().unwrap())
    }

    async fn latest_prices(
        &self,
        _: &SessionHandle,
        symbols: &[String],
    ) -> Result<HashMap<String, Decimal>, GatewayError> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        let prices = self.prices.lock().unwrap();
        Ok(symbols
            .iter()
            .filter_map(|s| prices.get(s).map(|p| (s.clone(), *p)))
            .collect())
    }
}
