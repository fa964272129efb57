//! Trading session façade.
//!
//! Owns the order registry and portfolio snapshot and orchestrates the whole
//! session lifecycle: login, symbol-universe resolution, order submission,
//! cancellation, reconciliation, and the market-hours-gated polling loop.
//!
//! All operations run on a single logical thread of control; the registry
//! and snapshot are never mutated concurrently.

pub mod hours;

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::gateway::{
    BrokerageGateway, CancelStatus, Credentials, GatewayError, SessionHandle,
};
use crate::orders::{OrderId, OrderRecord, OrderRegistry, OrderRequest, RequestError};
use crate::portfolio::PortfolioSnapshot;
use crate::strategy::Strategy;
use crate::types::OrderSide;

/// Fixed delay between polling iterations.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Errors surfaced by session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Strategy error: {0}")]
    Strategy(String),
}

/// Wall-clock source, injectable for deterministic tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Where the trading universe comes from.
///
/// A named watchlist, when given, takes precedence over the explicit list.
#[derive(Debug, Clone, Default)]
pub struct UniverseSource {
    pub watchlist: Option<String>,
    pub symbols: Vec<String>,
}

impl UniverseSource {
    pub fn watchlist(name: impl Into<String>) -> Self {
        Self {
            watchlist: Some(name.into()),
            symbols: Vec::new(),
        }
    }

    pub fn symbols(symbols: Vec<String>) -> Self {
        Self {
            watchlist: None,
            symbols,
        }
    }
}

/// Outcome of an order submission.
///
/// A gateway response without an order id is a business rejection: reported
/// here rather than raised, so one bad order does not abort a batch.
#[derive(Debug)]
pub enum Submission {
    /// Order accepted; the record is now tracked in the registry.
    Accepted(OrderRecord),
    /// Brokerage declined the order; the registry is untouched.
    Rejected {
        reason: Option<String>,
        raw: HashMap<String, Value>,
    },
}

/// Why the polling loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStop {
    /// The market-hours gate closed. The loop does not resume by itself.
    MarketClosed,
    /// The shutdown signal was raised (or its sender dropped).
    ShutdownRequested,
}

/// Session-scoped trading assistant.
pub struct TradingSession<G: BrokerageGateway> {
    gateway: G,
    handle: SessionHandle,
    universe: Vec<String>,
    registry: OrderRegistry,
    portfolio: PortfolioSnapshot,
    clock: Box<dyn Clock>,
    poll_interval: Duration,
}

impl<G: BrokerageGateway> TradingSession<G> {
    /// Authenticate and bring the session to readiness.
    ///
    /// Logs in, resolves the trading universe, seeds the order registry from
    /// the brokerage's open orders, and builds the initial portfolio
    /// snapshot.
    pub async fn connect(
        gateway: G,
        credentials: &Credentials,
        universe: UniverseSource,
    ) -> Result<Self, SessionError> {
        let handle = gateway.login(credentials).await?;
        info!("Brokerage session established");

        let symbols = match &universe.watchlist {
            Some(name) => {
                let symbols = gateway.watchlist(&handle, name).await?;
                info!(watchlist = %name, count = symbols.len(), "Universe resolved from watchlist");
                symbols
            }
            None => {
                info!(count = universe.symbols.len(), "Universe from explicit symbol list");
                universe.symbols
            }
        };

        let mut registry = OrderRegistry::new();
        registry.seed(&gateway, &handle).await?;

        let mut portfolio = PortfolioSnapshot::new();
        portfolio.refresh(&gateway, &handle).await?;

        Ok(Self {
            gateway,
            handle,
            universe: symbols,
            registry,
            portfolio,
            clock: Box::new(SystemClock),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Replace the wall-clock source (for tests).
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Submit a buy order.
    pub async fn buy(&mut self, mut request: OrderRequest) -> Result<Submission, SessionError> {
        request.side = OrderSide::Buy;
        self.submit(request).await
    }

    /// Submit a sell order.
    ///
    /// Sells are not gated on the portfolio snapshot here; position
    /// sufficiency is the brokerage's call (or a strategy-layer check).
    pub async fn sell(&mut self, mut request: OrderRequest) -> Result<Submission, SessionError> {
        request.side = OrderSide::Sell;
        self.submit(request).await
    }

    /// Validate and submit a trade request.
    ///
    /// Validation runs strictly before the network call; a failed request
    /// produces no side effect. On placement, the response is inspected for
    /// a brokerage-assigned order id: present means the order is tracked as
    /// open, absent means a reported (not raised) rejection.
    pub async fn submit(&mut self, request: OrderRequest) -> Result<Submission, SessionError> {
        let submission = request.into_submission()?;
        let placement = self.gateway.place_order(&self.handle, &submission).await?;

        match placement.order_id {
            Some(id) => {
                let record = OrderRecord::open(
                    id,
                    submission.symbol,
                    submission.side,
                    submission.shape,
                );
                info!(
                    order_id = %record.id,
                    symbol = %record.symbol,
                    side = %record.side,
                    shape = %record.shape,
                    "Order submitted"
                );
                self.registry.track(record.clone());
                Ok(Submission::Accepted(record))
            }
            None => {
                warn!(
                    symbol = %submission.symbol,
                    side = %submission.side,
                    shape = %submission.shape,
                    reason = placement.reject_reason.as_deref().unwrap_or("unknown"),
                    "Order rejected at placement"
                );
                Ok(Submission::Rejected {
                    reason: placement.reject_reason,
                    raw: placement.raw,
                })
            }
        }
    }

    /// Request cancellation of a single order.
    ///
    /// Pass-through: the registry still carries the order as open until a
    /// later reconciliation observes the cancelled state. Cancellation is
    /// requested here, confirmed there.
    pub async fn cancel(&self, order_id: &OrderId) -> Result<CancelStatus, SessionError> {
        let status = self.gateway.cancel_order(&self.handle, order_id).await?;
        info!(order_id = %order_id, status = ?status, "Cancellation requested");
        Ok(status)
    }

    /// Request cancellation of every outstanding order.
    pub async fn cancel_all(&self) -> Result<Vec<CancelStatus>, SessionError> {
        let statuses = self.gateway.cancel_all_orders(&self.handle).await?;
        info!(count = statuses.len(), "Cancel-all requested");
        Ok(statuses)
    }

    /// Reconcile the registry against brokerage-reported order state.
    pub async fn reconcile(&mut self) -> Result<usize, SessionError> {
        let removed = self.registry.reconcile(&self.gateway, &self.handle).await?;
        Ok(removed)
    }

    /// Rebuild the portfolio snapshot.
    pub async fn refresh_portfolio(&mut self) -> Result<(), SessionError> {
        self.portfolio.refresh(&self.gateway, &self.handle).await?;
        Ok(())
    }

    /// Available cash.
    pub async fn cash(&self) -> Result<Decimal, SessionError> {
        Ok(self.gateway.cash_balance(&self.handle).await?)
    }

    /// Latest prices for the trading universe.
    pub async fn latest_prices(&self) -> Result<HashMap<String, Decimal>, SessionError> {
        Ok(self
            .gateway
            .latest_prices(&self.handle, &self.universe)
            .await?)
    }

    /// Whether the market-hours gate currently holds.
    pub fn market_open(&self) -> bool {
        hours::market_open_at(self.clock.now())
    }

    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    pub fn registry(&self) -> &OrderRegistry {
        &self.registry
    }

    pub fn portfolio(&self) -> &PortfolioSnapshot {
        &self.portfolio
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// End the brokerage session.
    pub async fn logout(self) -> Result<(), SessionError> {
        self.gateway.logout(&self.handle).await?;
        info!("Brokerage session closed");
        Ok(())
    }

    /// Run the market-hours-gated polling loop.
    ///
    /// While the market is open and no shutdown was signalled, fetches the
    /// latest prices for the universe, hands them to the strategy, and
    /// sleeps the fixed interval. The loop performs no trading by itself.
    /// It stops the moment the gate closes or the shutdown signal is raised
    /// (the signal also interrupts the sleep) and never restarts on its own.
    pub async fn run_polling<S: Strategy>(
        &mut self,
        strategy: &mut S,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<PollStop, SessionError> {
        info!(
            universe = self.universe.len(),
            interval_secs = self.poll_interval.as_secs(),
            "Polling loop started"
        );

        loop {
            if *shutdown.borrow() {
                info!("Polling loop stopped: shutdown requested");
                return Ok(PollStop::ShutdownRequested);
            }
            if !self.market_open() {
                info!("Polling loop stopped: market closed");
                return Ok(PollStop::MarketClosed);
            }

            let prices = self
                .gateway
                .latest_prices(&self.handle, &self.universe)
                .await?;
            strategy
                .on_prices(&prices)
                .await
                .map_err(|e| SessionError::Strategy(e.to_string()))?;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Polling loop stopped: shutdown requested");
                        return Ok(PollStop::ShutdownRequested);
                    }
                }
            }
        }
    }
}
