//! Brokerage Gateway Abstraction
//!
//! This module provides the brokerage-agnostic trait the trading session is
//! written against. The concrete network transport (HTTP client, auth token
//! refresh, rate limiting) lives behind this boundary; the paper gateway in
//! [`crate::sandbox`] implements the same trait in memory for tests and
//! paper trading.

mod types;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

pub use types::{
    CancelStatus, Credentials, HoldingRecord, InstrumentInfo, OpenOrderEntry, OrderPlacement,
    OrderStatusReport, OrderSubmission, PositionEntry, SessionHandle, SizedOrder,
};

use crate::orders::OrderId;

/// Errors surfaced by gateway operations.
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// Authentication failed or the session handle is no longer valid
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A named resource (watchlist, instrument, order) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport-level failure; the call may or may not have reached the brokerage
    #[error("Network error: {0}")]
    Network(String),

    /// Local misconfiguration (missing credentials, bad endpoint)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Configuration for connecting to a brokerage.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub credentials: Credentials,
    /// Paper-trading mode (no live orders)
    pub paper: bool,
}

impl GatewayConfig {
    /// Create config from environment variables.
    ///
    /// Reads `BROKERAGE_USERNAME` and `BROKERAGE_PASSWORD`.
    pub fn from_env(paper: bool) -> Result<Self, GatewayError> {
        let username = std::env::var("BROKERAGE_USERNAME").map_err(|_| {
            GatewayError::Configuration("BROKERAGE_USERNAME must be set in environment".into())
        })?;
        let password = std::env::var("BROKERAGE_PASSWORD").map_err(|_| {
            GatewayError::Configuration("BROKERAGE_PASSWORD must be set in environment".into())
        })?;

        Ok(Self {
            credentials: Credentials { username, password },
            paper,
        })
    }
}

/// Core trait for brokerage access - all remote operations the session consumes.
///
/// Every call is fallible and takes the [`SessionHandle`] obtained from
/// `login`. Implementations must not retry placements internally: retrying a
/// possibly-placed order risks duplicate fills, so transport failures are
/// surfaced to the caller as-is.
#[async_trait]
pub trait BrokerageGateway: Send + Sync {
    /// Authenticate and obtain a session handle.
    async fn login(&self, credentials: &Credentials) -> Result<SessionHandle, GatewayError>;

    /// End the session.
    async fn logout(&self, session: &SessionHandle) -> Result<(), GatewayError>;

    /// Fetch the ordered symbols of a named watchlist.
    async fn watchlist(
        &self,
        session: &SessionHandle,
        name: &str,
    ) -> Result<Vec<String>, GatewayError>;

    /// Fetch all currently open positions.
    async fn open_positions(
        &self,
        session: &SessionHandle,
    ) -> Result<Vec<PositionEntry>, GatewayError>;

    /// Fetch current holdings keyed by symbol.
    async fn holdings(
        &self,
        session: &SessionHandle,
    ) -> Result<HashMap<String, HoldingRecord>, GatewayError>;

    /// Resolve an instrument ref to its metadata (symbol).
    async fn resolve_instrument(
        &self,
        session: &SessionHandle,
        instrument_ref: &str,
    ) -> Result<InstrumentInfo, GatewayError>;

    /// Fetch all orders the brokerage currently considers open.
    async fn open_orders(
        &self,
        session: &SessionHandle,
    ) -> Result<Vec<OpenOrderEntry>, GatewayError>;

    /// Transmit a validated order.
    async fn place_order(
        &self,
        session: &SessionHandle,
        submission: &OrderSubmission,
    ) -> Result<OrderPlacement, GatewayError>;

    /// Request cancellation of a single order.
    async fn cancel_order(
        &self,
        session: &SessionHandle,
        order_id: &OrderId,
    ) -> Result<CancelStatus, GatewayError>;

    /// Request cancellation of every outstanding order.
    async fn cancel_all_orders(
        &self,
        session: &SessionHandle,
    ) -> Result<Vec<CancelStatus>, GatewayError>;

    /// Query the authoritative state of a single order.
    async fn order_state(
        &self,
        session: &SessionHandle,
        order_id: &OrderId,
    ) -> Result<OrderStatusReport, GatewayError>;

    /// Query available cash.
    async fn cash_balance(&self, session: &SessionHandle) -> Result<Decimal, GatewayError>;

    /// Fetch the latest price for each symbol.
    async fn latest_prices(
        &self,
        session: &SessionHandle,
        symbols: &[String],
    ) -> Result<HashMap<String, Decimal>, GatewayError>;
}
