//! Typed response schemas for brokerage gateway operations.
//!
//! Each gateway call returns a dedicated struct with required fields modelled
//! directly and anything the brokerage sends beyond them preserved in a
//! flattened raw map. Checking whether a placement carries an order id is a
//! typed `Option` match, not a key probe on an untyped payload.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::orders::OrderId;
use crate::types::{OrderShape, OrderSide};

/// Opaque handle for an authenticated brokerage session.
///
/// Returned by `login` and threaded through every subsequent gateway call,
/// so there is no hidden process-wide login state and multiple sessions
/// (or fakes in tests) can coexist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    token: String,
}

impl SessionHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Brokerage login credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// One open position as reported by the positions query.
///
/// Positions reference their instrument by an opaque ref that must be
/// resolved to a ticker symbol via `resolve_instrument`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionEntry {
    pub instrument_ref: String,
    pub quantity: Decimal,
    pub created_at: DateTime<Utc>,
    #[serde(flatten, default)]
    pub raw: HashMap<String, Value>,
}

/// One holding as reported by the holdings query, keyed by symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingRecord {
    pub quantity: Decimal,
    pub average_cost: Decimal,
    #[serde(flatten, default)]
    pub raw: HashMap<String, Value>,
}

/// Instrument metadata resolved from an instrument ref.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentInfo {
    pub symbol: String,
    #[serde(flatten, default)]
    pub raw: HashMap<String, Value>,
}

/// One outstanding order as reported by the open-orders query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenOrderEntry {
    pub order_id: OrderId,
    pub instrument_ref: String,
    pub side: OrderSide,
    pub shape: OrderShape,
    pub submitted_at: DateTime<Utc>,
}

/// Validated sizing for an order, produced by request validation.
///
/// Limit and market orders carry whole-share counts; the truncation from a
/// fractional requested quantity happens during validation, before anything
/// reaches the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizedOrder {
    /// Fractional shares worth a total dollar amount
    Notional(Decimal),
    /// Fractional share quantity
    Fractional(Decimal),
    /// Whole shares at a limit price
    Limit { shares: u64, price: Decimal },
    /// Whole shares at market
    Market { shares: u64 },
}

/// A fully validated order ready for transmission.
#[derive(Debug, Clone)]
pub struct OrderSubmission {
    pub symbol: String,
    pub side: OrderSide,
    pub shape: OrderShape,
    pub sizing: SizedOrder,
}

/// Gateway response to an order placement.
///
/// A response without an order id is a business-level rejection: the
/// brokerage accepted the call but declined the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPlacement {
    pub order_id: Option<OrderId>,
    pub reject_reason: Option<String>,
    #[serde(flatten, default)]
    pub raw: HashMap<String, Value>,
}

/// Outcome of a cancellation request.
///
/// Acknowledgement only; the order is not confirmed cancelled until a later
/// state query observes the terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelStatus {
    Acknowledged,
    Refused { reason: String },
}

/// Gateway-reported state of a single order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusReport {
    pub state: crate::orders::OrderState,
    pub reject_reason: Option<String>,
}
