//! Core types for order lifecycle tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{OrderShape, OrderSide};

/// Type-safe order identifier (brokerage-assigned).
///
/// Newtype wrapper to prevent accidentally mixing order ids with other
/// string types at compile time. Immutable once assigned by the brokerage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Create a new OrderId from any string-like type.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let s: String = id.into();
        debug_assert!(!s.is_empty(), "OrderId cannot be empty");
        if s.is_empty() {
            tracing::warn!("Creating OrderId with empty string - this may cause tracking issues");
        }
        Self(s)
    }

    /// Get the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner String.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Order lifecycle states as reported by the brokerage.
///
/// Terminal states are clearly distinguished: once an order is filled,
/// cancelled or rejected, no further transition occurs and the registry
/// drops it at the next reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderState {
    /// Accepted by the brokerage but not yet working
    Queued,
    /// Working at the brokerage, awaiting fills
    Open,
    /// Some quantity executed, remainder still working
    PartiallyFilled,
    /// All quantity executed
    Filled,
    /// Cancelled (by user or brokerage)
    Cancelled,
    /// Rejected by the brokerage (insufficient funds, invalid params, etc.)
    Rejected,
}

impl OrderState {
    /// Returns true if no further state transition can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Rejected)
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Open => write!(f, "open"),
            Self::PartiallyFilled => write!(f, "partially_filled"),
            Self::Filled => write!(f, "filled"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// A tracked order: created the instant a placement returns a brokerage id,
/// removed from the registry the instant reconciliation observes a terminal
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Brokerage-assigned order id
    pub id: OrderId,
    /// Ticker symbol
    pub symbol: String,
    /// Buy or sell
    pub side: OrderSide,
    /// Pricing/sizing mode
    pub shape: OrderShape,
    /// When the order was submitted (or first observed, for seeded orders)
    pub submitted_at: DateTime<Utc>,
    /// Last known state
    pub state: OrderState,
}

impl OrderRecord {
    /// Create a record for a freshly accepted submission.
    #[must_use]
    pub fn open(id: OrderId, symbol: String, side: OrderSide, shape: OrderShape) -> Self {
        Self {
            id,
            symbol,
            side,
            shape,
            submitted_at: Utc::now(),
            state: OrderState::Open,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
