//! Common Types Module
//!
//! Shared types used across the codebase to avoid circular dependencies.

use serde::{Deserialize, Serialize};

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// Pricing/sizing mode of an order.
///
/// A closed enumeration so an unsupported shape is rejected at the string
/// boundary rather than falling through a runtime dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderShape {
    /// Fractional shares sized by a total dollar amount
    FractionalByPrice,
    /// Fractional shares sized by a (possibly non-integer) quantity
    FractionalByQuantity,
    /// Limit order: whole shares at a limit price
    Limit,
    /// Market order: whole shares at the prevailing price
    Market,
}

impl std::fmt::Display for OrderShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderShape::FractionalByPrice => write!(f, "fractional_by_price"),
            OrderShape::FractionalByQuantity => write!(f, "fractional_by_quantity"),
            OrderShape::Limit => write!(f, "limit"),
            OrderShape::Market => write!(f, "market"),
        }
    }
}

impl std::str::FromStr for OrderShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fractional_by_price" | "fractional-by-price" => Ok(OrderShape::FractionalByPrice),
            "fractional_by_quantity" | "fractional-by-quantity" => {
                Ok(OrderShape::FractionalByQuantity)
            }
            "limit" => Ok(OrderShape::Limit),
            "market" => Ok(OrderShape::Market),
            _ => Err(format!(
                "Unsupported order shape: '{}'. Valid options: fractional_by_price, \
                 fractional_by_quantity, limit, market",
                s
            )),
        }
    }
}
