//! Trade request validation.
//!
//! A request is checked against the rules for its order shape and converted
//! into a wire-ready [`OrderSubmission`] strictly before any network call.
//! Validation never partially submits: a failed request produces no side
//! effect anywhere.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::gateway::{OrderSubmission, SizedOrder};
use crate::types::{OrderShape, OrderSide};

/// Errors for malformed trade requests. Always local, never reach the gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Invalid request: {shape} order requires {field}")]
    MissingField {
        shape: OrderShape,
        field: &'static str,
    },

    #[error("Invalid request: negative {field} ({value})")]
    NegativeValue { field: &'static str, value: Decimal },

    #[error("Unsupported order shape: '{0}'")]
    UnsupportedOrderShape(String),
}

/// A requested trade, prior to validation.
///
/// Which optional fields must be populated depends on the shape:
///
/// | shape                  | required fields |
/// |------------------------|-----------------|
/// | fractional_by_price    | dollar_amount   |
/// | fractional_by_quantity | quantity        |
/// | limit                  | price, quantity |
/// | market                 | quantity        |
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub shape: OrderShape,
    pub price: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub dollar_amount: Option<Decimal>,
}

impl OrderRequest {
    /// Build a request from a string-typed shape (CLI or config input).
    ///
    /// An unknown shape literal fails here, before any field checks.
    pub fn from_parts(
        symbol: impl Into<String>,
        side: OrderSide,
        shape: &str,
        price: Option<Decimal>,
        quantity: Option<Decimal>,
        dollar_amount: Option<Decimal>,
    ) -> Result<Self, RequestError> {
        let shape: OrderShape = shape
            .parse()
            .map_err(|_| RequestError::UnsupportedOrderShape(shape.to_string()))?;
        Ok(Self {
            symbol: symbol.into(),
            side,
            shape,
            price,
            quantity,
            dollar_amount,
        })
    }

    /// Build a limit order request.
    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            shape: OrderShape::Limit,
            price: Some(price),
            quantity: Some(quantity),
            dollar_amount: None,
        }
    }

    /// Build a market order request.
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            shape: OrderShape::Market,
            price: None,
            quantity: Some(quantity),
            dollar_amount: None,
        }
    }

    /// Build a fractional-by-price request (sized by dollar amount).
    pub fn fractional_by_price(
        symbol: impl Into<String>,
        side: OrderSide,
        dollar_amount: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            shape: OrderShape::FractionalByPrice,
            price: None,
            quantity: None,
            dollar_amount: Some(dollar_amount),
        }
    }

    /// Build a fractional-by-quantity request.
    pub fn fractional_by_quantity(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            shape: OrderShape::FractionalByQuantity,
            price: None,
            quantity: Some(quantity),
            dollar_amount: None,
        }
    }

    /// Check the request against the rules for its shape.
    pub fn validate(&self) -> Result<(), RequestError> {
        self.sizing().map(|_| ())
    }

    /// Validate and produce the wire sizing for this request.
    ///
    /// Limit and market orders truncate the requested quantity to a whole
    /// share count here, before transmission.
    pub fn sizing(&self) -> Result<SizedOrder, RequestError> {
        match self.shape {
            OrderShape::FractionalByPrice => {
                let amount = self.require(self.dollar_amount, "dollar_amount")?;
                Ok(SizedOrder::Notional(amount))
            }
            OrderShape::FractionalByQuantity => {
                let quantity = self.require(self.quantity, "quantity")?;
                Ok(SizedOrder::Fractional(quantity))
            }
            OrderShape::Limit => {
                let price = self.require(self.price, "price")?;
                let quantity = self.require(self.quantity, "quantity")?;
                Ok(SizedOrder::Limit {
                    shares: whole_shares(quantity),
                    price,
                })
            }
            OrderShape::Market => {
                let quantity = self.require(self.quantity, "quantity")?;
                Ok(SizedOrder::Market {
                    shares: whole_shares(quantity),
                })
            }
        }
    }

    /// Validate and convert into a wire-ready submission.
    pub fn into_submission(self) -> Result<OrderSubmission, RequestError> {
        let sizing = self.sizing()?;
        Ok(OrderSubmission {
            symbol: self.symbol,
            side: self.side,
            shape: self.shape,
            sizing,
        })
    }

    fn require(
        &self,
        value: Option<Decimal>,
        field: &'static str,
    ) -> Result<Decimal, RequestError> {
        let value = value.ok_or(RequestError::MissingField {
            shape: self.shape,
            field,
        })?;
        if value < Decimal::ZERO {
            return Err(RequestError::NegativeValue { field, value });
        }
        Ok(value)
    }
}

/// Truncate a validated non-negative quantity to a whole share count.
fn whole_shares(quantity: Decimal) -> u64 {
    quantity.trunc().to_u64().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_limit_requires_price_and_quantity() {
        let mut request = OrderRequest::limit("SOFI", OrderSide::Buy, dec!(1), dec!(1));
        assert!(request.validate().is_ok());

        request.price = None;
        assert_eq!(
            request.validate(),
            Err(RequestError::MissingField {
                shape: OrderShape::Limit,
                field: "price"
            })
        );

        let mut request = OrderRequest::limit("SOFI", OrderSide::Sell, dec!(1), dec!(1));
        request.quantity = None;
        assert_eq!(
            request.validate(),
            Err(RequestError::MissingField {
                shape: OrderShape::Limit,
                field: "quantity"
            })
        );
    }

    #[test]
    fn test_negative_values_rejected_for_every_shape() {
        let cases = [
            OrderRequest::limit("AAPL", OrderSide::Buy, dec!(-1), dec!(10)),
            OrderRequest::limit("AAPL", OrderSide::Buy, dec!(1), dec!(-10)),
            OrderRequest::market("AAPL", OrderSide::Sell, dec!(-5)),
            OrderRequest::fractional_by_price("AAPL", OrderSide::Buy, dec!(-100)),
            OrderRequest::fractional_by_quantity("AAPL", OrderSide::Sell, dec!(-0.5)),
        ];

        for request in cases {
            assert!(
                matches!(
                    request.validate(),
                    Err(RequestError::NegativeValue { .. })
                ),
                "expected negative-value rejection for {:?}",
                request
            );
        }
    }

    #[test]
    fn test_missing_field_rejected_for_every_shape() {
        for shape in [
            OrderShape::FractionalByPrice,
            OrderShape::FractionalByQuantity,
            OrderShape::Limit,
            OrderShape::Market,
        ] {
            for side in [OrderSide::Buy, OrderSide::Sell] {
                let request = OrderRequest {
                    symbol: "AAPL".to_string(),
                    side,
                    shape,
                    price: None,
                    quantity: None,
                    dollar_amount: None,
                };
                assert!(
                    matches!(request.validate(), Err(RequestError::MissingField { .. })),
                    "expected missing-field rejection for {} {}",
                    side,
                    shape
                );
            }
        }
    }

    #[test]
    fn test_whole_share_truncation() {
        let request = OrderRequest::limit("AAPL", OrderSide::Buy, dec!(2.9), dec!(150));
        assert_eq!(
            request.sizing().unwrap(),
            SizedOrder::Limit {
                shares: 2,
                price: dec!(150)
            }
        );

        let request = OrderRequest::market("AAPL", OrderSide::Sell, dec!(0.4));
        assert_eq!(request.sizing().unwrap(), SizedOrder::Market { shares: 0 });
    }

    #[test]
    fn test_fractional_sizing_preserved() {
        let request = OrderRequest::fractional_by_quantity("AAPL", OrderSide::Buy, dec!(0.25));
        assert_eq!(
            request.sizing().unwrap(),
            SizedOrder::Fractional(dec!(0.25))
        );

        let request = OrderRequest::fractional_by_price("AAPL", OrderSide::Buy, dec!(50.50));
        assert_eq!(request.sizing().unwrap(), SizedOrder::Notional(dec!(50.50)));
    }

    #[test]
    fn test_unknown_shape_literal_rejected() {
        let result = OrderRequest::from_parts(
            "AAPL",
            OrderSide::Buy,
            "stop_limit",
            Some(dec!(10)),
            Some(dec!(1)),
            None,
        );
        assert_eq!(
            result.err(),
            Some(RequestError::UnsupportedOrderShape("stop_limit".to_string()))
        );

        let request = OrderRequest::from_parts(
            "AAPL",
            OrderSide::Buy,
            "limit",
            Some(dec!(10)),
            Some(dec!(1)),
            None,
        )
        .unwrap();
        assert_eq!(request.shape, OrderShape::Limit);
    }

    #[test]
    fn test_zero_values_allowed() {
        // Zero is not negative; the brokerage decides whether it is sensible.
        let request = OrderRequest::market("AAPL", OrderSide::Buy, dec!(0));
        assert!(request.validate().is_ok());
    }
}
