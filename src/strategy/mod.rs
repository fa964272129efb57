//! Strategy extension point.
//!
//! The polling loop performs no trading action by itself; it hands each
//! round of universe prices to a [`Strategy`]. No concrete strategy ships
//! with the core.

use std::collections::HashMap;
use std::error::Error;

use async_trait::async_trait;
use rust_decimal::Decimal;

/// Per-iteration hook invoked by the polling loop with the latest prices
/// for the trading universe.
#[async_trait]
pub trait Strategy: Send {
    async fn on_prices(
        &mut self,
        prices: &HashMap<String, Decimal>,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// The do-nothing strategy: observe prices, take no action.
#[derive(Debug, Default, Clone, Copy)]
pub struct Hold;

#[async_trait]
impl Strategy for Hold {
    async fn on_prices(
        &mut self,
        _prices: &HashMap<String, Decimal>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
