//! Order Management Module
//!
//! Provides trade request validation and in-memory order lifecycle tracking.
//!
//! # Architecture
//!
//! - `OrderRequest` - shape-keyed validation of trade parameters
//! - `OrderRegistry` - order-id keyed registry with brokerage reconciliation
//! - Core types - `OrderId`, `OrderState`, `OrderRecord`

mod registry;
mod request;
mod types;

pub use registry::OrderRegistry;
pub use request::{OrderRequest, RequestError};
pub use types::{OrderId, OrderRecord, OrderState};
