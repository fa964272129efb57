pub mod cli;
pub mod gateway;
pub mod observability;
pub mod orders;
pub mod portfolio;
pub mod sandbox;
pub mod session;
pub mod strategy;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;
