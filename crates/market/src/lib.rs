//! Market-data aggregation for bonding-curve creator tokens: catalog
//! merging, live freshness refresh, 24-hour metric reconstruction by
//! reverse replay, and result assembly.

pub mod aggregate;
pub mod assemble;
pub mod cache;
pub mod ports;
pub mod price;
pub mod refresh;
pub mod replay;
pub mod service;
pub mod types;

pub use service::MarketService;

#[cfg(test)]
pub(crate) mod testutil;
