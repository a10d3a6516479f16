//! Collaborator interfaces consumed by the market pipeline.
//!
//! Everything with I/O behind it is a trait so the pipeline can be driven
//! by Postgres + RPC in production and by in-memory fakes in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mintpulse_core::AppError;

use crate::types::{CatalogToken, ContentLink, CreatorProfile, CurveState, IndexedToken, TradeEvent};

/// Persisted, queryable catalog of token records.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Direct-origin tokens, optionally pre-filtered by a search term.
    async fn direct_tokens(&self, search: Option<&str>) -> Result<Vec<CatalogToken>, AppError>;

    /// Published content items that reference a token address.
    async fn content_links(&self) -> Result<Vec<ContentLink>, AppError>;

    /// Catalog rows for a set of addresses (missing addresses are absent).
    async fn tokens_by_addresses(
        &self,
        addresses: &[String],
    ) -> Result<Vec<CatalogToken>, AppError>;

    async fn token_by_address(&self, address: &str) -> Result<Option<CatalogToken>, AppError>;

    /// Idempotent insert — repeating it for a known address is a no-op.
    async fn upsert_token(&self, token: &CatalogToken) -> Result<(), AppError>;
}

/// Append-only store of mint/burn transaction events.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Events at or after `since`, newest first (ties broken by insertion
    /// order), optionally scoped to one token.
    async fn events_since(
        &self,
        since: DateTime<Utc>,
        token: Option<&str>,
    ) -> Result<Vec<TradeEvent>, AppError>;
}

/// Read-only map of owner address → display profile.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Batched lookup; owners without a profile are simply absent.
    async fn profiles_for(&self, owners: &[String]) -> Result<Vec<CreatorProfile>, AppError>;
}

/// Batched read access to the live bonding-curve contract.
#[async_trait]
pub trait CurveReader: Send + Sync {
    /// Current curve state for each address that could be read. Absence of
    /// an address in the result is a per-token failure, not an error.
    async fn curve_states(
        &self,
        addresses: &[String],
    ) -> Result<HashMap<String, CurveState>, AppError>;
}

/// External indexer used only as a catch-up source when the catalog is
/// sparse.
#[async_trait]
pub trait IssuanceIndexer: Send + Sync {
    /// Recently issued tokens, newest first, bounded by `limit`.
    async fn recent_tokens(&self, limit: usize) -> Result<Vec<IndexedToken>, AppError>;
}
