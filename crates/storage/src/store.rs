//! Postgres-backed implementations of the market collaborator traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mintpulse_core::AppError;
use mintpulse_market::ports::{CatalogStore, LedgerStore, ProfileStore};
use mintpulse_market::types::{
    CatalogToken, ContentLink, CreatorProfile, EventKind, TradeEvent,
};
use sqlx::PgPool;
use tracing::warn;

use crate::models::{ContentItemRow, EventRow, ProfileRow, TokenRow};
use crate::repos;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn storage_err(err: sqlx::Error) -> AppError {
    AppError::Storage(err.to_string())
}

/// Parse a TEXT fixed-point amount. A malformed row maps to zero, which
/// the freshness pass treats as stale and overwrites from the chain.
fn parse_amount(raw: &str, address: &str, column: &str) -> u128 {
    match raw.parse::<u128>() {
        Ok(v) => v,
        Err(_) => {
            warn!(address, column, raw, "malformed fixed-point amount, treating as zero");
            0
        }
    }
}

fn token_from_row(row: TokenRow) -> CatalogToken {
    let total_supply = parse_amount(&row.total_supply, &row.address, "total_supply");
    CatalogToken {
        address: row.address,
        name: row.name,
        symbol: row.symbol,
        owner_address: row.owner_address,
        tvl: row.tvl,
        total_supply,
        created_at: row.created_at,
    }
}

fn link_from_row(row: ContentItemRow) -> ContentLink {
    ContentLink {
        token_address: row.token_address,
        video_id: row.video_id,
        video_title: row.video_title,
        playback_id: row.playback_id,
        thumbnail_url: row.thumbnail_url,
    }
}

fn profile_from_row(row: ProfileRow) -> CreatorProfile {
    CreatorProfile {
        owner_address: row.owner_address,
        username: row.username,
        avatar_url: row.avatar_url,
    }
}

/// Rows with an unrecognised event type are dropped, not zeroed: a zero
/// amount would still move the replay's collateral estimate.
fn event_from_row(row: EventRow) -> Option<TradeEvent> {
    let kind = match row.event_type.as_str() {
        "mint" => EventKind::Mint,
        "burn" => EventKind::Burn,
        other => {
            warn!(id = row.id, event_type = other, "unknown ledger event type, skipping");
            return None;
        }
    };
    let amount = parse_amount(&row.amount, &row.token_address, "amount");
    Some(TradeEvent {
        token_address: row.token_address,
        kind,
        amount,
        collateral: row.collateral,
        created_at: row.created_at,
    })
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn direct_tokens(&self, search: Option<&str>) -> Result<Vec<CatalogToken>, AppError> {
        let rows = repos::list_tokens(&self.pool, search)
            .await
            .map_err(storage_err)?;
        Ok(rows.into_iter().map(token_from_row).collect())
    }

    async fn content_links(&self) -> Result<Vec<ContentLink>, AppError> {
        let rows = repos::list_content_links(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(rows.into_iter().map(link_from_row).collect())
    }

    async fn tokens_by_addresses(
        &self,
        addresses: &[String],
    ) -> Result<Vec<CatalogToken>, AppError> {
        let rows = repos::tokens_by_addresses(&self.pool, addresses)
            .await
            .map_err(storage_err)?;
        Ok(rows.into_iter().map(token_from_row).collect())
    }

    async fn token_by_address(&self, address: &str) -> Result<Option<CatalogToken>, AppError> {
        let row = repos::get_token(&self.pool, address)
            .await
            .map_err(storage_err)?;
        Ok(row.map(token_from_row))
    }

    async fn upsert_token(&self, token: &CatalogToken) -> Result<(), AppError> {
        let row = TokenRow {
            address: token.address.clone(),
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            owner_address: token.owner_address.clone(),
            tvl: token.tvl,
            total_supply: token.total_supply.to_string(),
            created_at: token.created_at,
        };
        repos::upsert_token(&self.pool, &row)
            .await
            .map_err(storage_err)
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn events_since(
        &self,
        since: DateTime<Utc>,
        token: Option<&str>,
    ) -> Result<Vec<TradeEvent>, AppError> {
        let rows = repos::events_since(&self.pool, since, token)
            .await
            .map_err(storage_err)?;
        Ok(rows.into_iter().filter_map(event_from_row).collect())
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn profiles_for(&self, owners: &[String]) -> Result<Vec<CreatorProfile>, AppError> {
        let rows = repos::profiles_by_owners(&self.pool, owners)
            .await
            .map_err(storage_err)?;
        Ok(rows.into_iter().map(profile_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event_row(event_type: &str, amount: &str) -> EventRow {
        EventRow {
            id: 1,
            token_address: "0x1".to_string(),
            event_type: event_type.to_string(),
            amount: amount.to_string(),
            collateral: Some(5.0),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn malformed_supply_maps_to_zero() {
        assert_eq!(parse_amount("not-a-number", "0x1", "total_supply"), 0);
        assert_eq!(parse_amount("-5", "0x1", "total_supply"), 0);
        assert_eq!(
            parse_amount("1000000000000000000", "0x1", "total_supply"),
            1_000_000_000_000_000_000
        );
    }

    #[test]
    fn unknown_event_type_is_dropped() {
        assert!(event_from_row(event_row("transfer", "10")).is_none());

        let mint = event_from_row(event_row("mint", "10")).unwrap();
        assert_eq!(mint.kind, EventKind::Mint);
        assert_eq!(mint.amount, 10);

        let burn = event_from_row(event_row("burn", "10")).unwrap();
        assert_eq!(burn.kind, EventKind::Burn);
    }
}
