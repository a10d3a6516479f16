use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::*;

// ─── Token Queries ──────────────────────────────────────────────────────────

/// Get catalog tokens, optionally filtered by a case-insensitive
/// substring over name, symbol and owner address.
pub async fn list_tokens(
    pool: &PgPool,
    search: Option<&str>,
) -> Result<Vec<TokenRow>, sqlx::Error> {
    match search {
        None => {
            sqlx::query_as::<_, TokenRow>("SELECT * FROM tokens ORDER BY created_at DESC")
                .fetch_all(pool)
                .await
        }
        Some(term) => {
            let pattern = format!("%{term}%");
            sqlx::query_as::<_, TokenRow>(
                r#"
                SELECT * FROM tokens
                WHERE name ILIKE $1 OR symbol ILIKE $1 OR owner_address ILIKE $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(pattern)
            .fetch_all(pool)
            .await
        }
    }
}

/// Get tokens for a set of addresses.
pub async fn tokens_by_addresses(
    pool: &PgPool,
    addresses: &[String],
) -> Result<Vec<TokenRow>, sqlx::Error> {
    sqlx::query_as::<_, TokenRow>("SELECT * FROM tokens WHERE address = ANY($1)")
        .bind(addresses)
        .fetch_all(pool)
        .await
}

/// Get a single token by address.
pub async fn get_token(pool: &PgPool, address: &str) -> Result<Option<TokenRow>, sqlx::Error> {
    sqlx::query_as::<_, TokenRow>("SELECT * FROM tokens WHERE address = $1")
        .bind(address)
        .fetch_optional(pool)
        .await
}

/// Insert a new token (ignore if already exists).
pub async fn upsert_token(pool: &PgPool, token: &TokenRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO tokens (address, name, symbol, owner_address, tvl, total_supply, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (address) DO NOTHING
        "#,
    )
    .bind(&token.address)
    .bind(&token.name)
    .bind(&token.symbol)
    .bind(&token.owner_address)
    .bind(token.tvl)
    .bind(&token.total_supply)
    .bind(token.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

// ─── Content Queries ────────────────────────────────────────────────────────

/// Get every published content item that carries a token address.
pub async fn list_content_links(pool: &PgPool) -> Result<Vec<ContentItemRow>, sqlx::Error> {
    sqlx::query_as::<_, ContentItemRow>(
        r#"
        SELECT token_address, video_id, video_title, playback_id, thumbnail_url
        FROM content_items
        WHERE token_address IS NOT NULL AND status = 'published'
        "#,
    )
    .fetch_all(pool)
    .await
}

// ─── Ledger Queries ─────────────────────────────────────────────────────────

/// Get mint/burn events at or after `since`, newest first. Ties on the
/// timestamp break by insertion order so replays see a total order.
pub async fn events_since(
    pool: &PgPool,
    since: DateTime<Utc>,
    token: Option<&str>,
) -> Result<Vec<EventRow>, sqlx::Error> {
    match token {
        None => {
            sqlx::query_as::<_, EventRow>(
                r#"
                SELECT * FROM token_events
                WHERE created_at >= $1
                ORDER BY created_at DESC, id DESC
                "#,
            )
            .bind(since)
            .fetch_all(pool)
            .await
        }
        Some(address) => {
            sqlx::query_as::<_, EventRow>(
                r#"
                SELECT * FROM token_events
                WHERE created_at >= $1 AND token_address = $2
                ORDER BY created_at DESC, id DESC
                "#,
            )
            .bind(since)
            .bind(address)
            .fetch_all(pool)
            .await
        }
    }
}

// ─── Profile Queries ────────────────────────────────────────────────────────

/// Get creator profiles for a set of lowercased owner addresses.
pub async fn profiles_by_owners(
    pool: &PgPool,
    owners: &[String],
) -> Result<Vec<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT owner_address, username, avatar_url
        FROM creator_profiles
        WHERE LOWER(owner_address) = ANY($1)
        "#,
    )
    .bind(owners)
    .fetch_all(pool)
    .await
}
