use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ─── Token ──────────────────────────────────────────────────────────────────

/// A catalog token row.
///
/// `total_supply` is stored as TEXT: the value is a fixed-point integer
/// with 18 fractional decimals and does not fit Postgres' BIGINT.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TokenRow {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub owner_address: String,
    pub tvl: f64,
    pub total_supply: String,
    pub created_at: DateTime<Utc>,
}

// ─── Content Item ───────────────────────────────────────────────────────────

/// A published content item that carries a token address.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentItemRow {
    pub token_address: String,
    pub video_id: i64,
    pub video_title: String,
    pub playback_id: Option<String>,
    pub thumbnail_url: Option<String>,
}

// ─── Ledger Event ───────────────────────────────────────────────────────────

/// An immutable mint/burn row from the transaction ledger.
/// `amount` is TEXT for the same reason as `TokenRow::total_supply`;
/// `collateral` is recorded for mints only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRow {
    pub id: i64,
    pub token_address: String,
    pub event_type: String,
    pub amount: String,
    pub collateral: Option<f64>,
    pub created_at: DateTime<Utc>,
}

// ─── Creator Profile ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub owner_address: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}
