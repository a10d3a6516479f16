use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

// ─── Token Records ──────────────────────────────────────────────────────────

/// Which origin a token record was observed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenOrigin {
    #[serde(rename = "direct")]
    Direct,
    #[serde(rename = "content-derived")]
    ContentDerived,
}

/// A token row as stored in the catalog (the direct-issuance origin).
///
/// `total_supply` is a fixed-point integer with 18 fractional decimal
/// digits; `tvl` is the collateral backing the curve, already in decimal
/// units.
#[derive(Debug, Clone)]
pub struct CatalogToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub owner_address: String,
    pub tvl: f64,
    pub total_supply: u128,
    pub created_at: DateTime<Utc>,
}

/// A published content item that references a token address.
#[derive(Debug, Clone)]
pub struct ContentLink {
    pub token_address: String,
    pub video_id: i64,
    pub video_title: String,
    pub playback_id: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// A creator profile keyed by owner address.
#[derive(Debug, Clone)]
pub struct CreatorProfile {
    pub owner_address: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

/// A token observed through the external issuance indexer, used only to
/// backfill the catalog. Carries no financial state.
#[derive(Debug, Clone)]
pub struct IndexedToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub owner_address: String,
    pub created_at: DateTime<Utc>,
}

// ─── Ledger Events ──────────────────────────────────────────────────────────

/// Transaction event kind. Direction of the supply delta is implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Mint,
    Burn,
}

/// An immutable mint/burn event from the transaction ledger.
///
/// `collateral` is the collateral moved by the event and is recorded
/// exactly for mints only; the ledger has no receipt for collateral
/// returned on burns, so it is `None` there.
#[derive(Debug, Clone)]
pub struct TradeEvent {
    pub token_address: String,
    pub kind: EventKind,
    /// Supply delta magnitude, fixed-point 18 decimals, always positive.
    pub amount: u128,
    pub collateral: Option<f64>,
    pub created_at: DateTime<Utc>,
}

// ─── Chain State ────────────────────────────────────────────────────────────

/// Live bonding-curve state for one token, as read from the viewer
/// contract.
#[derive(Debug, Clone, Copy)]
pub struct CurveState {
    pub tvl: f64,
    pub total_supply: u128,
    pub price: f64,
}

// ─── Query Parameters ───────────────────────────────────────────────────────

/// Origin filter for the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginFilter {
    #[default]
    All,
    Direct,
    ContentDerived,
}

impl OriginFilter {
    /// Parse the `type` query parameter; unknown values mean `All`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "direct" => Self::Direct,
            "content-derived" => Self::ContentDerived,
            _ => Self::All,
        }
    }

    pub fn matches(self, origin: TokenOrigin) -> bool {
        match self {
            Self::All => true,
            Self::Direct => origin == TokenOrigin::Direct,
            Self::ContentDerived => origin == TokenOrigin::ContentDerived,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Direct => "direct",
            Self::ContentDerived => "content-derived",
        }
    }
}

/// Sortable fields of the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Price,
    #[default]
    Tvl,
    MarketCap,
    Volume24h,
    PriceChange24h,
    CreatedAt,
}

impl SortField {
    /// Parse the `sortBy` query parameter; unknown fields default to tvl.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "price" => Self::Price,
            "tvl" => Self::Tvl,
            "market_cap" => Self::MarketCap,
            "volume_24h" => Self::Volume24h,
            "price_change_24h" => Self::PriceChange24h,
            "created_at" => Self::CreatedAt,
            _ => Self::Tvl,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }
}

/// Fully parsed listing query.
#[derive(Debug, Clone, Default)]
pub struct MarketQuery {
    pub origin: OriginFilter,
    /// Normalised search term — never `Some("")`.
    pub search: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub limit: usize,
    pub offset: usize,
    pub include_stats: bool,
    pub fresh: bool,
}

// ─── Assembled Output ───────────────────────────────────────────────────────

fn supply_as_string<S: Serializer>(v: &u128, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(v)
}

/// A token record with its derived market snapshot, as returned to the
/// client. Built fresh on every request; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct MarketToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub owner_address: String,
    #[serde(rename = "type")]
    pub origin: TokenOrigin,
    pub price: f64,
    pub tvl: f64,
    #[serde(serialize_with = "supply_as_string")]
    pub total_supply: u128,
    /// Equal to tvl by platform convention — see `price::spot_price`.
    pub market_cap: f64,
    pub price_change_24h: f64,
    pub volume_24h: f64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_avatar_url: Option<String>,
}

impl MarketToken {
    /// Lift a catalog row into an output record with an empty snapshot.
    pub fn from_catalog(token: CatalogToken, origin: TokenOrigin) -> Self {
        Self {
            address: token.address,
            name: token.name,
            symbol: token.symbol,
            owner_address: token.owner_address,
            origin,
            price: 0.0,
            tvl: token.tvl,
            total_supply: token.total_supply,
            market_cap: token.tvl,
            price_change_24h: 0.0,
            volume_24h: 0.0,
            created_at: token.created_at,
            video_id: None,
            video_title: None,
            playback_id: None,
            thumbnail_url: None,
            creator_username: None,
            creator_avatar_url: None,
        }
    }

    /// Attach content linkage and reclassify as content-derived.
    pub fn with_content_link(mut self, link: &ContentLink) -> Self {
        self.origin = TokenOrigin::ContentDerived;
        self.video_id = Some(link.video_id);
        self.video_title = Some(link.video_title.clone());
        self.playback_id = link.playback_id.clone();
        self.thumbnail_url = link.thumbnail_url.clone();
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

/// Aggregate market statistics, computed over the full filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct MarketStats {
    pub total_tokens: usize,
    pub total_tvl: f64,
    pub volume_24h: f64,
    pub top_gainers: Vec<MarketToken>,
    pub top_losers: Vec<MarketToken>,
}

/// Response body of the listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MarketPage {
    pub data: Vec<MarketToken>,
    pub pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<MarketStats>,
}

// ─── Price History ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryPeriod {
    #[default]
    SevenDays,
    ThirtyDays,
    All,
}

impl HistoryPeriod {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "30d" => Self::ThirtyDays,
            "all" => Self::All,
            _ => Self::SevenDays,
        }
    }

    /// Window start relative to `now`.
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::SevenDays => now - chrono::Duration::days(7),
            Self::ThirtyDays => now - chrono::Duration::days(30),
            Self::All => DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryInterval {
    #[default]
    Hour,
    Day,
}

impl HistoryInterval {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "day" => Self::Day,
            _ => Self::Hour,
        }
    }

    pub fn bucket_secs(self) -> i64 {
        match self {
            Self::Hour => 3600,
            Self::Day => 86_400,
        }
    }
}

/// One aggregated point of a token's price history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPoint {
    pub timestamp: i64,
    pub price: f64,
    pub volume: f64,
    pub tvl: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryTokenInfo {
    pub address: String,
    pub current_price: f64,
    pub current_tvl: f64,
}

/// Response body of the price-history endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TokenHistory {
    pub data: Vec<HistoryPoint>,
    pub token: HistoryTokenInfo,
}
