//! Mintpulse API Server — serves aggregated creator-token market data.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use alloy::primitives::Address;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use mintpulse_chain::{CurveClient, SubgraphClient, create_provider};
use mintpulse_core::{Settings, telemetry};
use mintpulse_market::{
    MarketService, cache,
    types::{
        HistoryInterval, HistoryPeriod, MarketQuery, OriginFilter, SortField, SortOrder,
    },
};
use mintpulse_storage::{self as storage, PgStore};
use serde::{Deserialize, Serialize};

/// Shared application state.
struct AppState {
    service: MarketService,
    deadline: Duration,
}

#[tokio::main]
async fn main() {
    telemetry::init();
    let settings = Settings::from_env().expect("Failed to load settings");

    tracing::info!("Starting Mintpulse API Server");

    let pool = storage::connect(&settings.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Database ready");

    let provider = create_provider(&settings.rpc_url).expect("Invalid RPC URL");
    let viewer: Address = settings
        .curve_viewer_address
        .parse()
        .expect("Invalid curve viewer address");

    let store = Arc::new(PgStore::new(pool));
    let service = MarketService::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(CurveClient::new(viewer, provider)),
        Arc::new(SubgraphClient::new(settings.indexer_url.clone())),
    );

    let state = Arc::new(AppState {
        service,
        deadline: Duration::from_secs(settings.request_deadline_secs),
    });

    let app = Router::new()
        .route("/api/v1/market/tokens", get(market_tokens))
        .route("/api/v1/market/tokens/:address/history", get(token_history))
        .route("/health", get(health))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.api_port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

// ─── Query Params ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokensParams {
    #[serde(rename = "type")]
    origin: Option<String>,
    search: Option<String>,
    #[serde(rename = "sortBy")]
    sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    sort_order: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
    #[serde(rename = "includeStats")]
    include_stats: Option<bool>,
    fresh: Option<bool>,
}

impl TokensParams {
    fn into_query(self) -> MarketQuery {
        let search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        MarketQuery {
            origin: self
                .origin
                .as_deref()
                .map(OriginFilter::parse)
                .unwrap_or_default(),
            search,
            sort_by: self
                .sort_by
                .as_deref()
                .map(SortField::parse)
                .unwrap_or_default(),
            sort_order: self
                .sort_order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
            limit: self.limit.unwrap_or(50),
            offset: self.offset.unwrap_or(0),
            include_stats: self.include_stats.unwrap_or(false),
            fresh: self.fresh.unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    period: Option<String>,
    interval: Option<String>,
}

// ─── Error Responses ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ApiError {
    error: String,
    details: String,
}

fn internal_err(error: &str, details: String) -> (StatusCode, Json<ApiError>) {
    tracing::error!(error, details = details.as_str(), "Request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            error: error.to_string(),
            details,
        }),
    )
}

fn not_found(details: String) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError {
            error: "Token not found".to_string(),
            details,
        }),
    )
}

// ─── Handlers ───────────────────────────────────────────────────────────────

async fn health() -> &'static str {
    "ok"
}

/// GET /api/v1/market/tokens — merged, refreshed and replayed listing.
async fn market_tokens(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TokensParams>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiError>)> {
    let query = params.into_query();
    let policy = cache::advise(&query);

    let page = tokio::time::timeout(state.deadline, state.service.market_tokens(&query))
        .await
        .map_err(|_| {
            internal_err(
                "Failed to fetch market data",
                "request deadline exceeded".to_string(),
            )
        })?
        .map_err(|e| internal_err("Failed to fetch market data", e.to_string()))?;

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&policy.cache_control()) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    if let Ok(value) = HeaderValue::from_str(&policy.tag_header()) {
        headers.insert(HeaderName::from_static("cache-tag"), value);
    }

    Ok((headers, Json(page)))
}

/// GET /api/v1/market/tokens/:address/history — bucketed price history.
async fn token_history(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiError>)> {
    let period = params
        .period
        .as_deref()
        .map(HistoryPeriod::parse)
        .unwrap_or_default();
    let interval = params
        .interval
        .as_deref()
        .map(HistoryInterval::parse)
        .unwrap_or_default();

    let history = tokio::time::timeout(
        state.deadline,
        state.service.token_history(&address, period, interval),
    )
    .await
    .map_err(|_| {
        internal_err(
            "Failed to fetch price history",
            "request deadline exceeded".to_string(),
        )
    })?
    .map_err(|e| internal_err("Failed to fetch price history", e.to_string()))?;

    match history {
        Some(h) => Ok(Json(h)),
        None => Err(not_found(address)),
    }
}
