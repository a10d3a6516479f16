//! In-memory fakes for the collaborator traits, shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mintpulse_core::AppError;

use crate::ports::{CatalogStore, CurveReader, IssuanceIndexer, LedgerStore, ProfileStore};
use crate::types::{
    CatalogToken, ContentLink, CreatorProfile, CurveState, EventKind, IndexedToken, MarketToken,
    TokenOrigin, TradeEvent,
};

const ONE: u128 = 1_000_000_000_000_000_000;

// ─── Builders ───────────────────────────────────────────────────────────────

pub fn catalog_token(address: &str, name: &str, tvl: f64) -> CatalogToken {
    CatalogToken {
        address: address.to_string(),
        name: name.to_string(),
        symbol: name.to_uppercase(),
        owner_address: format!("{address}-owner"),
        tvl,
        total_supply: ONE,
        created_at: Utc::now(),
    }
}

pub fn content_link(address: &str, video_id: i64, title: &str) -> ContentLink {
    ContentLink {
        token_address: address.to_string(),
        video_id,
        video_title: title.to_string(),
        playback_id: Some(format!("pb-{video_id}")),
        thumbnail_url: None,
    }
}

pub fn indexed_token(address: &str, name: &str) -> IndexedToken {
    IndexedToken {
        address: address.to_string(),
        name: name.to_string(),
        symbol: name.to_uppercase(),
        owner_address: format!("{address}-owner"),
        created_at: Utc::now(),
    }
}

pub fn trade_event(
    address: &str,
    kind: EventKind,
    amount: u128,
    collateral: Option<f64>,
    minutes_ago: i64,
) -> TradeEvent {
    TradeEvent {
        token_address: address.to_string(),
        kind,
        amount,
        collateral,
        created_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

pub fn market_token(address: &str, tvl: f64, total_supply: u128) -> MarketToken {
    let mut token = catalog_token(address, "Token", tvl);
    token.total_supply = total_supply;
    MarketToken::from_catalog(token, TokenOrigin::Direct)
}

// ─── FakeCatalog ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeCatalog {
    tokens: Mutex<Vec<CatalogToken>>,
    links: Vec<ContentLink>,
    fail_upserts: AtomicBool,
    upsert_attempts: AtomicUsize,
}

impl FakeCatalog {
    pub fn new(tokens: Vec<CatalogToken>, links: Vec<ContentLink>) -> Self {
        Self {
            tokens: Mutex::new(tokens),
            links,
            ..Default::default()
        }
    }

    pub fn fail_upserts(&self) {
        self.fail_upserts.store(true, Ordering::SeqCst);
    }

    pub fn upsert_attempts(&self) -> usize {
        self.upsert_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogStore for FakeCatalog {
    async fn direct_tokens(&self, search: Option<&str>) -> Result<Vec<CatalogToken>, AppError> {
        let tokens = self.tokens.lock().unwrap();
        Ok(match search {
            None => tokens.clone(),
            Some(term) => {
                let needle = term.to_lowercase();
                tokens
                    .iter()
                    .filter(|t| {
                        t.name.to_lowercase().contains(&needle)
                            || t.symbol.to_lowercase().contains(&needle)
                            || t.owner_address.to_lowercase().contains(&needle)
                    })
                    .cloned()
                    .collect()
            }
        })
    }

    async fn content_links(&self) -> Result<Vec<ContentLink>, AppError> {
        Ok(self.links.clone())
    }

    async fn tokens_by_addresses(
        &self,
        addresses: &[String],
    ) -> Result<Vec<CatalogToken>, AppError> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens
            .iter()
            .filter(|t| addresses.contains(&t.address))
            .cloned()
            .collect())
    }

    async fn token_by_address(&self, address: &str) -> Result<Option<CatalogToken>, AppError> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens.iter().find(|t| t.address == address).cloned())
    }

    async fn upsert_token(&self, token: &CatalogToken) -> Result<(), AppError> {
        self.upsert_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(AppError::Storage("upsert rejected".into()));
        }
        let mut tokens = self.tokens.lock().unwrap();
        if !tokens.iter().any(|t| t.address == token.address) {
            tokens.push(token.clone());
        }
        Ok(())
    }
}

// ─── FakeLedger ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeLedger {
    events: Vec<TradeEvent>,
}

impl FakeLedger {
    pub fn with_events(events: Vec<TradeEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl LedgerStore for FakeLedger {
    async fn events_since(
        &self,
        since: DateTime<Utc>,
        token: Option<&str>,
    ) -> Result<Vec<TradeEvent>, AppError> {
        let mut events: Vec<TradeEvent> = self
            .events
            .iter()
            .filter(|e| e.created_at >= since)
            .filter(|e| token.is_none_or(|t| e.token_address == t))
            .cloned()
            .collect();
        events.sort_by_key(|e| std::cmp::Reverse(e.created_at));
        Ok(events)
    }
}

// ─── FakeProfiles ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeProfiles {
    profiles: Vec<CreatorProfile>,
}

impl FakeProfiles {
    pub fn with_profile(owner: &str, username: &str) -> Self {
        Self {
            profiles: vec![CreatorProfile {
                owner_address: owner.to_string(),
                username: Some(username.to_string()),
                avatar_url: None,
            }],
        }
    }
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn profiles_for(&self, owners: &[String]) -> Result<Vec<CreatorProfile>, AppError> {
        Ok(self
            .profiles
            .iter()
            .filter(|p| owners.contains(&p.owner_address.to_lowercase()))
            .cloned()
            .collect())
    }
}

// ─── FakeCurve ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeCurve {
    states: HashMap<String, CurveState>,
    fail: bool,
    calls: AtomicUsize,
    last_batch_len: AtomicUsize,
}

impl FakeCurve {
    pub fn with_states(states: HashMap<String, CurveState>) -> Self {
        Self { states, ..Default::default() }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_batch_len(&self) -> usize {
        self.last_batch_len.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CurveReader for FakeCurve {
    async fn curve_states(
        &self,
        addresses: &[String],
    ) -> Result<HashMap<String, CurveState>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_batch_len.store(addresses.len(), Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Chain("rpc unreachable".into()));
        }
        Ok(addresses
            .iter()
            .filter_map(|a| self.states.get(a).map(|s| (a.clone(), *s)))
            .collect())
    }
}

// ─── FakeIndexer ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeIndexer {
    tokens: Vec<IndexedToken>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeIndexer {
    pub fn with_tokens(tokens: Vec<IndexedToken>) -> Self {
        Self { tokens, ..Default::default() }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IssuanceIndexer for FakeIndexer {
    async fn recent_tokens(&self, limit: usize) -> Result<Vec<IndexedToken>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Indexer("indexer unreachable".into()));
        }
        Ok(self.tokens.iter().take(limit).cloned().collect())
    }
}
