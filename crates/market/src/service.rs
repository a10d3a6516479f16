//! Request-scoped orchestration of the market pipeline:
//! aggregate → refresh → replay → assemble.

use std::sync::Arc;

use chrono::{Duration, Utc};
use mintpulse_core::AppError;

use crate::aggregate::CatalogAggregator;
use crate::assemble;
use crate::ports::{CatalogStore, CurveReader, IssuanceIndexer, LedgerStore, ProfileStore};
use crate::price::spot_price;
use crate::refresh::FreshnessRefresher;
use crate::replay::{self, BurnEstimator, SpotPriceEstimator};
use crate::types::{
    HistoryInterval, HistoryPeriod, HistoryTokenInfo, MarketPage, MarketQuery, TokenHistory,
};

/// The market-data service. All collaborators are injected; per-request
/// state lives on the stack, so one instance serves concurrent requests.
pub struct MarketService {
    catalog: Arc<dyn CatalogStore>,
    ledger: Arc<dyn LedgerStore>,
    profiles: Arc<dyn ProfileStore>,
    curve: Arc<dyn CurveReader>,
    indexer: Arc<dyn IssuanceIndexer>,
    estimator: Arc<dyn BurnEstimator>,
}

impl MarketService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        ledger: Arc<dyn LedgerStore>,
        profiles: Arc<dyn ProfileStore>,
        curve: Arc<dyn CurveReader>,
        indexer: Arc<dyn IssuanceIndexer>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            profiles,
            curve,
            indexer,
            estimator: Arc::new(SpotPriceEstimator),
        }
    }

    /// Swap the burn-collateral estimation strategy.
    pub fn with_estimator(mut self, estimator: Arc<dyn BurnEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// The listing endpoint's whole flow.
    pub async fn market_tokens(&self, query: &MarketQuery) -> Result<MarketPage, AppError> {
        let aggregator = CatalogAggregator::new(&*self.catalog, &*self.indexer);
        let mut tokens = aggregator
            .merged_tokens(query.origin, query.search.as_deref())
            .await?;
        tracing::debug!(count = tokens.len(), "Merged token records");

        FreshnessRefresher::new(&*self.curve)
            .refresh(&mut tokens, query.fresh)
            .await;

        // 24h metrics from one windowed ledger read, replayed per token.
        let since = Utc::now() - Duration::hours(24);
        let events = self.ledger.events_since(since, None).await?;
        let by_token = replay::group_by_token(events);
        for token in &mut tokens {
            if let Some(events_desc) = by_token.get(&token.address) {
                let derived = replay::replay_window(
                    token.tvl,
                    token.total_supply,
                    events_desc,
                    &*self.estimator,
                );
                token.price_change_24h = derived.price_change_24h;
                token.volume_24h = derived.volume_24h;
            }
        }

        if let Some(search) = query.search.as_deref() {
            assemble::apply_search(&mut tokens, search);
        }
        assemble::apply_origin_filter(&mut tokens, query.origin);
        assemble::sort_tokens(&mut tokens, query.sort_by, query.sort_order);

        let mut owners: Vec<String> = tokens
            .iter()
            .map(|t| t.owner_address.to_lowercase())
            .collect();
        owners.sort();
        owners.dedup();
        if !owners.is_empty() {
            let profiles = self.profiles.profiles_for(&owners).await?;
            assemble::attach_profiles(&mut tokens, profiles);
        }

        let stats = query.include_stats.then(|| assemble::build_stats(&tokens));
        let (data, pagination) = assemble::paginate(tokens, query.limit, query.offset);

        Ok(MarketPage { data, pagination, stats })
    }

    /// Bucketed price history for one token; `None` for unknown addresses.
    pub async fn token_history(
        &self,
        address: &str,
        period: HistoryPeriod,
        interval: HistoryInterval,
    ) -> Result<Option<TokenHistory>, AppError> {
        let address = address.to_lowercase();
        let Some(token) = self.catalog.token_by_address(&address).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        let mut events = self.ledger.events_since(period.start(now), Some(&address)).await?;
        events.reverse(); // ledger reads newest-first, replay wants oldest-first

        let current_price = spot_price(token.tvl, token.total_supply);
        let data = replay::history_points(
            &events,
            interval,
            current_price,
            token.tvl,
            now,
            &*self.estimator,
        );

        Ok(Some(TokenHistory {
            data,
            token: HistoryTokenInfo {
                address: token.address,
                current_price,
                current_tvl: token.tvl,
            },
        }))
    }
}
