//! Merging token records from the direct and content-derived origins,
//! with a bounded self-healing backfill when the catalog looks sparse.

use std::collections::{HashMap, HashSet};

use mintpulse_core::AppError;

use crate::ports::{CatalogStore, IssuanceIndexer};
use crate::types::{CatalogToken, MarketToken, OriginFilter, TokenOrigin};

/// Below this many direct records (with no search active) the catalog is
/// assumed incomplete and a backfill pass runs.
pub const CATALOG_FLOOR: usize = 5;

/// Page size requested from the issuance indexer.
pub const INDEXER_PAGE: usize = 50;

/// Upper bound on upserts per backfill pass.
pub const MAX_BACKFILL: usize = 10;

/// Merges and deduplicates token records from both origins.
pub struct CatalogAggregator<'a> {
    catalog: &'a dyn CatalogStore,
    indexer: &'a dyn IssuanceIndexer,
}

impl<'a> CatalogAggregator<'a> {
    pub fn new(catalog: &'a dyn CatalogStore, indexer: &'a dyn IssuanceIndexer) -> Self {
        Self { catalog, indexer }
    }

    /// Merged, deduplicated token list. Dedup key is the address; a record
    /// present in both origins is classified content-derived and keeps its
    /// content linkage.
    pub async fn merged_tokens(
        &self,
        origin: OriginFilter,
        search: Option<&str>,
    ) -> Result<Vec<MarketToken>, AppError> {
        let want_direct = origin != OriginFilter::ContentDerived;
        let want_content = origin != OriginFilter::Direct;

        let mut direct: Vec<CatalogToken> = if want_direct {
            self.catalog.direct_tokens(search).await?
        } else {
            Vec::new()
        };

        // Self-healing: a sparse unfiltered catalog triggers one bounded
        // catch-up pass against the issuance indexer. Never critical.
        if want_direct && search.is_none() && direct.len() < CATALOG_FLOOR {
            if self.backfill_catalog(&direct).await {
                direct = self.catalog.direct_tokens(None).await?;
            }
        }

        let mut merged: Vec<MarketToken> = Vec::with_capacity(direct.len());
        let mut index_by_address: HashMap<String, usize> = HashMap::new();

        for token in direct {
            index_by_address.insert(token.address.clone(), merged.len());
            merged.push(MarketToken::from_catalog(token, TokenOrigin::Direct));
        }

        if want_content {
            let links = self.catalog.content_links().await?;

            // Resolve link addresses against the catalog in one read.
            let missing: Vec<String> = links
                .iter()
                .map(|l| l.token_address.clone())
                .filter(|a| !index_by_address.contains_key(a))
                .collect();
            let mut fetched: HashMap<String, CatalogToken> = HashMap::new();
            if !missing.is_empty() {
                for token in self.catalog.tokens_by_addresses(&missing).await? {
                    fetched.insert(token.address.clone(), token);
                }
            }

            for link in &links {
                if let Some(&i) = index_by_address.get(&link.token_address) {
                    merged[i] = merged[i].clone().with_content_link(link);
                } else if let Some(token) = fetched.get(&link.token_address) {
                    index_by_address.insert(token.address.clone(), merged.len());
                    merged.push(
                        MarketToken::from_catalog(token.clone(), TokenOrigin::ContentDerived)
                            .with_content_link(link),
                    );
                } else {
                    // Content item references an address the catalog has
                    // never seen; degrade to omitting the token.
                    tracing::debug!(
                        token = %link.token_address,
                        video = link.video_id,
                        "Content item references unknown token, skipping"
                    );
                }
            }
        }

        Ok(merged)
    }

    /// One bounded catch-up pass: a single indexer page, at most
    /// [`MAX_BACKFILL`] idempotent upserts for the newest unknown
    /// addresses, every failure captured. Returns whether the catalog
    /// should be re-read.
    async fn backfill_catalog(&self, existing: &[CatalogToken]) -> bool {
        let recent = match self.indexer.recent_tokens(INDEXER_PAGE).await {
            Ok(recent) => recent,
            Err(e) => {
                tracing::warn!(error = %e, "Issuance indexer unavailable, skipping catalog backfill");
                return false;
            }
        };

        let known: HashSet<&str> = existing.iter().map(|t| t.address.as_str()).collect();
        let mut synced = 0usize;

        for indexed in recent
            .iter()
            .filter(|t| !known.contains(t.address.to_lowercase().as_str()))
            .take(MAX_BACKFILL)
        {
            // Financial state is left at zero; the refresher treats those
            // sentinels as stale and pulls live numbers in this request.
            let token = CatalogToken {
                address: indexed.address.to_lowercase(),
                name: indexed.name.clone(),
                symbol: indexed.symbol.clone(),
                owner_address: indexed.owner_address.to_lowercase(),
                tvl: 0.0,
                total_supply: 0,
                created_at: indexed.created_at,
            };

            match self.catalog.upsert_token(&token).await {
                Ok(()) => synced += 1,
                Err(e) => {
                    tracing::warn!(token = %indexed.address, error = %e, "Catalog backfill upsert failed");
                }
            }
        }

        if synced > 0 {
            tracing::info!(count = synced, "Backfilled catalog from issuance indexer");
        }
        synced > 0
    }
}
