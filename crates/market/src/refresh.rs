//! Live refresh of stale catalog records against the bonding curve.

use crate::ports::CurveReader;
use crate::price::spot_price;
use crate::types::MarketToken;

/// A record needs a live read when freshness was forced or when its
/// financial state still carries the never-populated sentinels.
pub fn needs_refresh(token: &MarketToken, force_fresh: bool) -> bool {
    force_fresh || token.total_supply == 0 || token.tvl == 0.0
}

/// Refreshes stale records via one batched curve read, with per-address
/// fallback to catalog values.
pub struct FreshnessRefresher<'a> {
    curve: &'a dyn CurveReader,
}

impl<'a> FreshnessRefresher<'a> {
    pub fn new(curve: &'a dyn CurveReader) -> Self {
        Self { curve }
    }

    /// Update tvl/supply/price/market-cap in place for records needing a
    /// refresh; compute the spot price for everything else. Chain failures
    /// never propagate: a token the batch could not cover keeps its
    /// catalog values.
    pub async fn refresh(&self, tokens: &mut [MarketToken], force_fresh: bool) {
        let stale: Vec<String> = tokens
            .iter()
            .filter(|t| needs_refresh(t, force_fresh))
            .map(|t| t.address.clone())
            .collect();

        let states = if stale.is_empty() {
            Default::default()
        } else {
            match self.curve.curve_states(&stale).await {
                Ok(states) => states,
                Err(e) => {
                    tracing::warn!(
                        count = stale.len(),
                        error = %e,
                        "Batched curve read failed, serving catalog values"
                    );
                    Default::default()
                }
            }
        };

        for token in tokens.iter_mut() {
            if needs_refresh(token, force_fresh) {
                if let Some(state) = states.get(&token.address) {
                    token.tvl = state.tvl;
                    token.total_supply = state.total_supply;
                    token.price = state.price;
                    token.market_cap = state.tvl;
                    continue;
                }
                tracing::warn!(token = %token.address, "No curve state for token, keeping stale data");
            }
            token.price = spot_price(token.tvl, token.total_supply);
            token.market_cap = token.tvl;
        }
    }
}
