//! Historical state reconstruction from the transaction ledger.
//!
//! The ledger is append-only and has no historical snapshots, so the
//! 24-hours-ago state of a token is reconstructed by undoing its recent
//! events backward from the current curve state (reverse replay), and a
//! token's price history by replaying its full ledger forward.
//!
//! Exactness is asymmetric: collateral deposited at mint time is recorded
//! in the ledger, so the mint leg is exact. Collateral returned on burn is
//! not recorded, so the burn leg values each burn at the locally
//! reconstructed price — an internally consistent approximation, not
//! ground truth. Keep it that way; "fixing" the estimate with a different
//! formula silently changes documented behaviour.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::price::{spot_price, to_decimal};
use crate::types::{EventKind, HistoryInterval, HistoryPoint, TradeEvent};

/// Derived 24-hour metrics for one token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Replay24h {
    pub price_change_24h: f64,
    pub volume_24h: f64,
    pub price_24h_ago: f64,
}

/// Strategy for valuing the unrecorded collateral leg of a burn.
///
/// Pluggable so exact accounting can replace the approximation if the
/// ledger ever records burn payouts.
pub trait BurnEstimator: Send + Sync {
    /// Estimate the collateral returned by burning `amount` tokens, given
    /// the replay price at the point of undoing.
    fn estimate(&self, amount: u128, replay_price: f64) -> f64;
}

/// Default strategy: value the burn at the replay's own evolving spot
/// price.
pub struct SpotPriceEstimator;

impl BurnEstimator for SpotPriceEstimator {
    fn estimate(&self, amount: u128, replay_price: f64) -> f64 {
        to_decimal(amount) * replay_price
    }
}

/// Group a window of events by token, preserving their newest-first order.
pub fn group_by_token(events: Vec<TradeEvent>) -> HashMap<String, Vec<TradeEvent>> {
    let mut grouped: HashMap<String, Vec<TradeEvent>> = HashMap::new();
    for event in events {
        grouped.entry(event.token_address.clone()).or_default().push(event);
    }
    grouped
}

/// Reconstruct a token's approximate 24-hours-ago state by undoing
/// `events_desc` (newest first) from the current `(tvl, supply)` and
/// derive price-change and volume metrics.
///
/// Degenerate inputs must not panic: supply arithmetic saturates, and a
/// zero supply at any point means price 0 there.
pub fn replay_window(
    current_tvl: f64,
    current_supply: u128,
    events_desc: &[TradeEvent],
    estimator: &dyn BurnEstimator,
) -> Replay24h {
    let current_price = spot_price(current_tvl, current_supply);

    let mut supply = current_supply;
    let mut tvl = current_tvl;
    let mut volume = 0.0;

    for event in events_desc {
        // Price implied by the not-yet-undone state. Used only to value
        // burns; never reuse the final current price here.
        let replay_price = spot_price(tvl, supply);

        match event.kind {
            EventKind::Mint => {
                // Exact: the deposited collateral was recorded at mint time.
                let collateral = event.collateral.unwrap_or(0.0);
                supply = supply.saturating_sub(event.amount);
                tvl -= collateral;
                volume += collateral;
            }
            EventKind::Burn => {
                // Approximate: no burn receipt in the ledger.
                let estimated = estimator.estimate(event.amount, replay_price);
                supply = supply.saturating_add(event.amount);
                tvl += estimated;
                volume += estimated;
            }
        }
    }

    let price_24h_ago = spot_price(tvl, supply);
    let price_change_24h = if price_24h_ago > 0.0 {
        (current_price - price_24h_ago) / price_24h_ago * 100.0
    } else {
        0.0
    };

    Replay24h {
        price_change_24h,
        volume_24h: volume,
        price_24h_ago,
    }
}

/// Build a bucketed price history by replaying `events_asc` (oldest first)
/// forward from an empty curve.
///
/// Each bucket holds the average replayed price and tvl and the summed
/// trade volume of its events. Burns use the same estimation strategy as
/// the reverse replay. A synthetic current point is appended when the
/// newest bucket is more than an hour old.
pub fn history_points(
    events_asc: &[TradeEvent],
    interval: HistoryInterval,
    current_price: f64,
    current_tvl: f64,
    now: DateTime<Utc>,
    estimator: &dyn BurnEstimator,
) -> Vec<HistoryPoint> {
    struct Bucket {
        prices: Vec<f64>,
        volumes: Vec<f64>,
        tvls: Vec<f64>,
    }

    let bucket_secs = interval.bucket_secs();
    let mut buckets: std::collections::BTreeMap<i64, Bucket> = std::collections::BTreeMap::new();

    let mut supply: u128 = 0;
    let mut tvl = 0.0;

    for event in events_asc {
        let volume = match event.kind {
            EventKind::Mint => {
                let collateral = event.collateral.unwrap_or(0.0);
                supply = supply.saturating_add(event.amount);
                tvl += collateral;
                collateral
            }
            EventKind::Burn => {
                let estimated = estimator.estimate(event.amount, spot_price(tvl, supply));
                supply = supply.saturating_sub(event.amount);
                tvl -= estimated;
                estimated
            }
        };

        let price = spot_price(tvl, supply);
        let key = event.created_at.timestamp().div_euclid(bucket_secs) * bucket_secs;
        let bucket = buckets.entry(key).or_insert_with(|| Bucket {
            prices: Vec::new(),
            volumes: Vec::new(),
            tvls: Vec::new(),
        });
        bucket.prices.push(price);
        bucket.volumes.push(volume);
        bucket.tvls.push(tvl);
    }

    let mut history: Vec<HistoryPoint> = buckets
        .into_iter()
        .map(|(timestamp, bucket)| {
            let n = bucket.prices.len() as f64;
            HistoryPoint {
                timestamp,
                price: bucket.prices.iter().sum::<f64>() / n,
                volume: bucket.volumes.iter().sum::<f64>(),
                tvl: bucket.tvls.iter().sum::<f64>() / n,
            }
        })
        .collect();

    let now_ts = now.timestamp();
    let stale = history.last().map_or(true, |p| p.timestamp < now_ts - 3600);
    if stale {
        history.push(HistoryPoint {
            timestamp: now_ts,
            price: current_price,
            volume: 0.0,
            tvl: current_tvl,
        });
    }

    history
}
