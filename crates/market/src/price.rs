//! Spot-price derivation from fixed-point curve balances.

/// Fixed-point amounts carry 18 fractional decimal digits.
const WEI_PER_TOKEN: f64 = 1e18;

/// Convert an 18-decimal fixed-point integer to a decimal value.
pub fn to_decimal(amount: u128) -> f64 {
    amount as f64 / WEI_PER_TOKEN
}

/// Spot price implied by a curve state: tvl divided by decimal supply,
/// or 0 for an empty curve.
pub fn spot_price(tvl: f64, supply: u128) -> f64 {
    if supply > 0 {
        tvl / to_decimal(supply)
    } else {
        0.0
    }
}

// Market cap is defined as equal to tvl throughout the pipeline. This is
// the platform's convention, not a numeric identity: price * supply can
// diverge from tvl because of curve-internal pooled/locked balances.
