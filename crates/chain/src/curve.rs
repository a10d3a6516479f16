//! Live curve-state reads against the viewer contract.

use std::collections::HashMap;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use mintpulse_core::AppError;
use mintpulse_market::ports::CurveReader;
use mintpulse_market::price::to_decimal;
use mintpulse_market::types::CurveState;
use tracing::warn;

use crate::abi::CurveViewer;
use crate::provider::CurveProvider;

/// Clamp a uint256 fixed-point amount into u128. Amounts past u128 are
/// far beyond any real curve; clamping beats aborting the whole batch.
fn u256_to_u128(value: U256) -> u128 {
    if value > U256::from(u128::MAX) {
        u128::MAX
    } else {
        value.to::<u128>()
    }
}

fn u256_to_f64(value: U256) -> f64 {
    to_decimal(u256_to_u128(value))
}

pub struct CurveClient {
    viewer: Address,
    provider: CurveProvider,
}

impl CurveClient {
    pub fn new(viewer: Address, provider: CurveProvider) -> Self {
        Self { viewer, provider }
    }
}

#[async_trait]
impl CurveReader for CurveClient {
    /// One batched viewer call for the whole address set. Addresses the
    /// viewer reports as all-zero are left out of the result; addresses
    /// that fail to parse are skipped up front.
    async fn curve_states(
        &self,
        addresses: &[String],
    ) -> Result<HashMap<String, CurveState>, AppError> {
        if addresses.is_empty() {
            return Ok(HashMap::new());
        }

        let mut requested: Vec<(String, Address)> = Vec::with_capacity(addresses.len());
        for raw in addresses {
            match raw.parse::<Address>() {
                Ok(parsed) => requested.push((raw.clone(), parsed)),
                Err(_) => warn!(address = raw.as_str(), "unparseable token address, skipping"),
            }
        }
        if requested.is_empty() {
            return Ok(HashMap::new());
        }

        let viewer = CurveViewer::new(self.viewer, self.provider.clone());
        let batch: Vec<Address> = requested.iter().map(|(_, a)| *a).collect();
        let states = viewer
            .curveStates(batch)
            .call()
            .await
            .map_err(|e| AppError::Chain(e.to_string()))?;

        let mut out = HashMap::with_capacity(requested.len());
        for (i, (raw, _)) in requested.iter().enumerate() {
            // A well-behaved viewer returns arrays of the input length;
            // treat anything shorter as absence rather than panicking.
            let (Some(&tvl), Some(&total_supply), Some(&price)) = (
                states.tvls.get(i),
                states.totalSupplies.get(i),
                states.spotPrices.get(i),
            ) else {
                warn!(address = raw.as_str(), "viewer returned short arrays");
                continue;
            };
            if tvl.is_zero() && total_supply.is_zero() && price.is_zero() {
                continue;
            }
            out.insert(
                raw.clone(),
                CurveState {
                    tvl: u256_to_f64(tvl),
                    total_supply: u256_to_u128(total_supply),
                    price: u256_to_f64(price),
                },
            );
        }
        Ok(out)
    }
}
