use alloy::network::Ethereum;
use alloy::providers::RootProvider;

/// The read-only RPC provider type used throughout the application.
pub type CurveProvider = RootProvider<Ethereum>;

/// Create an HTTP provider from an RPC URL string.
pub fn create_provider(rpc_url: &str) -> eyre::Result<CurveProvider> {
    let url = rpc_url.parse()?;
    Ok(RootProvider::new_http(url))
}
