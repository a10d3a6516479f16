pub mod abi;
pub mod curve;
pub mod indexer;
pub mod provider;

pub use abi::CurveViewer;
pub use curve::CurveClient;
pub use indexer::SubgraphClient;
pub use provider::{CurveProvider, create_provider};
