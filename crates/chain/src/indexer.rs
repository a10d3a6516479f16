//! Issuance-indexer (subgraph) client, used only to backfill the catalog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mintpulse_core::AppError;
use mintpulse_market::ports::IssuanceIndexer;
use mintpulse_market::types::IndexedToken;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

const RECENT_TOKENS_QUERY: &str = r#"
query RecentTokens($first: Int!) {
  tokens(first: $first, orderBy: createdAt, orderDirection: desc) {
    id
    name
    symbol
    owner
    createdAt
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<TokensData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct TokensData {
    tokens: Vec<SubgraphToken>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubgraphToken {
    id: String,
    name: String,
    symbol: String,
    owner: String,
    /// Unix seconds, serialized as a string by the subgraph.
    created_at: String,
}

impl SubgraphToken {
    fn into_indexed(self) -> Option<IndexedToken> {
        let secs = match self.created_at.parse::<i64>() {
            Ok(v) => v,
            Err(_) => {
                warn!(address = self.id.as_str(), raw = self.created_at.as_str(),
                      "unparseable createdAt from indexer, skipping");
                return None;
            }
        };
        let created_at = DateTime::<Utc>::from_timestamp(secs, 0)?;
        Some(IndexedToken {
            address: self.id.to_lowercase(),
            name: self.name,
            symbol: self.symbol,
            owner_address: self.owner.to_lowercase(),
            created_at,
        })
    }
}

pub struct SubgraphClient {
    http: reqwest::Client,
    url: String,
}

impl SubgraphClient {
    pub fn new(url: String) -> Self {
        Self { http: reqwest::Client::new(), url }
    }
}

#[async_trait]
impl IssuanceIndexer for SubgraphClient {
    async fn recent_tokens(&self, limit: usize) -> Result<Vec<IndexedToken>, AppError> {
        let body = json!({
            "query": RECENT_TOKENS_QUERY,
            "variables": { "first": limit },
        });

        let response: GraphQlResponse = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Indexer(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Indexer(e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::Indexer(e.to_string()))?;

        if let Some(errors) = response.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(AppError::Indexer(messages.join("; ")));
        }

        let data = response
            .data
            .ok_or_else(|| AppError::Indexer("empty indexer response".to_string()))?;

        Ok(data
            .tokens
            .into_iter()
            .filter_map(SubgraphToken::into_indexed)
            .collect())
    }
}
