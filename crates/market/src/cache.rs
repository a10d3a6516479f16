//! Response cache-lifetime and invalidation-tag selection.

use crate::types::MarketQuery;

/// Cache directives for one response. Stateless; derived purely from the
/// query's volatility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    pub max_age_secs: u32,
    pub stale_while_revalidate_secs: u32,
    pub tags: Vec<String>,
}

impl CachePolicy {
    pub fn cache_control(&self) -> String {
        format!(
            "public, max-age={}, stale-while-revalidate={}",
            self.max_age_secs, self.stale_while_revalidate_secs
        )
    }

    pub fn tag_header(&self) -> String {
        self.tags.join(",")
    }
}

/// Searches and forced-fresh reads are volatile and get a short lifetime;
/// plain listings cache longer.
pub fn advise(query: &MarketQuery) -> CachePolicy {
    let volatile = query.search.is_some() || query.fresh;
    let (max_age_secs, stale_while_revalidate_secs) = if volatile { (10, 30) } else { (60, 300) };

    let mut tags = vec![
        "market".to_string(),
        "market:tokens".to_string(),
        format!("market:tokens:{}", query.origin.as_str()),
    ];
    if query.search.is_some() {
        tags.push("market:tokens:search".to_string());
    }

    CachePolicy {
        max_age_secs,
        stale_while_revalidate_secs,
        tags,
    }
}
