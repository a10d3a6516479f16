//! Filtering, sorting, pagination, profile joins and aggregate stats over
//! the merged token list.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::{
    CreatorProfile, MarketStats, MarketToken, OriginFilter, Pagination, SortField, SortOrder,
};

/// How many tokens the gainer/loser boards carry.
const LEADERBOARD_SIZE: usize = 5;

/// Case-insensitive substring match across name, symbol, owner address and
/// linked content title.
pub fn apply_search(tokens: &mut Vec<MarketToken>, search: &str) {
    let needle = search.to_lowercase();
    tokens.retain(|t| {
        t.name.to_lowercase().contains(&needle)
            || t.symbol.to_lowercase().contains(&needle)
            || t.owner_address.to_lowercase().contains(&needle)
            || t.video_title
                .as_ref()
                .is_some_and(|title| title.to_lowercase().contains(&needle))
    });
}

pub fn apply_origin_filter(tokens: &mut Vec<MarketToken>, filter: OriginFilter) {
    if filter != OriginFilter::All {
        tokens.retain(|t| filter.matches(t.origin));
    }
}

fn sort_key(token: &MarketToken, field: SortField) -> f64 {
    match field {
        SortField::Price => token.price,
        SortField::Tvl => token.tvl,
        SortField::MarketCap => token.market_cap,
        SortField::Volume24h => token.volume_24h,
        SortField::PriceChange24h => token.price_change_24h,
        SortField::CreatedAt => token.created_at.timestamp() as f64,
    }
}

/// Stable sort by the chosen field; ties keep their input order.
pub fn sort_tokens(tokens: &mut [MarketToken], field: SortField, order: SortOrder) {
    tokens.sort_by(|a, b| {
        let cmp = sort_key(a, field)
            .partial_cmp(&sort_key(b, field))
            .unwrap_or(Ordering::Equal);
        match order {
            SortOrder::Asc => cmp,
            SortOrder::Desc => cmp.reverse(),
        }
    });
}

/// Attach username/avatar from a batched profile fetch; owners without a
/// profile keep absent fields. Keys are matched case-insensitively.
pub fn attach_profiles(tokens: &mut [MarketToken], profiles: Vec<CreatorProfile>) {
    let by_owner: HashMap<String, CreatorProfile> = profiles
        .into_iter()
        .map(|p| (p.owner_address.to_lowercase(), p))
        .collect();

    for token in tokens.iter_mut() {
        if let Some(profile) = by_owner.get(&token.owner_address.to_lowercase()) {
            token.creator_username = profile.username.clone();
            token.creator_avatar_url = profile.avatar_url.clone();
        }
    }
}

/// Offset/limit slice over the filtered, sorted list.
pub fn paginate(tokens: Vec<MarketToken>, limit: usize, offset: usize) -> (Vec<MarketToken>, Pagination) {
    let total = tokens.len();
    let page = tokens.into_iter().skip(offset).take(limit).collect();
    let pagination = Pagination {
        total,
        limit,
        offset,
        has_more: offset.saturating_add(limit) < total,
    };
    (page, pagination)
}

/// Aggregate statistics over the full filtered set: totals plus the top
/// and bottom five movers by 24h price change (losers lowest first).
pub fn build_stats(tokens: &[MarketToken]) -> MarketStats {
    let mut by_change: Vec<MarketToken> = tokens.to_vec();
    by_change.sort_by(|a, b| {
        b.price_change_24h
            .partial_cmp(&a.price_change_24h)
            .unwrap_or(Ordering::Equal)
    });

    let top_gainers: Vec<MarketToken> = by_change.iter().take(LEADERBOARD_SIZE).cloned().collect();
    // Walking the descending list backwards yields the lowest change first.
    let top_losers: Vec<MarketToken> = by_change
        .iter()
        .rev()
        .take(LEADERBOARD_SIZE)
        .cloned()
        .collect();

    MarketStats {
        total_tokens: tokens.len(),
        total_tvl: tokens.iter().map(|t| t.tvl).sum(),
        volume_24h: tokens.iter().map(|t| t.volume_24h).sum(),
        top_gainers,
        top_losers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::market_token;
    use crate::types::TokenOrigin;

    const ONE: u128 = 1_000_000_000_000_000_000;

    fn named(address: &str, name: &str, symbol: &str, owner: &str) -> MarketToken {
        let mut t = market_token(address, 1.0, ONE);
        t.name = name.to_string();
        t.symbol = symbol.to_string();
        t.owner_address = owner.to_string();
        t
    }

    #[test]
    fn search_matches_linked_content_title_case_insensitively() {
        let mut with_title = named("0x1", "Session Coin", "SESS", "0xowner1");
        with_title.video_title = Some("Late Night Jazz Session".to_string());
        let unrelated = named("0x2", "Morning Run", "RUN", "0xowner2");

        let mut tokens = vec![with_title, unrelated];
        apply_search(&mut tokens, "jazz");

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].address, "0x1");
    }

    #[test]
    fn search_covers_name_symbol_and_owner() {
        let mut tokens = vec![
            named("0x1", "Alpha", "ALP", "0xaaa"),
            named("0x2", "Beta", "BET", "0xbbb"),
            named("0x3", "Gamma", "GAM", "0xccc"),
        ];
        apply_search(&mut tokens, "BeT");
        assert_eq!(tokens.len(), 1);

        let mut tokens = vec![named("0x1", "Alpha", "ALP", "0xFEED")];
        apply_search(&mut tokens, "feed");
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn origin_filter_passes_all_through() {
        let mut direct = named("0x1", "A", "A", "0xa");
        direct.origin = TokenOrigin::Direct;
        let mut content = named("0x2", "B", "B", "0xb");
        content.origin = TokenOrigin::ContentDerived;

        let mut tokens = vec![direct.clone(), content.clone()];
        apply_origin_filter(&mut tokens, OriginFilter::All);
        assert_eq!(tokens.len(), 2);

        let mut tokens = vec![direct, content];
        apply_origin_filter(&mut tokens, OriginFilter::ContentDerived);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].address, "0x2");
    }

    #[test]
    fn sort_orders_adjacent_pairs_consistently() {
        let mut tokens: Vec<MarketToken> = [3.0, 1.0, 2.0, 5.0, 4.0]
            .iter()
            .enumerate()
            .map(|(i, tvl)| market_token(&format!("0x{i}"), *tvl, ONE))
            .collect();

        sort_tokens(&mut tokens, SortField::Tvl, SortOrder::Desc);
        for pair in tokens.windows(2) {
            assert!(pair[0].tvl >= pair[1].tvl);
        }

        sort_tokens(&mut tokens, SortField::Tvl, SortOrder::Asc);
        for pair in tokens.windows(2) {
            assert!(pair[0].tvl <= pair[1].tvl);
        }
    }

    #[test]
    fn pagination_reproduces_the_full_set_exactly_once() {
        let all: Vec<MarketToken> = (0..13)
            .map(|i| market_token(&format!("0x{i}"), i as f64, ONE))
            .collect();

        for limit in [1usize, 3, 5, 13, 20] {
            let mut collected = Vec::new();
            let mut offset = 0;
            loop {
                let (page, pagination) = paginate(all.clone(), limit, offset);
                collected.extend(page.into_iter().map(|t| t.address));
                if !pagination.has_more {
                    break;
                }
                offset += limit;
            }
            let expected: Vec<String> = all.iter().map(|t| t.address.clone()).collect();
            assert_eq!(collected, expected, "limit {limit}");
        }
    }

    #[test]
    fn has_more_is_exact_at_the_boundary() {
        let all: Vec<MarketToken> = (0..10)
            .map(|i| market_token(&format!("0x{i}"), 1.0, ONE))
            .collect();

        let (_, p) = paginate(all.clone(), 5, 0);
        assert!(p.has_more);
        let (_, p) = paginate(all.clone(), 5, 5);
        assert!(!p.has_more);
        let (page, p) = paginate(all, 5, 20);
        assert!(page.is_empty());
        assert!(!p.has_more);
        assert_eq!(p.total, 10);
    }

    #[test]
    fn extreme_limit_and_offset_do_not_overflow() {
        // limit and offset arrive straight from the query string, so the
        // has_more arithmetic must survive usize::MAX inputs.
        let all: Vec<MarketToken> = (0..3)
            .map(|i| market_token(&format!("0x{i}"), 1.0, ONE))
            .collect();

        let (page, p) = paginate(all.clone(), usize::MAX, 1);
        assert_eq!(page.len(), 2);
        assert!(!p.has_more);

        let (page, p) = paginate(all, usize::MAX, usize::MAX);
        assert!(page.is_empty());
        assert!(!p.has_more);
        assert_eq!(p.total, 3);
    }

    #[test]
    fn profiles_join_case_insensitively_and_tolerate_absence() {
        let mut tokens = vec![
            named("0x1", "A", "A", "0xAbCd"),
            named("0x2", "B", "B", "0xeeee"),
        ];
        let profiles = vec![CreatorProfile {
            owner_address: "0xABCD".to_string(),
            username: Some("alice".to_string()),
            avatar_url: Some("https://cdn/avatar.png".to_string()),
        }];

        attach_profiles(&mut tokens, profiles);

        assert_eq!(tokens[0].creator_username.as_deref(), Some("alice"));
        assert!(tokens[1].creator_username.is_none());
    }

    #[test]
    fn leaderboards_are_bounded_and_ordered() {
        let tokens: Vec<MarketToken> = (0..8)
            .map(|i| {
                let mut t = market_token(&format!("0x{i}"), 10.0, ONE);
                t.price_change_24h = i as f64 - 4.0; // -4 .. 3
                t.volume_24h = 2.0;
                t
            })
            .collect();

        let stats = build_stats(&tokens);

        assert_eq!(stats.total_tokens, 8);
        assert_eq!(stats.total_tvl, 80.0);
        assert_eq!(stats.volume_24h, 16.0);

        assert_eq!(stats.top_gainers.len(), 5);
        for pair in stats.top_gainers.windows(2) {
            assert!(pair[0].price_change_24h >= pair[1].price_change_24h);
        }
        assert_eq!(stats.top_gainers[0].price_change_24h, 3.0);

        assert_eq!(stats.top_losers.len(), 5);
        assert_eq!(stats.top_losers[0].price_change_24h, -4.0);
        for pair in stats.top_losers.windows(2) {
            assert!(pair[0].price_change_24h <= pair[1].price_change_24h);
        }
    }
}
