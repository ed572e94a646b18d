use std::sync::Arc;

use askama::Template;
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use tracing::error;

use shared::{Category, CoinMarket};

use crate::state::AppState;
use crate::views::{encode_query, fmt_compact_usd, fmt_pct, CoinRowView, OverviewView};

use super::{error_page, render};

const DEFI_CATEGORY: &str = "decentralized-finance-defi";
const NFT_CATEGORY: &str = "non-fungible-tokens-nft";

#[derive(Deserialize)]
pub struct MarketParams {
    pub tab: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub change: Option<String>,
    pub cap: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SortKey {
    Rank,
    Name,
    Price,
    Change,
    MarketCap,
    Volume,
}

impl SortKey {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("name") => SortKey::Name,
            Some("price") => SortKey::Price,
            Some("change") => SortKey::Change,
            Some("market_cap") => SortKey::MarketCap,
            Some("volume") => SortKey::Volume,
            _ => SortKey::Rank,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            SortKey::Rank => "rank",
            SortKey::Name => "name",
            SortKey::Price => "price",
            SortKey::Change => "change",
            SortKey::MarketCap => "market_cap",
            SortKey::Volume => "volume",
        }
    }
}

pub struct CategoryRowView {
    pub name: String,
    pub market_cap: String,
    pub change: String,
    pub change_up: bool,
    pub has_change: bool,
    pub volume: String,
}

impl CategoryRowView {
    fn from_category(category: &Category) -> Self {
        let change = category.market_cap_change_24h;
        Self {
            name: category.name.clone(),
            market_cap: category
                .market_cap
                .map(fmt_compact_usd)
                .unwrap_or_else(|| "—".to_string()),
            change: change.map(fmt_pct).unwrap_or_default(),
            change_up: change.unwrap_or(0.0) > 0.0,
            has_change: change.is_some(),
            volume: category
                .volume_24h
                .map(fmt_compact_usd)
                .unwrap_or_else(|| "—".to_string()),
        }
    }
}

pub struct SortHeader {
    pub label: String,
    pub href: String,
    pub active: bool,
    pub descending: bool,
}

#[derive(Template)]
#[template(path = "market.html")]
struct MarketTemplate {
    overview: OverviewView,
    tab: String,
    all_href: String,
    categories_href: String,
    defi_href: String,
    nft_href: String,
    coins: Vec<CoinRowView>,
    no_matches: bool,
    categories: Vec<CategoryRowView>,
    q: String,
    change: String,
    cap: String,
    sort_headers: Vec<SortHeader>,
    page: u32,
    has_prev: bool,
    prev_href: String,
    has_next: bool,
    next_href: String,
}

pub async fn page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MarketParams>,
) -> Response {
    let tab = match params.tab.as_deref() {
        Some("categories") => "categories",
        Some("defi") => "defi",
        Some("nft") => "nft",
        _ => "all",
    };
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(50).clamp(1, 250);

    let global = match state.market.global().await {
        Ok(global) => global,
        Err(err) => {
            error!("global stats fetch failed: {err}");
            return error_page("Failed to load market data. Please try again in a minute.");
        }
    };

    let mut category_rows = Vec::new();
    let mut coins = Vec::new();
    match tab {
        "categories" => {
            category_rows = state
                .market
                .categories()
                .await
                .iter()
                .map(CategoryRowView::from_category)
                .collect();
        }
        "defi" | "nft" => {
            let category = if tab == "defi" { DEFI_CATEGORY } else { NFT_CATEGORY };
            coins = match state.market.coins_by_category(category, page, per_page).await {
                Ok(coins) => coins,
                Err(err) => {
                    error!("category listing fetch failed: {err}");
                    return error_page("Failed to load market data. Please try again in a minute.");
                }
            };
        }
        _ => {
            coins = match state.market.coins(page, per_page).await {
                Ok(coins) => coins,
                Err(err) => {
                    error!("coin listing fetch failed: {err}");
                    return error_page("Failed to load market data. Please try again in a minute.");
                }
            };
        }
    }

    let q = params.q.clone().unwrap_or_default();
    let change = params.change.clone().unwrap_or_else(|| "all".to_string());
    let cap = params.cap.clone().unwrap_or_else(|| "all".to_string());
    let sort = SortKey::parse(params.sort.as_deref());
    let descending = params.dir.as_deref() == Some("desc");

    let full_page = coins.len() == per_page as usize;
    let mut coins = filter_coins(coins, &q, &change, &cap);
    sort_coins(&mut coins, sort, descending);

    let watchlist_ids: Vec<String> = {
        let store = state.watchlist.lock().unwrap_or_else(|e| e.into_inner());
        store.coins().to_vec()
    };
    let rows: Vec<CoinRowView> = coins
        .iter()
        .map(|coin| CoinRowView::from_market(coin, watchlist_ids.contains(&coin.id)))
        .collect();
    let no_matches = tab != "categories" && rows.is_empty();

    let href = |tab: &str, page: u32, sort_key: SortKey, desc: bool| {
        format!(
            "/market?tab={tab}&page={page}&per_page={per_page}&q={}&change={change}&cap={cap}&sort={}&dir={}",
            encode_query(&q),
            sort_key.as_str(),
            if desc { "desc" } else { "asc" },
        )
    };

    let sort_headers: Vec<SortHeader> = [
        ("#", SortKey::Rank),
        ("Name", SortKey::Name),
        ("Price", SortKey::Price),
        ("24h %", SortKey::Change),
        ("Market Cap", SortKey::MarketCap),
        ("Volume (24h)", SortKey::Volume),
    ]
    .into_iter()
    .map(|(label, key)| {
        // clicking the active column flips direction
        let next_desc = key == sort && !descending;
        SortHeader {
            label: label.to_string(),
            href: href(tab, page, key, next_desc),
            active: key == sort,
            descending,
        }
    })
    .collect();

    let all_href = href("all", 1, sort, descending);
    let categories_href = href("categories", 1, sort, descending);
    let defi_href = href("defi", 1, sort, descending);
    let nft_href = href("nft", 1, sort, descending);
    let prev_href = href(tab, page.saturating_sub(1).max(1), sort, descending);
    let next_href = href(tab, page + 1, sort, descending);

    render(MarketTemplate {
        overview: OverviewView::from_stats(&global.data),
        tab: tab.to_string(),
        all_href,
        categories_href,
        defi_href,
        nft_href,
        coins: rows,
        no_matches,
        categories: category_rows,
        q,
        change,
        cap,
        sort_headers,
        page,
        has_prev: page > 1,
        prev_href,
        has_next: full_page,
        next_href,
    })
}

/// Text, 24h-direction and market-cap-tier filters over one fetched page.
fn filter_coins(coins: Vec<CoinMarket>, query: &str, change: &str, cap: &str) -> Vec<CoinMarket> {
    let query = query.trim().to_lowercase();

    coins
        .into_iter()
        .filter(|coin| {
            query.is_empty()
                || coin.name.to_lowercase().contains(&query)
                || coin.symbol.to_lowercase().contains(&query)
        })
        .filter(|coin| match change {
            "positive" => coin.price_change_percentage_24h.unwrap_or(0.0) > 0.0,
            "negative" => coin.price_change_percentage_24h.unwrap_or(0.0) < 0.0,
            _ => true,
        })
        .filter(|coin| {
            let market_cap = coin.market_cap.unwrap_or(0.0);
            match cap {
                "large" => market_cap > 10_000_000_000.0,
                "medium" => market_cap > 1_000_000_000.0 && market_cap <= 10_000_000_000.0,
                "small" => market_cap <= 1_000_000_000.0,
                _ => true,
            }
        })
        .collect()
}

fn sort_coins(coins: &mut Vec<CoinMarket>, key: SortKey, descending: bool) {
    match key {
        SortKey::Name => {
            coins.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        }
        _ => {
            coins.sort_by(|a, b| {
                numeric_key(a, key)
                    .partial_cmp(&numeric_key(b, key))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }
    if descending {
        coins.reverse();
    }
}

fn numeric_key(coin: &CoinMarket, key: SortKey) -> f64 {
    match key {
        // missing rank sorts last in the default ascending view
        SortKey::Rank => coin.market_cap_rank.map(|r| r as f64).unwrap_or(f64::MAX),
        SortKey::Price => coin.current_price.unwrap_or(0.0),
        SortKey::Change => coin.price_change_percentage_24h.unwrap_or(0.0),
        SortKey::MarketCap => coin.market_cap.unwrap_or(0.0),
        SortKey::Volume => coin.total_volume.unwrap_or(0.0),
        SortKey::Name => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(id: &str, name: &str, price: f64, change: f64, cap: f64) -> CoinMarket {
        CoinMarket {
            id: id.to_string(),
            symbol: id[..3.min(id.len())].to_string(),
            name: name.to_string(),
            image: None,
            current_price: Some(price),
            market_cap: Some(cap),
            market_cap_rank: None,
            total_volume: Some(cap / 20.0),
            price_change_percentage_24h: Some(change),
            circulating_supply: None,
        }
    }

    fn sample() -> Vec<CoinMarket> {
        vec![
            coin("bitcoin", "Bitcoin", 67000.0, 1.2, 1.3e12),
            coin("ethereum", "Ethereum", 3500.0, -0.8, 4.2e11),
            coin("dogwifhat", "dogwifhat", 2.8, 14.0, 2.8e9),
            coin("pepe", "Pepe", 0.00001, -3.0, 5.0e9),
            coin("tinycoin", "Tiny Coin", 0.5, 0.0, 9.0e8),
        ]
    }

    #[test]
    fn text_filter_matches_name_and_symbol() {
        let filtered = filter_coins(sample(), "bit", "all", "all");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "bitcoin");

        let by_symbol = filter_coins(sample(), "ETH", "all", "all");
        assert_eq!(by_symbol.len(), 1);
        assert_eq!(by_symbol[0].id, "ethereum");
    }

    #[test]
    fn change_filter_splits_direction() {
        let positive = filter_coins(sample(), "", "positive", "all");
        assert!(positive
            .iter()
            .all(|c| c.price_change_percentage_24h.unwrap() > 0.0));
        assert_eq!(positive.len(), 2);

        let negative = filter_coins(sample(), "", "negative", "all");
        assert_eq!(negative.len(), 2);
    }

    #[test]
    fn cap_filter_tiers() {
        assert_eq!(filter_coins(sample(), "", "all", "large").len(), 2);
        assert_eq!(filter_coins(sample(), "", "all", "medium").len(), 2);
        assert_eq!(filter_coins(sample(), "", "all", "small").len(), 1);
    }

    #[test]
    fn sort_by_price_descending() {
        let mut coins = sample();
        sort_coins(&mut coins, SortKey::Price, true);
        assert_eq!(coins[0].id, "bitcoin");
        assert_eq!(coins.last().unwrap().id, "pepe");
    }

    #[test]
    fn sort_by_name_is_case_insensitive() {
        let mut coins = sample();
        sort_coins(&mut coins, SortKey::Name, false);
        let names: Vec<_> = coins.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Bitcoin", "dogwifhat", "Ethereum", "Pepe", "Tiny Coin"]);
    }

    #[test]
    fn missing_rank_sorts_last() {
        let mut coins = sample();
        coins[0].market_cap_rank = Some(1);
        coins[1].market_cap_rank = Some(2);
        sort_coins(&mut coins, SortKey::Rank, false);
        assert_eq!(coins[0].id, "bitcoin");
        assert_eq!(coins[1].id, "ethereum");
        assert!(coins[2..].iter().all(|c| c.market_cap_rank.is_none()));
    }
}
