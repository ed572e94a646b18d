use std::sync::Arc;

use askama::Template;
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use tracing::error;

use shared::{news, CoinMarket, NewsArticle, TrendingCoin};

use crate::state::AppState;
use crate::views::{fmt_pct, fmt_usd, CoinRowView, OverviewView};

use super::{error_page, render};

#[derive(Deserialize)]
pub struct DashboardParams {
    pub tab: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub amount: Option<f64>,
}

pub struct TrendingCardView {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub has_image: bool,
    pub rank: String,
    pub price_btc: String,
}

impl TrendingCardView {
    fn from_coin(coin: &TrendingCoin) -> Self {
        Self {
            id: coin.id.clone(),
            name: coin.name.clone(),
            symbol: coin.symbol.clone(),
            has_image: coin.small.is_some(),
            image: coin.small.clone().unwrap_or_default(),
            rank: coin
                .market_cap_rank
                .map(|r| format!("#{r}"))
                .unwrap_or_else(|| "—".to_string()),
            price_btc: coin
                .price_btc
                .map(|p| format!("{p:.8}"))
                .unwrap_or_else(|| "—".to_string()),
        }
    }
}

pub struct WatchRowView {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub has_image: bool,
    pub price: String,
    pub change: String,
    pub change_up: bool,
    pub has_change: bool,
}

impl WatchRowView {
    fn from_market(coin: &CoinMarket) -> Self {
        let change = coin.price_change_percentage_24h;
        Self {
            id: coin.id.clone(),
            name: coin.name.clone(),
            symbol: coin.symbol.to_uppercase(),
            has_image: coin.image.is_some(),
            image: coin.image.clone().unwrap_or_default(),
            price: coin.current_price.map(fmt_usd).unwrap_or_else(|| "—".to_string()),
            change: change.map(fmt_pct).unwrap_or_default(),
            change_up: change.unwrap_or(0.0) > 0.0,
            has_change: change.is_some(),
        }
    }
}

pub struct NewsCardView {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image: String,
    pub date: String,
}

impl NewsCardView {
    fn from_article(article: &NewsArticle) -> Self {
        Self {
            title: article.title.clone(),
            description: article.description.clone(),
            url: article.url.clone(),
            image: article.image.clone(),
            date: article.published_at.format("%d %b %Y").to_string(),
        }
    }
}

pub struct ConverterOption {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

pub struct ConverterView {
    pub from_options: Vec<ConverterOption>,
    pub to_options: Vec<ConverterOption>,
    pub amount: f64,
    pub result: String,
    pub has_result: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    overview: OverviewView,
    tab_table: bool,
    tab_trending: bool,
    coins: Vec<CoinRowView>,
    trending: Vec<TrendingCardView>,
    watchlist: Vec<WatchRowView>,
    watchlist_empty: bool,
    converter: ConverterView,
    news: Vec<NewsCardView>,
}

pub async fn page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Response {
    let global = match state.market.global().await {
        Ok(global) => global,
        Err(err) => {
            error!("global stats fetch failed: {err}");
            return error_page("Failed to load market data. Please try again in a minute.");
        }
    };
    let trending = match state.market.trending().await {
        Ok(trending) => trending,
        Err(err) => {
            error!("trending fetch failed: {err}");
            return error_page("Failed to load market data. Please try again in a minute.");
        }
    };
    let coins = match state.market.coins(1, 50).await {
        Ok(coins) => coins,
        Err(err) => {
            error!("coin listing fetch failed: {err}");
            return error_page("Failed to load market data. Please try again in a minute.");
        }
    };

    let watchlist_ids: Vec<String> = {
        let store = state.watchlist.lock().unwrap_or_else(|e| e.into_inner());
        store.coins().to_vec()
    };

    let top_rows = coins
        .iter()
        .take(10)
        .map(|coin| CoinRowView::from_market(coin, watchlist_ids.contains(&coin.id)))
        .collect();

    let watch_rows: Vec<WatchRowView> = coins
        .iter()
        .filter(|coin| watchlist_ids.contains(&coin.id))
        .map(WatchRowView::from_market)
        .collect();

    let trending_cards = trending
        .coins
        .iter()
        .map(|entry| TrendingCardView::from_coin(&entry.item))
        .collect();

    let news_cards = news::latest().iter().map(NewsCardView::from_article).collect();

    let tab_trending = params.tab.as_deref() == Some("trending");

    render(IndexTemplate {
        overview: OverviewView::from_stats(&global.data),
        tab_table: !tab_trending,
        tab_trending,
        coins: top_rows,
        trending: trending_cards,
        watchlist_empty: watch_rows.is_empty(),
        watchlist: watch_rows,
        converter: build_converter(&coins, &params),
        news: news_cards,
    })
}

/// Converts via the two coins' USD prices from the top-coin listing.
fn build_converter(coins: &[CoinMarket], params: &DashboardParams) -> ConverterView {
    let candidates: Vec<&CoinMarket> = coins.iter().take(10).collect();

    let amount = params.amount.unwrap_or(1.0);
    let from_id = params
        .from
        .clone()
        .or_else(|| candidates.first().map(|c| c.id.clone()))
        .unwrap_or_default();
    let to_id = params
        .to
        .clone()
        .or_else(|| candidates.get(1).map(|c| c.id.clone()))
        .unwrap_or_default();

    let lookup = |id: &str| candidates.iter().find(|c| c.id == id);
    let result = match (lookup(&from_id), lookup(&to_id)) {
        (Some(from), Some(to)) => match (from.current_price, to.current_price) {
            (Some(fp), Some(tp)) if tp > 0.0 && amount >= 0.0 => Some(format!(
                "{amount} {} ≈ {:.6} {}",
                from.symbol.to_uppercase(),
                amount * fp / tp,
                to.symbol.to_uppercase()
            )),
            _ => None,
        },
        _ => None,
    };

    let options = |selected_id: &str| {
        candidates
            .iter()
            .map(|coin| ConverterOption {
                id: coin.id.clone(),
                label: format!("{} ({})", coin.name, coin.symbol.to_uppercase()),
                selected: coin.id == selected_id,
            })
            .collect()
    };

    ConverterView {
        from_options: options(&from_id),
        to_options: options(&to_id),
        amount,
        has_result: result.is_some(),
        result: result.unwrap_or_default(),
    }
}
