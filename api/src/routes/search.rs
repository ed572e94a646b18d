use std::sync::Arc;

use askama::Template;
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use shared::SearchCoin;

use crate::state::AppState;

use super::render;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

pub struct SearchRowView {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub rank: String,
    pub thumb: String,
    pub has_thumb: bool,
}

impl SearchRowView {
    fn from_coin(coin: &SearchCoin) -> Self {
        Self {
            id: coin.id.clone(),
            name: coin.name.clone(),
            symbol: coin.symbol.to_uppercase(),
            rank: coin
                .market_cap_rank
                .map(|r| format!("#{r}"))
                .unwrap_or_else(|| "—".to_string()),
            has_thumb: coin.thumb.is_some(),
            thumb: coin.thumb.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "search.html")]
struct SearchTemplate {
    query: String,
    searched: bool,
    has_results: bool,
    results: Vec<SearchRowView>,
}

pub async fn page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params.q.unwrap_or_default().trim().to_string();

    let results = if query.is_empty() {
        Vec::new()
    } else {
        state
            .market
            .search(&query)
            .await
            .coins
            .iter()
            .map(SearchRowView::from_coin)
            .collect()
    };

    render(SearchTemplate {
        searched: !query.is_empty(),
        has_results: !results.is_empty(),
        query,
        results,
    })
}
