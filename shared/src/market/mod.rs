//! Cached client for the CoinGecko market-data API.
//!
//! Listing endpoints surface typed errors to the page layer; chart
//! endpoints never fail — on any upstream problem they degrade to the
//! synthetic series in [`synthetic`] and log a warning.

mod cache;
mod synthetic;

pub use synthetic::{fallback_categories, mock_ohlc_series, mock_price_series};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::MarketError;
use crate::models::{
    Category, CoinDetail, CoinMarket, GlobalData, MarketChart, OhlcBar, OhlcSeries, PricePoint,
    SearchResponse, TrendingResponse,
};
use cache::ResponseCache;

/// Wire shape of `/coins/{id}/market_chart`; only the price rows are used.
#[derive(Deserialize)]
struct RawMarketChart {
    #[serde(default)]
    prices: Vec<(f64, f64)>,
}

pub struct MarketClient {
    http: reqwest::Client,
    base_url: String,
    cache: ResponseCache,
    cache_ttl: Duration,
    categories_ttl: Duration,
}

impl MarketClient {
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            cache: ResponseCache::new(),
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
            categories_ttl: Duration::from_secs(config.categories_ttl_secs),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path_and_query: &str,
        ttl: Duration,
    ) -> Result<T, MarketError> {
        let url = format!("{}{}", self.base_url, path_and_query);

        if let Some(hit) = self.cache.get(&url).await {
            return serde_json::from_value(hit).map_err(|source| MarketError::Decode {
                endpoint: url,
                source,
            });
        }

        let request_id = Uuid::new_v4();
        debug!(%request_id, %url, "fetching market data");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if status.as_u16() == 429 {
            return Err(MarketError::RateLimited { endpoint: url });
        }
        if !status.is_success() {
            return Err(MarketError::Status {
                endpoint: url,
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().await?;
        self.cache.put(&url, payload.clone(), ttl).await;
        serde_json::from_value(payload).map_err(|source| MarketError::Decode {
            endpoint: url,
            source,
        })
    }

    /// Coin listing ordered by market cap, one page at a time.
    pub async fn coins(&self, page: u32, per_page: u32) -> Result<Vec<CoinMarket>, MarketError> {
        let path = format!(
            "/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={per_page}&page={page}&sparkline=false&locale=en"
        );
        self.get_json(&path, self.cache_ttl).await
    }

    /// Coin listing restricted to one upstream category id.
    pub async fn coins_by_category(
        &self,
        category: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CoinMarket>, MarketError> {
        let path = format!(
            "/coins/markets?vs_currency=usd&category={category}&order=market_cap_desc&per_page={per_page}&page={page}&sparkline=false&locale=en"
        );
        self.get_json(&path, self.cache_ttl).await
    }

    pub async fn global(&self) -> Result<GlobalData, MarketError> {
        self.get_json("/global", self.cache_ttl).await
    }

    pub async fn trending(&self) -> Result<TrendingResponse, MarketError> {
        self.get_json("/search/trending", self.cache_ttl).await
    }

    pub async fn coin_detail(&self, id: &str) -> Result<CoinDetail, MarketError> {
        let path = format!(
            "/coins/{id}?localization=true&tickers=false&market_data=true&community_data=false&developer_data=false&sparkline=false"
        );
        self.get_json(&path, self.cache_ttl).await
    }

    /// Price history for one coin. Never fails: any upstream problem is
    /// logged and replaced by a labeled synthetic series with the same
    /// shape contract.
    pub async fn market_chart(&self, id: &str, days: u32) -> MarketChart {
        let path = format!("/coins/{id}/market_chart?vs_currency=usd&days={days}");
        match self.get_json::<RawMarketChart>(&path, self.cache_ttl).await {
            Ok(raw) if !raw.prices.is_empty() => MarketChart {
                points: raw
                    .prices
                    .into_iter()
                    .map(|(ts, price)| PricePoint {
                        timestamp: ts as i64,
                        price,
                    })
                    .collect(),
                is_real_data: true,
            },
            Ok(_) => {
                warn!("empty market chart payload for {id}, serving synthetic series");
                mock_price_series(days)
            }
            Err(err) => {
                warn!("market chart fetch failed for {id}: {err}, serving synthetic series");
                mock_price_series(days)
            }
        }
    }

    /// OHLC candles for one coin. Same degradation contract as
    /// [`MarketClient::market_chart`].
    pub async fn ohlc(&self, id: &str, days: u32) -> OhlcSeries {
        let path = format!("/coins/{id}/ohlc?vs_currency=usd&days={days}");
        match self
            .get_json::<Vec<(f64, f64, f64, f64, f64)>>(&path, self.cache_ttl)
            .await
        {
            Ok(rows) if !rows.is_empty() => OhlcSeries {
                bars: rows
                    .into_iter()
                    .map(|(ts, open, high, low, close)| OhlcBar {
                        timestamp: ts as i64,
                        open,
                        high,
                        low,
                        close,
                    })
                    .collect(),
                is_real_data: true,
            },
            Ok(_) => {
                warn!("empty OHLC payload for {id}, serving synthetic series");
                mock_ohlc_series(days)
            }
            Err(err) => {
                warn!("OHLC fetch failed for {id}: {err}, serving synthetic series");
                mock_ohlc_series(days)
            }
        }
    }

    /// Coin search; degrades to an empty result set on any failure.
    pub async fn search(&self, query: &str) -> SearchResponse {
        let path = format!("/search?query={}", query.trim());
        match self.get_json::<SearchResponse>(&path, self.cache_ttl).await {
            Ok(results) => results,
            Err(err) => {
                warn!("search failed for {query:?}: {err}");
                SearchResponse { coins: Vec::new() }
            }
        }
    }

    /// Category listing, cached for an hour; an error or empty payload
    /// falls back to the fixed category set.
    pub async fn categories(&self) -> Vec<Category> {
        let fetched = self
            .get_json::<Vec<Category>>("/coins/categories", self.categories_ttl)
            .await
            .and_then(|categories| {
                if categories.is_empty() {
                    Err(MarketError::EmptyPayload {
                        endpoint: "/coins/categories".to_string(),
                    })
                } else {
                    Ok(categories)
                }
            });

        match fetched {
            Ok(categories) => categories,
            Err(err) => {
                warn!("categories fetch failed: {err}, using fallback set");
                fallback_categories()
            }
        }
    }
}
