use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the `/coins/markets` listing. Numeric fields are nullable
/// upstream for thinly traded coins, so they all come through as `Option`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<u32>,
    pub total_volume: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub circulating_supply: Option<f64>,
}

/// `/global` response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalData {
    pub data: GlobalStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalStats {
    pub active_cryptocurrencies: Option<u64>,
    pub markets: Option<u64>,
    #[serde(default)]
    pub total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap_percentage: HashMap<String, f64>,
    pub market_cap_change_percentage_24h_usd: Option<f64>,
}

impl GlobalStats {
    pub fn market_cap_usd(&self) -> Option<f64> {
        self.total_market_cap.get("usd").copied()
    }

    pub fn volume_usd(&self) -> Option<f64> {
        self.total_volume.get("usd").copied()
    }

    pub fn dominance(&self, symbol: &str) -> Option<f64> {
        self.market_cap_percentage.get(symbol).copied()
    }
}

/// `/coins/{id}` detail payload, trimmed to the fields the pages use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: Option<CoinImage>,
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub description: HashMap<String, String>,
    pub market_data: Option<CoinMarketData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinImage {
    pub thumb: Option<String>,
    pub small: Option<String>,
    pub large: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinMarketData {
    #[serde(default)]
    pub current_price: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub circulating_supply: Option<f64>,
}

impl CoinDetail {
    pub fn price_usd(&self) -> Option<f64> {
        self.market_data
            .as_ref()
            .and_then(|m| m.current_price.get("usd").copied())
    }

    /// English description, empty string when upstream has none.
    pub fn description_en(&self) -> &str {
        self.description.get("en").map(String::as_str).unwrap_or("")
    }
}

/// `/search/trending` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingResponse {
    #[serde(default)]
    pub coins: Vec<TrendingItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingItem {
    pub item: TrendingCoin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub small: Option<String>,
    pub market_cap_rank: Option<u32>,
    pub price_btc: Option<f64>,
}

/// One `/coins/categories` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub market_cap: Option<f64>,
    pub market_cap_change_24h: Option<f64>,
    pub volume_24h: Option<f64>,
}

/// `/search` response, coins section only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub coins: Vec<SearchCoin>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub market_cap_rank: Option<u32>,
    pub thumb: Option<String>,
    pub large: Option<String>,
}

/// A single sample of a price series, epoch millis + USD price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub price: f64,
}

/// Price history for one coin over one range. `is_real_data` is false when
/// the fetch degraded to the synthetic random walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketChart {
    pub points: Vec<PricePoint>,
    pub is_real_data: bool,
}

impl MarketChart {
    pub fn timestamps(&self) -> Vec<i64> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }
}

/// One OHLC bar, epoch millis + USD prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcBar {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OhlcSeries {
    pub bars: Vec<OhlcBar>,
    pub is_real_data: bool,
}

impl OhlcSeries {
    pub fn timestamps(&self) -> Vec<i64> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// All price components flattened, for axis bounds.
    pub fn price_components(&self) -> Vec<f64> {
        self.bars
            .iter()
            .flat_map(|b| [b.open, b.high, b.low, b.close])
            .collect()
    }
}

/// Static news entry (there is no upstream news API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image: String,
    pub published_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_market_tolerates_null_numerics() {
        let row = serde_json::json!({
            "id": "mystery-token",
            "symbol": "myst",
            "name": "Mystery",
            "image": null,
            "current_price": null,
            "market_cap": null,
            "market_cap_rank": null,
            "total_volume": null,
            "price_change_percentage_24h": null,
            "circulating_supply": null
        });

        let coin: CoinMarket = serde_json::from_value(row).unwrap();
        assert_eq!(coin.id, "mystery-token");
        assert!(coin.current_price.is_none());
        assert!(coin.market_cap_rank.is_none());
    }

    #[test]
    fn global_stats_accessors() {
        let payload = serde_json::json!({
            "data": {
                "active_cryptocurrencies": 10234,
                "markets": 789,
                "total_market_cap": { "usd": 1.5e12, "eur": 1.4e12 },
                "total_volume": { "usd": 7.5e10 },
                "market_cap_percentage": { "btc": 52.1, "eth": 17.3 },
                "market_cap_change_percentage_24h_usd": -1.25
            }
        });

        let global: GlobalData = serde_json::from_value(payload).unwrap();
        assert_eq!(global.data.market_cap_usd(), Some(1.5e12));
        assert_eq!(global.data.dominance("btc"), Some(52.1));
        assert_eq!(global.data.dominance("sol"), None);
    }

    #[test]
    fn coin_detail_without_market_data() {
        let payload = serde_json::json!({
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "market_cap_rank": 1,
            "description": { "en": "Digital gold." }
        });

        let detail: CoinDetail = serde_json::from_value(payload).unwrap();
        assert_eq!(detail.price_usd(), None);
        assert_eq!(detail.description_en(), "Digital gold.");
    }

    #[test]
    fn trending_payload_shape() {
        let payload = serde_json::json!({
            "coins": [
                { "item": {
                    "id": "pepe", "name": "Pepe", "symbol": "PEPE",
                    "small": "https://img/pepe.png",
                    "market_cap_rank": 31, "price_btc": 1.7e-10
                } }
            ]
        });

        let trending: TrendingResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(trending.coins.len(), 1);
        assert_eq!(trending.coins[0].item.market_cap_rank, Some(31));
    }

    #[test]
    fn ohlc_bar_direction() {
        let up = OhlcBar { timestamp: 0, open: 10.0, high: 12.0, low: 9.0, close: 11.0 };
        let down = OhlcBar { timestamp: 0, open: 10.0, high: 12.0, low: 9.0, close: 9.5 };
        assert!(up.is_bullish());
        assert!(!down.is_bullish());
        assert_eq!(up.range(), 3.0);
    }
}
