//! Placeholder series for when the upstream API is down or rate limited.
//!
//! The generated data follows the same point-count and spacing contract as
//! the real endpoints, so the shaping and rendering layers never need to
//! know where a series came from. Every synthetic series is labeled via
//! `is_real_data = false`.

use chrono::Utc;
use rand::Rng;

use crate::models::{Category, MarketChart, OhlcBar, OhlcSeries, PricePoint};

const START_PRICE: f64 = 30_000.0;
const HOURLY_VOLATILITY: f64 = 0.005;
const DAILY_VOLATILITY: f64 = 0.02;
const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

fn step(rng: &mut impl Rng, price: f64, volatility: f64) -> f64 {
    let change = (rng.gen::<f64>() - 0.5) * 2.0 * volatility;
    price * (1.0 + change)
}

/// Random-walk price series matching the `/market_chart` shape for `days`.
///
/// 1 day yields 24 hourly samples; 7 days yields 28 samples; 30 days one
/// per day; anything else one sample per day.
pub fn mock_price_series(days: u32) -> MarketChart {
    let now = Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let mut price = START_PRICE;
    let mut points = Vec::new();

    if days <= 1 {
        for i in 0..24 {
            let timestamp = now - (23 - i) * HOUR_MS;
            price = step(&mut rng, price, HOURLY_VOLATILITY);
            points.push(PricePoint { timestamp, price });
        }
    } else {
        let count = match days {
            7 => 28,
            30 => 30,
            n => n as i64,
        };
        let time_step = days as i64 * DAY_MS / count;
        for i in 0..count {
            let timestamp = now - (count - 1 - i) * time_step;
            price = step(&mut rng, price, DAILY_VOLATILITY);
            points.push(PricePoint { timestamp, price });
        }
    }

    MarketChart {
        points,
        is_real_data: false,
    }
}

/// Random-walk OHLC series matching the `/ohlc` shape: hourly bars for one
/// day, otherwise one bar per day.
pub fn mock_ohlc_series(days: u32) -> OhlcSeries {
    let now = Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let mut price = START_PRICE;
    let mut bars = Vec::new();

    let (count, spacing, volatility, wick) = if days <= 1 {
        (24_i64, HOUR_MS, HOURLY_VOLATILITY, 0.01)
    } else {
        (days as i64, DAY_MS, DAILY_VOLATILITY, 0.03)
    };

    for i in 0..count {
        let timestamp = now - (count - 1 - i) * spacing;
        price = step(&mut rng, price, volatility);

        let open = price;
        let high = open * (1.0 + rng.gen::<f64>() * wick);
        let low = open * (1.0 - rng.gen::<f64>() * wick);
        let close = ((open + high + low) / 3.0 + (rng.gen::<f64>() - 0.5) * (high - low))
            .clamp(low, high);

        bars.push(OhlcBar {
            timestamp,
            open,
            high,
            low,
            close,
        });
    }

    OhlcSeries {
        bars,
        is_real_data: false,
    }
}

/// Fixed category set served when `/coins/categories` fails or returns an
/// empty payload.
pub fn fallback_categories() -> Vec<Category> {
    vec![
        Category {
            id: "cryptocurrency".to_string(),
            name: "Cryptocurrency".to_string(),
            market_cap: Some(1_500_000_000_000.0),
            market_cap_change_24h: Some(2.5),
            volume_24h: Some(75_000_000_000.0),
        },
        Category {
            id: "decentralized-finance-defi".to_string(),
            name: "DeFi".to_string(),
            market_cap: Some(45_000_000_000.0),
            market_cap_change_24h: Some(-1.2),
            volume_24h: Some(5_000_000_000.0),
        },
        Category {
            id: "non-fungible-tokens-nft".to_string(),
            name: "NFT".to_string(),
            market_cap: Some(25_000_000_000.0),
            market_cap_change_24h: Some(0.8),
            volume_24h: Some(2_000_000_000.0),
        },
        Category {
            id: "metaverse".to_string(),
            name: "Metaverse".to_string(),
            market_cap: Some(18_000_000_000.0),
            market_cap_change_24h: Some(3.2),
            volume_24h: Some(1_500_000_000.0),
        },
        Category {
            id: "layer-1".to_string(),
            name: "Layer 1".to_string(),
            market_cap: Some(350_000_000_000.0),
            market_cap_change_24h: Some(1.5),
            volume_24h: Some(20_000_000_000.0),
        },
        Category {
            id: "layer-2".to_string(),
            name: "Layer 2".to_string(),
            market_cap: Some(50_000_000_000.0),
            market_cap_change_24h: Some(4.2),
            volume_24h: Some(8_000_000_000.0),
        },
    ]
}
