//! View models and number formatting shared by the page handlers. Handlers
//! do all shaping here so the askama templates stay free of logic.

use shared::{CoinMarket, GlobalStats};

/// Grouped decimal representation, e.g. `1234567.891` -> `"1,234,567.89"`.
fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let negative = int_part.starts_with('-');
    let digits = int_part.trim_start_matches('-');

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Dollar price; sub-dollar coins keep more precision.
pub fn fmt_usd(value: f64) -> String {
    if value.abs() >= 1.0 {
        format!("${}", group_thousands(value, 2))
    } else {
        format!("${value:.6}")
    }
}

/// Large dollar figures as $X.XXB / $X.XXM, grouped below a million.
pub fn fmt_compact_usd(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("${:.2}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else {
        format!("${}", group_thousands(value, 0))
    }
}

/// Unsigned two-decimal percentage, sign carried separately by the view.
pub fn fmt_pct(value: f64) -> String {
    format!("{:.2}%", value.abs())
}

pub fn fmt_int(value: f64) -> String {
    group_thousands(value, 0)
}

/// Percent-encode a user-supplied string for a query parameter when
/// rebuilding filter/sort links.
pub fn encode_query(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// The four global stat cards shown on the dashboard and market pages.
pub struct OverviewView {
    pub market_cap: String,
    pub market_cap_change: String,
    pub market_cap_up: bool,
    pub volume: String,
    pub volume_share: String,
    pub btc_dominance: String,
    pub eth_dominance: String,
    pub active_cryptos: String,
    pub markets: String,
}

impl OverviewView {
    pub fn from_stats(stats: &GlobalStats) -> Self {
        let market_cap = stats.market_cap_usd().unwrap_or(0.0);
        let volume = stats.volume_usd().unwrap_or(0.0);
        let change = stats.market_cap_change_percentage_24h_usd.unwrap_or(0.0);
        let volume_share = if market_cap > 0.0 {
            volume / market_cap * 100.0
        } else {
            0.0
        };

        Self {
            market_cap: fmt_compact_usd(market_cap),
            market_cap_change: fmt_pct(change),
            market_cap_up: change > 0.0,
            volume: fmt_compact_usd(volume),
            volume_share: format!("{volume_share:.2}%"),
            btc_dominance: format!("{:.2}%", stats.dominance("btc").unwrap_or(0.0)),
            eth_dominance: format!("{:.2}%", stats.dominance("eth").unwrap_or(0.0)),
            active_cryptos: fmt_int(stats.active_cryptocurrencies.unwrap_or(0) as f64),
            markets: fmt_int(stats.markets.unwrap_or(0) as f64),
        }
    }
}

/// One row of a coin listing table.
pub struct CoinRowView {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub has_image: bool,
    pub rank: String,
    pub price: String,
    pub change: String,
    pub change_up: bool,
    pub has_change: bool,
    pub market_cap: String,
    pub volume: String,
    pub watched: bool,
}

impl CoinRowView {
    pub fn from_market(coin: &CoinMarket, watched: bool) -> Self {
        let change = coin.price_change_percentage_24h;
        Self {
            id: coin.id.clone(),
            name: coin.name.clone(),
            symbol: coin.symbol.to_uppercase(),
            has_image: coin.image.is_some(),
            image: coin.image.clone().unwrap_or_default(),
            rank: coin
                .market_cap_rank
                .map(|r| r.to_string())
                .unwrap_or_else(|| "—".to_string()),
            price: coin.current_price.map(fmt_usd).unwrap_or_else(|| "—".to_string()),
            change: change.map(fmt_pct).unwrap_or_default(),
            change_up: change.unwrap_or(0.0) > 0.0,
            has_change: change.is_some(),
            market_cap: coin
                .market_cap
                .map(fmt_compact_usd)
                .unwrap_or_else(|| "—".to_string()),
            volume: coin
                .total_volume
                .map(fmt_compact_usd)
                .unwrap_or_else(|| "—".to_string()),
            watched,
        }
    }
}
