//! Presentation shaping for price and OHLC series: axis bounds, moving
//! average, synthetic volume proxy, and bar-density selection. All pure
//! functions over already-fetched data.

pub mod viewport;

pub use viewport::Viewport;

use chrono::{TimeZone, Utc};
use ta::indicators::SimpleMovingAverage;
use ta::Next;

use crate::models::OhlcBar;

/// Symmetric Y-axis padding for line series.
pub const LINE_PAD_FRACTION: f64 = 0.05;
/// Symmetric Y-axis padding for candle series.
pub const CANDLE_PAD_FRACTION: f64 = 0.10;

const VOLUME_PROXY_SCALE: f64 = 10.0;

/// Min/max across `values`, padded symmetrically by `pad_fraction` so the
/// series never plots at the axis edge. A flat series stays unpadded.
pub fn compute_bounds(values: &[f64], pad_fraction: f64) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = (max - min) * pad_fraction;
    Some((min - pad, max + pad))
}

/// Trailing simple moving average aligned index-for-index with `closes`.
///
/// The first `period - 1` entries are `None`; a period of zero or longer
/// than the series yields an all-`None` result of the same length.
pub fn moving_average(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || period > closes.len() {
        return vec![None; closes.len()];
    }

    let mut sma = SimpleMovingAverage::new(period).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let value = sma.next(close);
            if i + 1 >= period {
                Some(value)
            } else {
                None
            }
        })
        .collect()
}

/// Visual density tier for candle rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensitySettings {
    pub bar_fraction: f64,
    pub spacing_fraction: f64,
}

/// Discrete density tiers by point count, checked largest-count-first;
/// intraday data gets half-width bars so hourly candles stay legible.
pub fn density_settings(point_count: usize, is_intraday: bool) -> DensitySettings {
    let base = if point_count > 100 {
        0.03
    } else if point_count > 50 {
        0.06
    } else if point_count > 20 {
        0.10
    } else {
        0.15
    };

    let fraction = if is_intraday { base * 0.5 } else { base };
    DensitySettings {
        bar_fraction: fraction,
        spacing_fraction: fraction,
    }
}

/// Synthetic per-bar volume proxy; the OHLC endpoint carries no real
/// volume, so body size stands in for it.
pub fn volume_proxy(bars: &[OhlcBar]) -> Vec<f64> {
    bars.iter()
        .map(|bar| (bar.close - bar.open).abs() * VOLUME_PROXY_SCALE)
        .collect()
}

/// True when the first and last samples fall on the same UTC calendar day.
pub fn is_intraday(timestamps: &[i64]) -> bool {
    match (timestamps.first(), timestamps.last()) {
        (Some(&first), Some(&last)) => {
            let first = Utc.timestamp_millis_opt(first).single();
            let last = Utc.timestamp_millis_opt(last).single();
            match (first, last) {
                (Some(a), Some(b)) => a.date_naive() == b.date_naive(),
                _ => false,
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 3_600_000;
    const DAY_MS: i64 = 86_400_000;

    #[test]
    fn bounds_contain_all_values() {
        let values = [10.0, 14.0, 9.0, 12.5];
        let (min, max) = compute_bounds(&values, LINE_PAD_FRACTION).unwrap();

        for v in values {
            assert!(min < v && v < max);
        }
        // 5% of the 5.0 range on each side
        assert!((min - 8.75).abs() < 1e-9);
        assert!((max - 14.25).abs() < 1e-9);
    }

    #[test]
    fn flat_series_stays_unpadded() {
        let (min, max) = compute_bounds(&[42.0, 42.0, 42.0], CANDLE_PAD_FRACTION).unwrap();
        assert_eq!((min, max), (42.0, 42.0));
    }

    #[test]
    fn empty_series_has_no_bounds() {
        assert_eq!(compute_bounds(&[], LINE_PAD_FRACTION), None);
    }

    #[test]
    fn moving_average_known_values() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(ma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn moving_average_short_series_is_all_none() {
        let ma = moving_average(&[1.0, 2.0, 3.0], 20);
        assert_eq!(ma.len(), 3);
        assert!(ma.iter().all(Option::is_none));
    }

    #[test]
    fn moving_average_zero_period_is_all_none() {
        let ma = moving_average(&[1.0, 2.0, 3.0], 0);
        assert_eq!(ma, vec![None, None, None]);
    }

    #[test]
    fn density_tiers_by_count() {
        assert_eq!(density_settings(150, false).bar_fraction, 0.03);
        assert_eq!(density_settings(80, false).bar_fraction, 0.06);
        assert_eq!(density_settings(30, false).bar_fraction, 0.10);
        assert_eq!(density_settings(10, false).bar_fraction, 0.15);
        // boundary values fall into the smaller-count tier
        assert_eq!(density_settings(100, false).bar_fraction, 0.06);
        assert_eq!(density_settings(20, false).bar_fraction, 0.15);
    }

    #[test]
    fn intraday_halves_density() {
        let normal = density_settings(30, false);
        let intraday = density_settings(30, true);
        assert_eq!(intraday.bar_fraction, normal.bar_fraction * 0.5);
        assert_eq!(intraday.spacing_fraction, normal.spacing_fraction * 0.5);
    }

    #[test]
    fn volume_proxy_scales_body_size() {
        let bars = vec![
            OhlcBar { timestamp: 0, open: 100.0, high: 110.0, low: 95.0, close: 104.0 },
            OhlcBar { timestamp: 1, open: 104.0, high: 105.0, low: 99.0, close: 101.0 },
        ];
        assert_eq!(volume_proxy(&bars), vec![40.0, 30.0]);
    }

    #[test]
    fn intraday_detection() {
        let base = 1_700_000_000_000_i64 - (1_700_000_000_000_i64 % DAY_MS);
        let hourly: Vec<i64> = (0..12).map(|i| base + i * HOUR_MS).collect();
        assert!(is_intraday(&hourly));

        let daily: Vec<i64> = (0..7).map(|i| base + i * DAY_MS).collect();
        assert!(!is_intraday(&daily));

        assert!(!is_intraday(&[]));
    }
}
