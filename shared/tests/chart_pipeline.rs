//! End-to-end checks of the chart data pipeline: synthetic fallback series
//! flowing through shaping and viewport windowing, exactly as the chart
//! pages consume them.

use shared::chart::{self, Viewport};
use shared::market::{mock_ohlc_series, mock_price_series};

#[test]
fn ohlc_series_shapes_cleanly() {
    let series = mock_ohlc_series(30);
    let components = series.price_components();

    let (min, max) = chart::compute_bounds(&components, chart::CANDLE_PAD_FRACTION).unwrap();
    for value in &components {
        assert!(min <= *value && *value <= max);
    }

    let ma = chart::moving_average(&series.closes(), 20);
    assert_eq!(ma.len(), series.bars.len());
    assert!(ma[..19].iter().all(Option::is_none));
    assert!(ma[19..].iter().all(Option::is_some));

    let volumes = chart::volume_proxy(&series.bars);
    assert_eq!(volumes.len(), series.bars.len());
    assert!(volumes.iter().all(|v| *v >= 0.0));
}

#[test]
fn intraday_series_selects_intraday_density() {
    let series = mock_ohlc_series(1);
    let timestamps = series.timestamps();

    // 24 hourly bars can still cross a UTC midnight; only assert the
    // density tier matches whatever the detection says.
    let intraday = chart::is_intraday(&timestamps);
    let settings = chart::density_settings(series.bars.len(), intraday);
    // 24 bars fall in the >20 tier (0.10), halved when intraday
    let expected = if intraday { 0.05 } else { 0.10 };
    assert!((settings.bar_fraction - expected).abs() < 1e-12);
}

#[test]
fn viewport_windows_a_price_series() {
    let chart_data = mock_price_series(7);
    let timestamps = chart_data.timestamps();
    let mut viewport = Viewport::full(&timestamps).unwrap();

    viewport.zoom_in(&timestamps);

    // floor(28 / 1.5) = 18 trailing points visible
    let visible: Vec<_> = chart_data
        .points
        .iter()
        .filter(|p| viewport.contains(p.timestamp))
        .collect();
    assert_eq!(visible.len(), 18);
    assert_eq!(visible.last().unwrap().timestamp, *timestamps.last().unwrap());

    viewport.pan_left(&timestamps);
    let panned: Vec<_> = chart_data
        .points
        .iter()
        .filter(|p| viewport.contains(p.timestamp))
        .collect();
    assert!(!panned.is_empty());
    assert!(panned[0].timestamp <= visible[0].timestamp);
}

#[test]
fn mock_series_round_trip_keeps_shape_contract() {
    for days in [1_u32, 7, 30, 365] {
        let chart_data = mock_price_series(days);
        assert!(!chart_data.is_real_data);
        assert!(!chart_data.points.is_empty());

        let timestamps = chart_data.timestamps();
        let mut sorted = timestamps.clone();
        sorted.sort_unstable();
        assert_eq!(timestamps, sorted, "series must be time-ordered");

        let viewport = Viewport::full(&timestamps).unwrap();
        assert_eq!(viewport.min_ts, timestamps[0]);
        assert_eq!(viewport.max_ts, *timestamps.last().unwrap());
    }
}
