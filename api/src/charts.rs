//! Server-side chart rendering. Shaped series go in, a standalone SVG
//! string comes out and is embedded inline by the coin page template.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use plotters::prelude::*;

use shared::chart::{self, Viewport};
use shared::{MarketChart, OhlcSeries};

use crate::views;

const CHART_SIZE: (u32, u32) = (900, 520);
const MAX_CANDLE_PX: f64 = 8.0;

const LINE_BLUE: RGBColor = RGBColor(59, 130, 246);
const MA_AMBER: RGBColor = RGBColor(245, 158, 11);
const CANDLE_GREEN: RGBColor = RGBColor(34, 197, 94);
const CANDLE_RED: RGBColor = RGBColor(239, 68, 68);
const GRID_GREY: RGBColor = RGBColor(148, 163, 184);

fn to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_else(Utc::now)
}

/// Time axis for the visible window; a degenerate single-point window gets
/// an hour of breathing room on each side.
fn x_range(viewport: &Viewport) -> (DateTime<Utc>, DateTime<Utc>) {
    if viewport.width() == 0 {
        (
            to_datetime(viewport.min_ts) - Duration::hours(1),
            to_datetime(viewport.max_ts) + Duration::hours(1),
        )
    } else {
        (to_datetime(viewport.min_ts), to_datetime(viewport.max_ts))
    }
}

/// A flat series would collapse the Y axis; give it a unit of height.
fn spread((min, max): (f64, f64)) -> (f64, f64) {
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}

fn price_label(value: &f64) -> String {
    if value.abs() >= 1000.0 {
        format!("${}", views::fmt_int(*value))
    } else if value.abs() >= 1.0 {
        format!("${value:.2}")
    } else {
        format!("${value:.4}")
    }
}

pub fn render_line_chart(
    series: &MarketChart,
    viewport: &Viewport,
    ma_period: usize,
) -> Result<String> {
    let prices = series.prices();
    let bounds = chart::compute_bounds(&prices, chart::LINE_PAD_FRACTION)
        .ok_or_else(|| anyhow!("no points to plot"))?;
    let (y_min, y_max) = spread(bounds);
    let (x_min, x_max) = x_range(viewport);

    let timestamps = series.timestamps();
    let intraday = chart::is_intraday(&timestamps);
    let ma = chart::moving_average(&prices, ma_period);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| anyhow!("failed to fill canvas: {e}"))?;

        let mut ctx = ChartBuilder::on(&root)
            .margin(16)
            .x_label_area_size(36)
            .y_label_area_size(64)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| anyhow!("failed to build chart: {e}"))?;

        ctx.configure_mesh()
            .light_line_style(GRID_GREY.mix(0.15))
            .bold_line_style(GRID_GREY.mix(0.3))
            .x_label_formatter(&|ts: &DateTime<Utc>| {
                if intraday {
                    ts.format("%H:%M").to_string()
                } else {
                    ts.format("%d %b").to_string()
                }
            })
            .y_label_formatter(&price_label)
            .draw()
            .map_err(|e| anyhow!("failed to draw mesh: {e}"))?;

        let visible: Vec<(DateTime<Utc>, f64)> = series
            .points
            .iter()
            .filter(|p| viewport.contains(p.timestamp))
            .map(|p| (to_datetime(p.timestamp), p.price))
            .collect();

        ctx.draw_series(
            AreaSeries::new(visible.iter().cloned(), y_min, LINE_BLUE.mix(0.12))
                .border_style(LINE_BLUE.stroke_width(2)),
        )
        .map_err(|e| anyhow!("failed to draw price line: {e}"))?;

        if ma_period > 0 {
            let ma_points: Vec<(DateTime<Utc>, f64)> = series
                .points
                .iter()
                .zip(ma.iter())
                .filter(|(p, _)| viewport.contains(p.timestamp))
                .filter_map(|(p, v)| v.map(|v| (to_datetime(p.timestamp), v)))
                .collect();
            if !ma_points.is_empty() {
                ctx.draw_series(LineSeries::new(ma_points, MA_AMBER.stroke_width(2)))
                    .map_err(|e| anyhow!("failed to draw moving average: {e}"))?;
            }
        }

        root.present()
            .map_err(|e| anyhow!("failed to render chart: {e}"))?;
    }

    Ok(svg)
}

pub fn render_candle_chart(
    series: &OhlcSeries,
    viewport: &Viewport,
    ma_period: usize,
    show_volume: bool,
) -> Result<String> {
    let components = series.price_components();
    let bounds = chart::compute_bounds(&components, chart::CANDLE_PAD_FRACTION)
        .ok_or_else(|| anyhow!("no bars to plot"))?;
    let (y_min, y_max) = spread(bounds);
    let (x_min, x_max) = x_range(viewport);

    let timestamps = series.timestamps();
    let intraday = chart::is_intraday(&timestamps);
    let density = chart::density_settings(series.bars.len(), intraday);
    let ma = chart::moving_average(&series.closes(), ma_period);
    let volumes = chart::volume_proxy(&series.bars);
    let vol_max = volumes.iter().copied().fold(0.0, f64::max) * 1.1;

    let visible: Vec<usize> = (0..series.bars.len())
        .filter(|&i| viewport.contains(series.bars[i].timestamp))
        .collect();

    // candle width in pixels follows the density tier over the visible bars
    let plot_px = CHART_SIZE.0 as f64 - 96.0;
    let per_bar = plot_px / visible.len().max(1) as f64;
    let candle_px = (per_bar * density.bar_fraction * 10.0).clamp(1.0, MAX_CANDLE_PX) as u32;

    let step_ms = if timestamps.len() > 1 {
        (timestamps[timestamps.len() - 1] - timestamps[0]) / (timestamps.len() as i64 - 1)
    } else {
        3_600_000
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| anyhow!("failed to fill canvas: {e}"))?;

        let mut ctx = ChartBuilder::on(&root)
            .margin(16)
            .x_label_area_size(36)
            .y_label_area_size(64)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| anyhow!("failed to build chart: {e}"))?
            .set_secondary_coord(x_min..x_max, 0.0..vol_max.max(1.0));

        ctx.configure_mesh()
            .light_line_style(GRID_GREY.mix(0.15))
            .bold_line_style(GRID_GREY.mix(0.3))
            .x_label_formatter(&|ts: &DateTime<Utc>| {
                if intraday {
                    ts.format("%H:%M").to_string()
                } else {
                    ts.format("%d %b").to_string()
                }
            })
            .y_label_formatter(&price_label)
            .draw()
            .map_err(|e| anyhow!("failed to draw mesh: {e}"))?;

        if show_volume {
            let half = Duration::milliseconds(
                ((step_ms as f64 * density.spacing_fraction * 10.0) / 2.0).max(1.0) as i64,
            );
            ctx.draw_secondary_series(visible.iter().map(|&i| {
                let bar = &series.bars[i];
                let t = to_datetime(bar.timestamp);
                let color = if bar.is_bullish() {
                    CANDLE_GREEN.mix(0.15)
                } else {
                    CANDLE_RED.mix(0.15)
                };
                Rectangle::new([(t - half, 0.0), (t + half, volumes[i])], color.filled())
            }))
            .map_err(|e| anyhow!("failed to draw volume bars: {e}"))?;
        }

        ctx.draw_series(visible.iter().map(|&i| {
            let bar = &series.bars[i];
            CandleStick::new(
                to_datetime(bar.timestamp),
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                CANDLE_GREEN.filled(),
                CANDLE_RED.filled(),
                candle_px,
            )
        }))
        .map_err(|e| anyhow!("failed to draw candles: {e}"))?;

        if ma_period > 0 {
            let ma_points: Vec<(DateTime<Utc>, f64)> = series
                .bars
                .iter()
                .zip(ma.iter())
                .filter(|(bar, _)| viewport.contains(bar.timestamp))
                .filter_map(|(bar, v)| v.map(|v| (to_datetime(bar.timestamp), v)))
                .collect();
            if !ma_points.is_empty() {
                ctx.draw_series(LineSeries::new(ma_points, MA_AMBER.stroke_width(2)))
                    .map_err(|e| anyhow!("failed to draw moving average: {e}"))?;
            }
        }

        root.present()
            .map_err(|e| anyhow!("failed to render chart: {e}"))?;
    }

    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{OhlcBar, PricePoint};

    const HOUR_MS: i64 = 3_600_000;

    fn line_series(count: usize) -> MarketChart {
        MarketChart {
            points: (0..count)
                .map(|i| PricePoint {
                    timestamp: 1_700_000_000_000 + i as i64 * HOUR_MS,
                    price: 30_000.0 + i as f64 * 25.0,
                })
                .collect(),
            is_real_data: true,
        }
    }

    fn candle_series(count: usize) -> OhlcSeries {
        OhlcSeries {
            bars: (0..count)
                .map(|i| {
                    let open = 30_000.0 + i as f64 * 10.0;
                    OhlcBar {
                        timestamp: 1_700_000_000_000 + i as i64 * HOUR_MS,
                        open,
                        high: open + 50.0,
                        low: open - 50.0,
                        close: open + 20.0,
                    }
                })
                .collect(),
            is_real_data: true,
        }
    }

    #[test]
    fn line_chart_renders_svg() {
        let series = line_series(24);
        let viewport = Viewport::full(&series.timestamps()).unwrap();

        let svg = render_line_chart(&series, &viewport, 7).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn candle_chart_renders_svg_with_volume() {
        let series = candle_series(30);
        let viewport = Viewport::full(&series.timestamps()).unwrap();

        let svg = render_candle_chart(&series, &viewport, 20, true).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn zoomed_window_still_renders() {
        let series = candle_series(48);
        let timestamps = series.timestamps();
        let mut viewport = Viewport::full(&timestamps).unwrap();
        viewport.zoom_in(&timestamps);
        viewport.pan_left(&timestamps);

        let svg = render_candle_chart(&series, &viewport, 0, false).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn empty_series_is_an_error() {
        let series = MarketChart {
            points: Vec::new(),
            is_real_data: true,
        };
        let viewport = Viewport {
            min_ts: 0,
            max_ts: 1,
            zoom: 1.0,
        };
        assert!(render_line_chart(&series, &viewport, 20).is_err());
    }
}
