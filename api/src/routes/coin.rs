use std::sync::Arc;

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{error, warn};

use shared::chart::Viewport;
use shared::CoinDetail;

use crate::charts;
use crate::state::AppState;
use crate::views::{fmt_compact_usd, fmt_int, fmt_pct, fmt_usd};

use super::render;

const RANGES: [(u32, &str); 4] = [(1, "1D"), (7, "7D"), (30, "30D"), (365, "1Y")];
const MA_PERIODS: [usize; 5] = [7, 14, 20, 50, 100];

#[derive(Deserialize)]
pub struct ChartParams {
    pub kind: Option<String>,
    pub days: Option<u32>,
    pub ma: Option<usize>,
    pub vol: Option<u8>,
    pub zoom: Option<f64>,
    pub vmin: Option<i64>,
    pub vmax: Option<i64>,
    pub op: Option<String>,
}

pub struct TabView {
    pub label: String,
    pub href: String,
    pub active: bool,
}

#[derive(Template)]
#[template(path = "coin.html")]
struct CoinTemplate {
    id: String,
    name: String,
    symbol: String,
    image: String,
    has_image: bool,
    rank: String,
    has_rank: bool,
    price: String,
    change: String,
    change_up: bool,
    has_change: bool,
    market_cap: String,
    volume: String,
    supply: String,
    description: String,
    has_description: bool,
    watched: bool,
    chart_svg: String,
    has_chart: bool,
    chart_note: String,
    kind_candle: bool,
    kind_line: bool,
    line_href: String,
    candle_href: String,
    range_tabs: Vec<TabView>,
    ma_tabs: Vec<TabView>,
    ma_on: bool,
    ma_toggle_href: String,
    vol_on: bool,
    vol_toggle_href: String,
    pan_left_href: String,
    zoom_in_href: String,
    zoom_out_href: String,
    pan_right_href: String,
    reset_href: String,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    coin_id: String,
}

pub async fn page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ChartParams>,
) -> Response {
    let detail = match state.market.coin_detail(&id).await {
        Ok(detail) => detail,
        Err(err) => {
            warn!("coin detail fetch failed for {id}: {err}");
            let body = render(NotFoundTemplate { coin_id: id });
            return (StatusCode::NOT_FOUND, body).into_response();
        }
    };

    let kind_candle = params.kind.as_deref() != Some("line");
    let days = match params.days.unwrap_or(7) {
        1 => 1,
        30 => 30,
        365 => 365,
        _ => 7,
    };
    let ma_period = params.ma.unwrap_or(20);
    let show_volume = params.vol.unwrap_or(1) != 0;

    // Fetch the series, window it, render SVG. Chart failures degrade to a
    // placeholder panel; they never take the page down.
    let (svg, is_real_data, viewport) = if kind_candle {
        let series = state.market.ohlc(&id, days).await;
        let timestamps = series.timestamps();
        match apply_viewport(&params, &timestamps) {
            Some(viewport) => (
                charts::render_candle_chart(&series, &viewport, ma_period, show_volume)
                    .map_err(|err| error!("candle chart render failed for {id}: {err}"))
                    .ok(),
                series.is_real_data,
                Some(viewport),
            ),
            None => (None, series.is_real_data, None),
        }
    } else {
        let series = state.market.market_chart(&id, days).await;
        let timestamps = series.timestamps();
        match apply_viewport(&params, &timestamps) {
            Some(viewport) => (
                charts::render_line_chart(&series, &viewport, ma_period)
                    .map_err(|err| error!("line chart render failed for {id}: {err}"))
                    .ok(),
                series.is_real_data,
                Some(viewport),
            ),
            None => (None, series.is_real_data, None),
        }
    };

    let kind = if kind_candle { "candle" } else { "line" };
    let href = |kind: &str, days: u32, ma: usize, vol: bool, vp: Option<&Viewport>, op: Option<&str>| {
        let mut href = format!(
            "/coin/{id}?kind={kind}&days={days}&ma={ma}&vol={}",
            u8::from(vol)
        );
        if let Some(vp) = vp {
            href.push_str(&format!("&zoom={}&vmin={}&vmax={}", vp.zoom, vp.min_ts, vp.max_ts));
        }
        if let Some(op) = op {
            href.push_str(&format!("&op={op}"));
        }
        href
    };

    // viewport controls re-submit the current window plus one operation
    let vp = viewport.as_ref();
    let control = |op: &str| href(kind, days, ma_period, show_volume, vp, Some(op));

    let range_tabs = RANGES
        .iter()
        .map(|&(range_days, label)| TabView {
            label: label.to_string(),
            href: href(kind, range_days, ma_period, show_volume, None, None),
            active: range_days == days,
        })
        .collect();

    let ma_tabs = MA_PERIODS
        .iter()
        .map(|&period| TabView {
            label: format!("MA {period}"),
            href: href(kind, days, period, show_volume, None, None),
            active: period == ma_period,
        })
        .collect();

    let chart_note = if svg.is_none() {
        "Chart data is unavailable right now.".to_string()
    } else if is_real_data {
        "Use the controls to zoom and pan.".to_string()
    } else {
        "Sample data shown because of upstream API rate limits.".to_string()
    };

    let watched = {
        let store = state.watchlist.lock().unwrap_or_else(|e| e.into_inner());
        store.is_watched(&detail.id)
    };

    let view = build_view(BuildView {
        detail,
        watched,
        svg,
        chart_note,
        kind_candle,
        line_href: href("line", days, ma_period, show_volume, None, None),
        candle_href: href("candle", days, ma_period, show_volume, None, None),
        range_tabs,
        ma_tabs,
        ma_on: ma_period > 0,
        ma_toggle_href: href(
            kind,
            days,
            if ma_period > 0 { 0 } else { 20 },
            show_volume,
            vp,
            None,
        ),
        vol_on: show_volume,
        vol_toggle_href: href(kind, days, ma_period, !show_volume, vp, None),
        pan_left_href: control("pan-left"),
        zoom_in_href: control("zoom-in"),
        zoom_out_href: control("zoom-out"),
        pan_right_href: control("pan-right"),
        reset_href: control("reset"),
    });

    render(view)
}

/// Decode the round-tripped viewport (or start from the full span) and
/// apply the requested operation against the current series.
fn apply_viewport(params: &ChartParams, timestamps: &[i64]) -> Option<Viewport> {
    let mut viewport = match (params.vmin, params.vmax, params.zoom) {
        (Some(min), Some(max), Some(zoom)) => Viewport::restore(min, max, zoom, timestamps)?,
        _ => Viewport::full(timestamps)?,
    };

    match params.op.as_deref() {
        Some("zoom-in") => viewport.zoom_in(timestamps),
        Some("zoom-out") => viewport.zoom_out(timestamps),
        Some("pan-left") => viewport.pan_left(timestamps),
        Some("pan-right") => viewport.pan_right(timestamps),
        Some("reset") => viewport.reset(timestamps),
        _ => {}
    }

    Some(viewport)
}

struct BuildView {
    detail: CoinDetail,
    watched: bool,
    svg: Option<String>,
    chart_note: String,
    kind_candle: bool,
    line_href: String,
    candle_href: String,
    range_tabs: Vec<TabView>,
    ma_tabs: Vec<TabView>,
    ma_on: bool,
    ma_toggle_href: String,
    vol_on: bool,
    vol_toggle_href: String,
    pan_left_href: String,
    zoom_in_href: String,
    zoom_out_href: String,
    pan_right_href: String,
    reset_href: String,
}

fn build_view(input: BuildView) -> CoinTemplate {
    let detail = &input.detail;
    let market = detail.market_data.as_ref();
    let change = market.and_then(|m| m.price_change_percentage_24h);
    let description = detail.description_en().to_string();
    let image = detail
        .image
        .as_ref()
        .and_then(|i| i.large.clone().or_else(|| i.small.clone()))
        .unwrap_or_default();

    CoinTemplate {
        id: detail.id.clone(),
        name: detail.name.clone(),
        symbol: detail.symbol.to_uppercase(),
        has_image: !image.is_empty(),
        image,
        rank: detail
            .market_cap_rank
            .map(|r| format!("Rank #{r}"))
            .unwrap_or_default(),
        has_rank: detail.market_cap_rank.is_some(),
        price: detail
            .price_usd()
            .map(fmt_usd)
            .unwrap_or_else(|| "No data".to_string()),
        change: change.map(fmt_pct).unwrap_or_default(),
        change_up: change.unwrap_or(0.0) > 0.0,
        has_change: change.is_some(),
        market_cap: market
            .and_then(|m| m.market_cap.get("usd").copied())
            .map(fmt_compact_usd)
            .unwrap_or_else(|| "No data".to_string()),
        volume: market
            .and_then(|m| m.total_volume.get("usd").copied())
            .map(fmt_compact_usd)
            .unwrap_or_else(|| "No data".to_string()),
        supply: market
            .and_then(|m| m.circulating_supply)
            .map(|s| format!("{} {}", fmt_int(s), detail.symbol.to_uppercase()))
            .unwrap_or_else(|| "No data".to_string()),
        has_description: !description.is_empty(),
        description,
        watched: input.watched,
        has_chart: input.svg.is_some(),
        chart_svg: input.svg.unwrap_or_default(),
        chart_note: input.chart_note,
        kind_candle: input.kind_candle,
        kind_line: !input.kind_candle,
        line_href: input.line_href,
        candle_href: input.candle_href,
        range_tabs: input.range_tabs,
        ma_tabs: input.ma_tabs,
        ma_on: input.ma_on,
        ma_toggle_href: input.ma_toggle_href,
        vol_on: input.vol_on,
        vol_toggle_href: input.vol_toggle_href,
        pan_left_href: input.pan_left_href,
        zoom_in_href: input.zoom_in_href,
        zoom_out_href: input.zoom_out_href,
        pan_right_href: input.pan_right_href,
        reset_href: input.reset_href,
    }
}
