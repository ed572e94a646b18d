//! Zoom/pan window over a time-ordered series.
//!
//! The viewport is pure state plus arithmetic: operations re-window an
//! already-fetched series and never touch the network. Chart pages round-trip
//! it through query parameters and re-apply it against the current series.

/// Zoom never narrows the window below this many points.
pub const MIN_VISIBLE_POINTS: usize = 10;

const ZOOM_STEP: f64 = 0.5;
const PAN_FRACTION: f64 = 0.2;

/// Visible time window [min_ts, max_ts] plus the zoom level that produced
/// it. Invariant: min_ts <= max_ts, both within the series' span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub min_ts: i64,
    pub max_ts: i64,
    pub zoom: f64,
}

impl Viewport {
    /// Full-span window at zoom 1. `None` for an empty series.
    pub fn full(timestamps: &[i64]) -> Option<Self> {
        let (&first, &last) = (timestamps.first()?, timestamps.last()?);
        Some(Self {
            min_ts: first,
            max_ts: last,
            zoom: 1.0,
        })
    }

    /// Rebuild a viewport from round-tripped state, clamped into the
    /// current series' bounds. Inverted or out-of-range windows collapse
    /// back to the full span.
    pub fn restore(min_ts: i64, max_ts: i64, zoom: f64, timestamps: &[i64]) -> Option<Self> {
        let full = Self::full(timestamps)?;
        let min_ts = min_ts.clamp(full.min_ts, full.max_ts);
        let max_ts = max_ts.clamp(full.min_ts, full.max_ts);
        if min_ts > max_ts {
            return Some(full);
        }
        Some(Self {
            min_ts,
            max_ts,
            zoom: if zoom >= 1.0 { zoom } else { 1.0 },
        })
    }

    pub fn zoom_in(&mut self, timestamps: &[i64]) {
        if timestamps.is_empty() {
            return;
        }
        self.zoom += ZOOM_STEP;
        self.apply_zoom_window(timestamps);
    }

    /// One step back out; at zoom 1 the window resets to the full span
    /// (terminal state).
    pub fn zoom_out(&mut self, timestamps: &[i64]) {
        if timestamps.is_empty() {
            return;
        }
        if self.zoom > 1.0 {
            self.zoom -= ZOOM_STEP;
            self.apply_zoom_window(timestamps);
        } else {
            self.reset(timestamps);
        }
    }

    pub fn pan_left(&mut self, timestamps: &[i64]) {
        let Some(&first) = timestamps.first() else {
            return;
        };
        let range = self.max_ts - self.min_ts;
        let delta = (range as f64 * PAN_FRACTION) as i64;
        self.min_ts = (self.min_ts - delta).max(first);
        self.max_ts = self.min_ts + range;
    }

    pub fn pan_right(&mut self, timestamps: &[i64]) {
        let Some(&last) = timestamps.last() else {
            return;
        };
        let range = self.max_ts - self.min_ts;
        let delta = (range as f64 * PAN_FRACTION) as i64;
        self.max_ts = (self.max_ts + delta).min(last);
        self.min_ts = self.max_ts - range;
    }

    pub fn reset(&mut self, timestamps: &[i64]) {
        if let Some(full) = Self::full(timestamps) {
            *self = full;
        }
    }

    /// Window = the trailing `max(MIN_VISIBLE_POINTS, floor(total / zoom))`
    /// points of the series.
    fn apply_zoom_window(&mut self, timestamps: &[i64]) {
        let total = timestamps.len();
        let visible = ((total as f64 / self.zoom).floor() as usize)
            .max(MIN_VISIBLE_POINTS)
            .min(total);
        let start = total - visible;
        self.min_ts = timestamps[start];
        self.max_ts = timestamps[total - 1];
    }

    pub fn width(&self) -> i64 {
        self.max_ts - self.min_ts
    }

    pub fn contains(&self, ts: i64) -> bool {
        self.min_ts <= ts && ts <= self.max_ts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 3_600_000;

    fn hourly(count: usize) -> Vec<i64> {
        (0..count as i64).map(|i| i * HOUR_MS).collect()
    }

    fn assert_within(vp: &Viewport, timestamps: &[i64]) {
        assert!(vp.min_ts <= vp.max_ts);
        assert!(vp.min_ts >= timestamps[0]);
        assert!(vp.max_ts <= *timestamps.last().unwrap());
    }

    #[test]
    fn zoom_in_once_shows_trailing_16_of_24() {
        let ts = hourly(24);
        let mut vp = Viewport::full(&ts).unwrap();

        vp.zoom_in(&ts);

        assert_eq!(vp.zoom, 1.5);
        // floor(24 / 1.5) = 16 trailing points
        assert_eq!(vp.min_ts, ts[24 - 16]);
        assert_eq!(vp.max_ts, ts[23]);
    }

    #[test]
    fn zoom_floors_at_min_visible_points() {
        let ts = hourly(24);
        let mut vp = Viewport::full(&ts).unwrap();

        for _ in 0..20 {
            vp.zoom_in(&ts);
        }

        // way past floor(24/zoom) < 10, so the window pins at 10 points
        assert_eq!(vp.min_ts, ts[14]);
        assert_eq!(vp.max_ts, ts[23]);
        assert_within(&vp, &ts);
    }

    #[test]
    fn zoom_out_at_base_level_resets_to_full_span() {
        let ts = hourly(24);
        let mut vp = Viewport::full(&ts).unwrap();
        vp.pan_left(&ts);

        vp.zoom_out(&ts);

        assert_eq!(vp, Viewport::full(&ts).unwrap());
    }

    #[test]
    fn zoom_round_trip_returns_to_full() {
        let ts = hourly(48);
        let mut vp = Viewport::full(&ts).unwrap();

        vp.zoom_in(&ts);
        vp.zoom_in(&ts);
        vp.zoom_out(&ts);
        vp.zoom_out(&ts);

        assert_eq!(vp.zoom, 1.0);
        assert_eq!(vp, Viewport::full(&ts).unwrap());
    }

    #[test]
    fn pan_left_clamps_at_series_start() {
        let ts = hourly(24);
        let mut vp = Viewport::full(&ts).unwrap();
        vp.zoom_in(&ts);
        let width = vp.width();

        for _ in 0..50 {
            vp.pan_left(&ts);
        }

        assert_eq!(vp.min_ts, ts[0]);
        assert_eq!(vp.width(), width);
        assert_within(&vp, &ts);
    }

    #[test]
    fn pan_right_clamps_at_series_end() {
        let ts = hourly(24);
        let mut vp = Viewport::full(&ts).unwrap();
        vp.zoom_in(&ts);

        for _ in 0..50 {
            vp.pan_right(&ts);
        }

        assert_eq!(vp.max_ts, *ts.last().unwrap());
        assert_within(&vp, &ts);
    }

    #[test]
    fn pan_shifts_by_a_fifth_of_window() {
        let ts = hourly(100);
        let mut vp = Viewport::full(&ts).unwrap();
        vp.zoom_in(&ts);
        let (min_before, width) = (vp.min_ts, vp.width());

        vp.pan_left(&ts);

        assert_eq!(vp.min_ts, min_before - (width as f64 * 0.2) as i64);
        assert_eq!(vp.width(), width);
    }

    #[test]
    fn reset_is_idempotent_from_any_state() {
        let ts = hourly(24);
        let mut vp = Viewport::full(&ts).unwrap();
        vp.zoom_in(&ts);
        vp.zoom_in(&ts);
        vp.pan_left(&ts);

        vp.reset(&ts);
        let once = vp;
        vp.reset(&ts);

        assert_eq!(vp, once);
        assert_eq!(vp.zoom, 1.0);
        assert_eq!((vp.min_ts, vp.max_ts), (ts[0], *ts.last().unwrap()));
    }

    #[test]
    fn invariants_hold_under_mixed_operations() {
        let ts = hourly(72);
        let mut vp = Viewport::full(&ts).unwrap();

        let ops: [fn(&mut Viewport, &[i64]); 5] = [
            Viewport::zoom_in,
            Viewport::zoom_out,
            Viewport::pan_left,
            Viewport::pan_right,
            Viewport::reset,
        ];
        for (i, op) in ops.iter().cycle().take(40).enumerate() {
            op(&mut vp, &ts);
            assert_within(&vp, &ts);
            assert!(vp.zoom >= 1.0, "zoom fell below 1 at step {i}");
        }
    }

    #[test]
    fn restore_clamps_into_series_bounds() {
        let ts = hourly(24);
        let vp = Viewport::restore(-5_000_000, i64::MAX, 2.0, &ts).unwrap();
        assert_eq!((vp.min_ts, vp.max_ts), (ts[0], *ts.last().unwrap()));
        assert_eq!(vp.zoom, 2.0);

        let inverted = Viewport::restore(ts[20], ts[4], 1.5, &ts).unwrap();
        assert_eq!(inverted, Viewport::full(&ts).unwrap());
    }

    #[test]
    fn empty_series_has_no_viewport() {
        assert!(Viewport::full(&[]).is_none());
    }
}
