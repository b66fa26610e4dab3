//! Chart construction specs and data payloads.
//!
//! The axis-scale policy lives here: the suggested axis upper bound is
//! always derived from the true values, while an all-zero series swaps in
//! a hairline epsilon at render time so an empty week still shows a
//! visible baseline instead of a blank chart.

use serde::Serialize;

use crate::series::CalendarWindow;
use crate::theme::Palette;

/// Rendered chart shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
}

/// Display stand-in for every point of an all-zero series.
pub const ZERO_EPSILON: f64 = 0.01;

/// Axis headroom multiplier above the series maximum.
pub const AXIS_HEADROOM: f64 = 1.3;

/// Suggested upper bound for the value axis.
///
/// An all-zero (or empty) series gets a fixed bound of 1.0 so the epsilon
/// baseline sits near the bottom instead of filling the chart.
pub fn axis_upper_bound(values: &[f64]) -> f64 {
    let max = values.iter().fold(0.0_f64, |acc, v| acc.max(*v));
    if max == 0.0 { 1.0 } else { max * AXIS_HEADROOM }
}

/// Values as rendered: real values pass through untouched, an all-zero
/// series is replaced by [`ZERO_EPSILON`] at every point.
pub fn display_values(values: &[f64]) -> Vec<f64> {
    if values.iter().any(|v| *v != 0.0) {
        values.to_vec()
    } else {
        values.iter().map(|_| ZERO_EPSILON).collect()
    }
}

/// The data payload pushed into a chart on update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub suggested_max: f64,
}

impl ChartData {
    /// Builds the render payload for a projected window. The window itself
    /// keeps its true values; only the payload carries the epsilon.
    pub fn from_window(window: &CalendarWindow) -> Self {
        let truth = window.values();
        ChartData {
            labels: window.labels(),
            suggested_max: axis_upper_bound(&truth),
            values: display_values(&truth),
        }
    }
}

/// Everything a backend needs to construct a chart.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub kind: ChartKind,
    /// Caption and legend label for the single data series.
    pub series_label: String,
    /// Accent color token for strokes and fills (`#rrggbb`).
    pub accent: &'static str,
    pub palette: Palette,
    pub data: ChartData,
}

impl ChartSpec {
    pub fn new(
        kind: ChartKind,
        series_label: impl Into<String>,
        accent: &'static str,
        palette: Palette,
        window: &CalendarWindow,
    ) -> Self {
        ChartSpec {
            kind,
            series_label: series_label.into(),
            accent,
            palette,
            data: ChartData::from_window(window),
        }
    }
}
