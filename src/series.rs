//! Projection of raw time-series rows onto a fixed calendar window.
//!
//! Raw rows arrive keyed by whatever date encoding the backend emits:
//! plain `YYYY-MM-DD` dates or ISO-8601 datetimes with a `T` time suffix.
//! Projection normalizes the keys, then fills a contiguous run of days
//! ending on the projection date, so charts always render a full axis even
//! when the backend skips days with no activity.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// One raw time-series row: a date key and a value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoint {
    pub day: String,
    pub value: f64,
}

impl RawPoint {
    pub fn new(day: impl Into<String>, value: f64) -> Self {
        Self {
            day: day.into(),
            value,
        }
    }
}

/// One day of a projected window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowDay {
    pub date: NaiveDate,
    /// Short weekday label used on the day axis (e.g. `"Mon"`).
    pub label: String,
    pub value: f64,
}

/// A contiguous, ordered run of days ending on the projection date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalendarWindow {
    days: Vec<WindowDay>,
}

impl CalendarWindow {
    pub fn days(&self) -> &[WindowDay] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.days.iter().map(|d| d.label.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.days.iter().map(|d| d.value).collect()
    }

    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.days.iter().find(|d| d.date == date).map(|d| d.value)
    }
}

/// Normalizes one raw date key to a calendar date.
///
/// Accepts `YYYY-MM-DD` with or without a `T...` time suffix. Returns
/// `None` for keys that cannot be parsed as a date.
fn canonical_day(raw: &str) -> Option<NaiveDate> {
    let date_part = match raw.split_once('T') {
        Some((date, _)) => date,
        None => raw,
    };
    NaiveDate::parse_from_str(date_part.trim(), "%Y-%m-%d").ok()
}

/// Projects raw rows onto a window of `window_size` days ending on `today`.
///
/// Days with no matching row are filled with zero. When several rows map to
/// the same day, the last one wins. Rows with unparseable keys, or dated
/// outside the window, are dropped.
pub fn project(raw: &[RawPoint], window_size: usize, today: NaiveDate) -> CalendarWindow {
    let mut by_day: HashMap<NaiveDate, f64> = HashMap::with_capacity(raw.len());
    for point in raw {
        match canonical_day(&point.day) {
            Some(date) => {
                by_day.insert(date, point.value);
            }
            None => debug!(key = %point.day, "Dropping series row with unparseable date key"),
        }
    }

    let mut days = Vec::with_capacity(window_size);
    for offset in (0..window_size).rev() {
        let Some(date) = today.checked_sub_days(Days::new(offset as u64)) else {
            continue;
        };
        days.push(WindowDay {
            date,
            label: date.format("%a").to_string(),
            value: by_day.get(&date).copied().unwrap_or(0.0),
        });
    }

    CalendarWindow { days }
}
