//! Chart instance lifecycle.
//!
//! At most one live chart exists per series slot. Rebuilding destroys the
//! previous instance before constructing its replacement, and teardown is
//! terminal: once a controller is torn down, every further call is a no-op.

use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::backend::ChartBackend;
use super::spec::{ChartData, ChartSpec};

/// Observable lifecycle state of one series slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartState {
    /// No chart occupies the slot (never built, or the last build failed).
    Unbuilt,
    /// A live chart instance occupies the slot.
    Built,
    /// The controller was torn down; the slot can never host a chart again.
    TornDown,
}

/// Owns every live chart handle, keyed by series slot name.
pub struct ChartLifecycleController<B: ChartBackend> {
    backend: B,
    charts: HashMap<String, B::Handle>,
    torn_down: bool,
}

impl<B: ChartBackend> ChartLifecycleController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            charts: HashMap::new(),
            torn_down: false,
        }
    }

    pub fn state(&self, series: &str) -> ChartState {
        if self.torn_down {
            ChartState::TornDown
        } else if self.charts.contains_key(series) {
            ChartState::Built
        } else {
            ChartState::Unbuilt
        }
    }

    pub fn is_live(&self, series: &str) -> bool {
        self.charts.contains_key(series)
    }

    /// Number of live chart instances across all slots.
    pub fn live_count(&self) -> usize {
        self.charts.len()
    }

    /// Destroys the slot's previous chart (if any), then constructs a new
    /// one from `spec`.
    ///
    /// On construction failure the slot is left unbuilt and the error is
    /// returned; the destroyed predecessor is not resurrected. After
    /// teardown this is a warned no-op.
    pub fn rebuild(&mut self, series: &str, surface: &B::Surface, spec: &ChartSpec) -> Result<()> {
        if self.torn_down {
            warn!(series, "Ignoring rebuild on a torn-down controller");
            return Ok(());
        }

        if let Some(previous) = self.charts.remove(series) {
            debug!(series, "Destroying chart before rebuild");
            self.backend.destroy(previous);
        }

        let handle = self
            .backend
            .construct(surface, spec)
            .with_context(|| format!("failed to construct chart for series {series}"))?;
        self.charts.insert(series.to_string(), handle);

        Ok(())
    }

    /// Pushes fresh data into the slot's live chart. A slot with no live
    /// chart (never built, build failed, or torn down) is skipped.
    pub fn update(&mut self, series: &str, data: &ChartData) -> Result<()> {
        match self.charts.get_mut(series) {
            Some(handle) => self.backend.update(handle, data),
            None => {
                debug!(series, "No live chart to update");
                Ok(())
            }
        }
    }

    /// Destroys the slot's chart if one is live. Safe to call repeatedly.
    pub fn destroy(&mut self, series: &str) {
        if let Some(handle) = self.charts.remove(series) {
            self.backend.destroy(handle);
        }
    }

    /// Destroys every live chart and marks the controller torn down.
    /// Calling again is a no-op.
    pub fn destroy_all(&mut self) {
        for (series, handle) in self.charts.drain() {
            debug!(series = %series, "Destroying chart on teardown");
            self.backend.destroy(handle);
        }
        self.torn_down = true;
    }
}

impl<B: ChartBackend> Drop for ChartLifecycleController<B> {
    fn drop(&mut self) {
        self.destroy_all();
    }
}
