//! Dashboard presentation settings, polled from a local JSON file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::chart::SurfaceSize;
use crate::signals::SignalSource;
use crate::theme::ThemeMode;

/// Presentation settings, stored as a plain JSON object on disk:
/// ```json
/// {
///   "theme": "dark",
///   "width": 800,
///   "height": 360
/// }
/// ```
/// Missing fields fall back to defaults, so a file containing only a
/// theme flag is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub theme: String,
    pub width: u32,
    pub height: u32,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            theme: String::new(),
            width: 800,
            height: 360,
        }
    }
}

impl DashboardSettings {
    /// Loads the settings from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse settings file {}", path.display()))?;
        Ok(settings)
    }

    pub fn theme_mode(&self) -> ThemeMode {
        ThemeMode::from_flag(&self.theme)
    }

    pub fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }
}

/// Polls the settings file and republishes changes as environment
/// signals.
pub struct SettingsWatcher {
    path: PathBuf,
    poll_every: Duration,
    theme: SignalSource<ThemeMode>,
    viewport: SignalSource<SurfaceSize>,
}

impl SettingsWatcher {
    pub fn new(
        path: impl Into<PathBuf>,
        poll_every: Duration,
        initial: &DashboardSettings,
    ) -> Self {
        Self {
            path: path.into(),
            poll_every,
            theme: SignalSource::new(initial.theme_mode()),
            viewport: SignalSource::new(initial.surface_size()),
        }
    }

    pub fn theme_signal(&self) -> &SignalSource<ThemeMode> {
        &self.theme
    }

    pub fn viewport_signal(&self) -> &SignalSource<SurfaceSize> {
        &self.viewport
    }

    /// Polls until dropped. An unreadable or invalid file keeps the last
    /// published state rather than flapping the dashboard.
    pub async fn run(self) {
        info!(path = %self.path.display(), "Watching settings file");

        loop {
            tokio::time::sleep(self.poll_every).await;

            match DashboardSettings::load(&self.path) {
                Ok(settings) => {
                    // theme dedup is reactor-side; the viewport signal
                    // treats every publish as a resize, so only real
                    // size changes go out
                    self.theme.publish(settings.theme_mode());
                    let size = settings.surface_size();
                    if size != self.viewport.current() {
                        self.viewport.publish(size);
                    }
                }
                Err(e) => debug!(error = %e, "Settings file unavailable, keeping last state"),
            }
        }
    }
}
