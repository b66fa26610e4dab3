//! Bounded wait for surface layout.
//!
//! Surfaces can exist before layout assigns them a size, and drawing into
//! a zero-sized surface silently produces an invisible chart. Chart builds
//! therefore go through a gate that re-measures the surface a bounded
//! number of times before giving up.

use std::time::Duration;
use tracing::debug;

use super::surface::{Surface, SurfaceSize};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(60);

/// Outcome of waiting for a surface to be laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The surface reported a nonzero size.
    Ready(SurfaceSize),
    /// The attempt budget ran out before the surface was laid out.
    Abandoned { last_measured: SurfaceSize },
}

impl Readiness {
    pub fn is_ready(self) -> bool {
        matches!(self, Readiness::Ready(_))
    }
}

/// Polls a surface until it is laid out or the attempt budget runs out.
#[derive(Debug, Clone, Copy)]
pub struct LayoutReadinessGate {
    max_attempts: u32,
    retry_delay: Duration,
}

impl Default for LayoutReadinessGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

impl LayoutReadinessGate {
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts,
            retry_delay,
        }
    }

    /// Measures the surface up to `max_attempts` times, sleeping between
    /// attempts, and resolves as soon as a measurement is laid out.
    ///
    /// A zero budget abandons immediately without measuring at all.
    pub async fn await_ready<S: Surface>(&self, surface: &S) -> Readiness {
        let mut last_measured = SurfaceSize::ZERO;

        for attempt in 1..=self.max_attempts {
            let size = surface.measure();
            if size.is_laid_out() {
                if attempt > 1 {
                    debug!(
                        attempt,
                        width = size.width,
                        height = size.height,
                        "Surface became ready"
                    );
                }
                return Readiness::Ready(size);
            }
            last_measured = size;

            if attempt < self.max_attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        debug!(
            attempts = self.max_attempts,
            "Surface never reached a nonzero size, giving up"
        );
        Readiness::Abandoned { last_measured }
    }
}
