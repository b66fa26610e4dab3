//! Resilient chart rendering: construction specs, surface readiness, and
//! instance lifecycle.

pub mod backend;
pub mod lifecycle;
pub mod readiness;
pub mod spec;
pub mod surface;

pub use backend::ChartBackend;
pub use lifecycle::{ChartLifecycleController, ChartState};
pub use readiness::{LayoutReadinessGate, Readiness};
pub use spec::{ChartData, ChartKind, ChartSpec};
pub use surface::{Surface, SurfaceSize};
