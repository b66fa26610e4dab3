//! Chart engine abstraction.

use anyhow::Result;

use super::spec::{ChartData, ChartSpec};
use super::surface::Surface;

/// A chart engine that can construct, update, and destroy chart instances.
///
/// Handles are owned values: destroying consumes the handle, so a
/// destroyed chart cannot be updated or destroyed again through safe code.
pub trait ChartBackend {
    type Surface: Surface;
    type Handle;

    /// Draws a new chart onto the surface and returns its handle. The
    /// lifecycle controller guarantees any previous chart on the same slot
    /// was destroyed first.
    fn construct(&mut self, surface: &Self::Surface, spec: &ChartSpec) -> Result<Self::Handle>;

    /// Pushes fresh data into a live chart.
    fn update(&mut self, handle: &mut Self::Handle, data: &ChartData) -> Result<()>;

    /// Releases a chart instance. Infallible so teardown can never wedge.
    fn destroy(&mut self, handle: Self::Handle);
}
