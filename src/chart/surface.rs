//! Render-surface measurement.

/// Measured pixel dimensions of a render surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const ZERO: SurfaceSize = SurfaceSize {
        width: 0,
        height: 0,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A surface is laid out once both dimensions are nonzero. A surface
    /// can exist before layout has assigned it a size, in which case it
    /// measures zero in at least one dimension.
    pub fn is_laid_out(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Anything charts can be drawn onto and whose current size can be read.
///
/// Measuring must be cheap and side-effect free; the readiness gate polls
/// it repeatedly.
pub trait Surface {
    fn measure(&self) -> SurfaceSize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_laid_out_requires_both_dimensions() {
        assert!(SurfaceSize::new(800, 360).is_laid_out());
        assert!(!SurfaceSize::new(0, 360).is_laid_out());
        assert!(!SurfaceSize::new(800, 0).is_laid_out());
        assert!(!SurfaceSize::ZERO.is_laid_out());
    }
}
