//! Floating-point sample types accepted by the pipeline.

use rustfft::num_traits::Float;
use rustfft::FftNum;

/// Scalar sample type of images, correlation planes and displacement fields.
///
/// Implemented for `f32` and `f64`. One invocation of the pipeline uses a
/// single sample type end to end; statistics are accumulated in `f64`.
pub trait Sample: FftNum + Float + Default {
    /// Converts from `f64`, rounding to the nearest representable value.
    fn cast(value: f64) -> Self;

    /// Widens to `f64`.
    fn widen(self) -> f64;
}

impl Sample for f32 {
    #[inline]
    fn cast(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn widen(self) -> f64 {
        self as f64
    }
}

impl Sample for f64 {
    #[inline]
    fn cast(value: f64) -> Self {
        value
    }

    #[inline]
    fn widen(self) -> f64 {
        self
    }
}
