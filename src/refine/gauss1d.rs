//! Three-point Gaussian fitting.

use crate::refine::quad1d::parabolic_offset;

/// Estimates the sub-sample peak offset of a Gaussian through three samples.
///
/// Equivalent to a parabolic fit on `ln(f)`, which is exact for a sampled
/// Gaussian. Returns `None` unless all three samples are strictly positive.
pub fn gaussian_offset(fm: f64, f0: f64, fp: f64) -> Option<f64> {
    if !(fm > 0.0 && f0 > 0.0 && fp > 0.0) {
        return None;
    }
    parabolic_offset(fm.ln(), f0.ln(), fp.ln())
}
