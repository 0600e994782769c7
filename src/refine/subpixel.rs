//! Separable 2D sub-pixel refinement.

use crate::candidate::Peak;
use crate::config::SubpixelMethod;
use crate::refine::gauss1d::gaussian_offset;
use crate::refine::quad1d::parabolic_offset;
use crate::util::Sample;

/// Offset of the three-point fit, with the fallback chain
/// Gaussian -> parabolic -> zero.
pub fn fit_offset(method: SubpixelMethod, fm: f64, f0: f64, fp: f64) -> f64 {
    let gaussian = match method {
        SubpixelMethod::Gaussian => gaussian_offset(fm, f0, fp),
        SubpixelMethod::Parabolic => None,
    };
    gaussian
        .or_else(|| parabolic_offset(fm, f0, fp))
        .unwrap_or(0.0)
}

/// Refines a peak using independent fits along its centre row and column.
///
/// Only the immediate neighbours of the peak enter the fit, whatever the
/// neighbourhood radius. Returns plane coordinates `(x + dx, y + dy)`.
pub fn refine_peak<T: Sample>(peak: &Peak<T>, method: SubpixelMethod) -> (f64, f64) {
    let sample = |dx: isize, dy: isize| peak.at(dx, dy).map_or(f64::NAN, Sample::widen);
    let center = peak.value.widen();
    let dx = fit_offset(method, sample(-1, 0), center, sample(1, 0));
    let dy = fit_offset(method, sample(0, -1), center, sample(0, 1));
    (peak.x as f64 + dx, peak.y as f64 + dy)
}

#[cfg(test)]
mod tests {
    use super::{fit_offset, refine_peak};
    use crate::candidate::{find_peaks, PeakSearch};
    use crate::config::{Connectivity, SubpixelMethod};
    use crate::image::ImageView;

    #[test]
    fn separable_gaussian_is_recovered() {
        let (cx, cy) = (4.3f64, 3.8f64);
        let data: Vec<f64> = (0..64)
            .map(|i| {
                let (x, y) = ((i % 8) as f64, (i / 8) as f64);
                (-((x - cx).powi(2) + (y - cy).powi(2)) / 2.0).exp()
            })
            .collect();
        let plane = ImageView::from_slice(&data, 8, 8).unwrap();
        let search = PeakSearch {
            count: 1,
            radius: 1,
            connectivity: Connectivity::Four,
            limit_search: false,
        };
        let peak = &find_peaks(plane, &search)[0];
        assert_eq!((peak.x, peak.y), (4, 4));

        let (x, y) = refine_peak(peak, SubpixelMethod::Gaussian);
        assert!((x - cx).abs() < 1e-9);
        assert!((y - cy).abs() < 1e-9);

        let (xp, yp) = refine_peak(peak, SubpixelMethod::Parabolic);
        assert!((xp - cx).abs() < 0.1);
        assert!((yp - cy).abs() < 0.1);
    }

    #[test]
    fn fallback_chain() {
        // Negative neighbour: Gaussian impossible, parabola is concave.
        let parabolic = fit_offset(SubpixelMethod::Gaussian, -0.2, 1.0, 0.4);
        assert!((parabolic - fit_offset(SubpixelMethod::Parabolic, -0.2, 1.0, 0.4)).abs() < 1e-15);
        assert!(parabolic > 0.0);
        // Convex: no fit at all.
        assert_eq!(fit_offset(SubpixelMethod::Gaussian, 2.0, 1.0, 2.0), 0.0);
    }
}
