//! Window statistics shared by the correlation and normalization stages.

use crate::grid::Rect;
use crate::image::ImageView;
use crate::util::Sample;

/// Mean and population standard deviation of a window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct WindowStats {
    pub(crate) mean: f64,
    pub(crate) std: f64,
}

/// Computes mean and standard deviation over `rect`, accumulating in `f64`.
///
/// The rectangle must lie inside the view; callers validate the grid first.
/// A flat window yields `std == 0.0`.
pub(crate) fn window_stats<T: Sample>(image: ImageView<'_, T>, rect: &Rect) -> WindowStats {
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for y in rect.y..rect.top() {
        let row = &image.row_unchecked(y)[rect.x..rect.right()];
        for &value in row {
            let v = value.widen();
            sum += v;
            sum_sq += v * v;
        }
    }

    let count = rect.area() as f64;
    let mean = sum / count;
    let variance = (sum_sq / count - mean * mean).max(0.0);
    WindowStats {
        mean,
        std: variance.sqrt(),
    }
}

/// Mean over `rect` only.
pub(crate) fn window_mean<T: Sample>(image: ImageView<'_, T>, rect: &Rect) -> f64 {
    let mut sum = 0.0f64;
    for y in rect.y..rect.top() {
        for &value in &image.row_unchecked(y)[rect.x..rect.right()] {
            sum += value.widen();
        }
    }
    sum / rect.area() as f64
}
