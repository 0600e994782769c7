//! Peak finding on correlation planes.
//!
//! A sample is a candidate when it is strictly greater than its 4 or 8
//! neighbours and at least `radius` samples from every edge, so its whole
//! neighbourhood lies inside the plane. Candidates are then pruned by
//! non-maximum suppression.

pub(crate) mod nms;
pub(crate) mod peak;

use crate::config::Connectivity;
use crate::image::ImageView;
use crate::util::Sample;

pub use peak::{Candidate, Peak};

/// Planes at least this large in both dimensions honour `limit_search`.
pub const LIMIT_SEARCH_MIN_SIZE: usize = 12;

/// Parameters of one peak search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeakSearch {
    /// Maximum number of peaks returned.
    pub count: usize,
    /// Suppression radius and neighbourhood half-size.
    pub radius: usize,
    /// Local-maximum neighbourhood.
    pub connectivity: Connectivity,
    /// Restrict candidates to the central half of large planes.
    pub limit_search: bool,
}

/// Finds up to `search.count` peaks in descending order of value.
///
/// Returning fewer peaks than requested is not an error.
pub fn find_peaks<T: Sample>(plane: ImageView<'_, T>, search: &PeakSearch) -> Vec<Peak<T>> {
    let mut candidates = local_maxima(plane, search);
    nms::nms_2d(&mut candidates, search.radius, search.count)
        .into_iter()
        .map(|candidate| Peak::extract(plane, candidate, search.radius))
        .collect()
}

/// Half-open column and row ranges where candidates may sit.
///
/// The limited region keeps lags within a quarter of the plane of zero lag:
/// `[n/2 - n/4, n/2 + n/4)` per axis.
fn search_region(
    width: usize,
    height: usize,
    search: &PeakSearch,
) -> (usize, usize, usize, usize) {
    let margin = search.radius.max(1);
    let (mut x0, mut x1) = (margin, width.saturating_sub(margin));
    let (mut y0, mut y1) = (margin, height.saturating_sub(margin));
    if search.limit_search && width >= LIMIT_SEARCH_MIN_SIZE && height >= LIMIT_SEARCH_MIN_SIZE {
        x0 = x0.max(width / 2 - width / 4);
        x1 = x1.min(width / 2 + width / 4);
        y0 = y0.max(height / 2 - height / 4);
        y1 = y1.min(height / 2 + height / 4);
    }
    (x0, x1, y0, y1)
}

fn local_maxima<T: Sample>(plane: ImageView<'_, T>, search: &PeakSearch) -> Vec<Candidate<T>> {
    let (x0, x1, y0, y1) = search_region(plane.width(), plane.height(), search);
    let mut out = Vec::new();
    for y in y0..y1 {
        let above = plane.row_unchecked(y - 1);
        let row = plane.row_unchecked(y);
        let below = plane.row_unchecked(y + 1);
        for x in x0..x1 {
            let v = row[x];
            let mut is_max = v > row[x - 1] && v > row[x + 1] && v > above[x] && v > below[x];
            if is_max && search.connectivity == Connectivity::Eight {
                is_max = v > above[x - 1]
                    && v > above[x + 1]
                    && v > below[x - 1]
                    && v > below[x + 1];
            }
            if is_max {
                out.push(Candidate { x, y, value: v });
            }
        }
    }
    out
}
