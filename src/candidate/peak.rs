//! Correlation peak types.

use crate::image::ImageView;
use crate::util::Sample;
use std::cmp::Ordering;

/// Local maximum of a correlation plane before suppression.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate<T> {
    /// Column within the plane.
    pub x: usize,
    /// Row within the plane.
    pub y: usize,
    /// Correlation value.
    pub value: T,
}

fn candidate_cmp_desc<T: Sample>(a: &Candidate<T>, b: &Candidate<T>) -> Ordering {
    b.value
        .widen()
        .total_cmp(&a.value.widen())
        .then_with(|| a.y.cmp(&b.y))
        .then_with(|| a.x.cmp(&b.x))
}

/// Sorts candidates by descending value with deterministic tie-breaking.
pub(crate) fn sort_candidates_desc<T: Sample>(candidates: &mut [Candidate<T>]) {
    candidates.sort_by(candidate_cmp_desc);
}

/// Selected peak with its `(2r + 1) x (2r + 1)` neighbourhood.
#[derive(Clone, Debug, PartialEq)]
pub struct Peak<T> {
    /// Column within the plane.
    pub x: usize,
    /// Row within the plane.
    pub y: usize,
    /// Correlation value at `(x, y)`.
    pub value: T,
    radius: usize,
    neighborhood: Vec<T>,
}

impl<T: Sample> Peak<T> {
    /// Copies the neighbourhood of `candidate` out of `plane`.
    ///
    /// The candidate must be at least `radius` samples from every edge.
    pub(crate) fn extract(plane: ImageView<'_, T>, candidate: Candidate<T>, radius: usize) -> Self {
        let side = 2 * radius + 1;
        let mut neighborhood = Vec::with_capacity(side * side);
        for y in candidate.y - radius..=candidate.y + radius {
            let row = plane.row_unchecked(y);
            neighborhood.extend_from_slice(&row[candidate.x - radius..=candidate.x + radius]);
        }
        Self {
            x: candidate.x,
            y: candidate.y,
            value: candidate.value,
            radius,
            neighborhood,
        }
    }

    /// Half-size of the neighbourhood.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Neighbourhood samples in row-major order.
    pub fn neighborhood(&self) -> &[T] {
        &self.neighborhood
    }

    /// Sample at offset `(dx, dy)` from the peak, if inside the neighbourhood.
    pub fn at(&self, dx: isize, dy: isize) -> Option<T> {
        let r = self.radius as isize;
        if dx.abs() > r || dy.abs() > r {
            return None;
        }
        let side = 2 * r + 1;
        let idx = (dy + r) * side + (dx + r);
        self.neighborhood.get(idx as usize).copied()
    }
}
