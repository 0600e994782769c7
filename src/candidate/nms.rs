//! Non-maximum suppression of peak candidates.

use crate::candidate::peak::{sort_candidates_desc, Candidate};
use crate::util::Sample;

/// Applies 2D non-maximum suppression using Chebyshev distance.
///
/// Candidates are sorted by descending value and kept if they are farther
/// than `radius` in Chebyshev distance from all previously kept candidates.
/// Selection stops once `limit` candidates are kept.
pub fn nms_2d<T: Sample>(
    candidates: &mut [Candidate<T>],
    radius: usize,
    limit: usize,
) -> Vec<Candidate<T>> {
    sort_candidates_desc(candidates);
    let mut kept: Vec<Candidate<T>> = Vec::with_capacity(limit.min(candidates.len()));

    'outer: for candidate in candidates.iter().copied() {
        if kept.len() == limit {
            break;
        }
        for kept_peak in kept.iter() {
            let dx = candidate.x.abs_diff(kept_peak.x);
            let dy = candidate.y.abs_diff(kept_peak.y);
            if dx.max(dy) <= radius {
                continue 'outer;
            }
        }
        kept.push(candidate);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::nms_2d;
    use crate::candidate::peak::Candidate;

    fn c(x: usize, y: usize, value: f64) -> Candidate<f64> {
        Candidate { x, y, value }
    }

    #[test]
    fn suppresses_within_radius() {
        let mut cands = vec![
            c(5, 5, 0.8),
            c(6, 6, 0.9),
            c(9, 5, 0.7),
            c(5, 7, 0.65),
            c(5, 9, 0.6),
        ];
        let kept = nms_2d(&mut cands, 1, 10);
        assert_eq!(kept, vec![c(6, 6, 0.9), c(9, 5, 0.7), c(5, 9, 0.6)]);
    }

    #[test]
    fn limit_caps_the_result() {
        let mut cands = vec![c(1, 1, 1.0), c(10, 10, 3.0), c(20, 20, 2.0)];
        let kept = nms_2d(&mut cands, 2, 2);
        assert_eq!(kept, vec![c(10, 10, 3.0), c(20, 20, 2.0)]);
    }

    #[test]
    fn ties_break_on_row_then_column() {
        let mut cands = vec![c(8, 3, 1.0), c(2, 3, 1.0), c(0, 9, 1.0)];
        let kept = nms_2d(&mut cands, 1, 3);
        assert_eq!(kept, vec![c(2, 3, 1.0), c(8, 3, 1.0), c(0, 9, 1.0)]);
    }
}
