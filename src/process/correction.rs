//! Correlation-based correction of a volume.
//!
//! Multiplying a plane by the planes of overlapping neighbours keeps the
//! correlation peak they share and attenuates peaks present in only one
//! window.

use crate::grid::FieldShape;
use crate::schedule::WorkerPool;
use crate::trace::trace_span;
use crate::util::{PivError, PivResult, Sample};
use crate::volume::CorrelationVolume;

/// Multiplies every plane element-wise by its right and lower neighbour
/// planes, where those exist.
///
/// `shape` gives the grid layout of the planes (rows outer, columns inner).
pub fn correct_by_neighbors<T: Sample>(
    volume: &CorrelationVolume<T>,
    shape: FieldShape,
    threads: usize,
) -> PivResult<CorrelationVolume<T>> {
    if shape.len() != volume.num_planes() {
        return Err(PivError::ShapeMismatch {
            expected: shape.len(),
            got: volume.num_planes(),
            context: "correct_by_neighbors planes",
        });
    }
    let _span = trace_span!("correct_by_neighbors", planes = volume.num_planes()).entered();

    let stride = volume.stride_2d();
    let source = volume.as_slice();
    let plane = |idx: usize| &source[idx * stride..(idx + 1) * stride];

    let mut out = volume.clone();
    let pool = WorkerPool::new(threads)?;
    pool.run(
        out.as_mut_slice(),
        stride,
        || Ok(()),
        |_, idx, slot| {
            let (row, col) = (idx / shape.cols, idx % shape.cols);
            if col + 1 < shape.cols {
                multiply(slot, plane(idx + 1));
            }
            if row + 1 < shape.rows {
                multiply(slot, plane(idx + shape.cols));
            }
            Ok(())
        },
    )?;
    Ok(out)
}

fn multiply<T: Sample>(dst: &mut [T], src: &[T]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = *d * s;
    }
}

#[cfg(test)]
mod tests {
    use super::correct_by_neighbors;
    use crate::grid::FieldShape;
    use crate::volume::CorrelationVolume;

    #[test]
    fn planes_multiply_with_right_and_lower_neighbours() {
        // 2 x 2 grid of 1 x 2 planes.
        let data = vec![2.0f64, 1.0, 3.0, 1.0, 5.0, 1.0, 7.0, -1.0];
        let volume = CorrelationVolume::from_vec(data, 2, 1).unwrap();
        let shape = FieldShape { rows: 2, cols: 2 };
        for threads in [1, 3] {
            let corrected = correct_by_neighbors(&volume, shape, threads).unwrap();
            assert_eq!(
                corrected.as_slice(),
                &[30.0, 1.0, 21.0, -1.0, 35.0, -1.0, 7.0, -1.0]
            );
        }
    }

    #[test]
    fn shape_must_match_plane_count() {
        let volume = CorrelationVolume::from_vec(vec![0.0f32; 8], 2, 2).unwrap();
        assert!(correct_by_neighbors(&volume, FieldShape { rows: 1, cols: 3 }, 1).is_err());
    }
}
