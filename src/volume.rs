//! Correlation volume: one correlation plane per grid window.

use crate::image::ImageView;
use crate::util::{PivError, PivResult};
use crate::window::pad_offsets;

/// Flat buffer of correlation planes, logically `[plane][row][col]`.
///
/// Planes are stored in grid order; `as_slice().len() == num_planes() *
/// stride_2d()` always holds.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationVolume<T> {
    data: Vec<T>,
    plane_width: usize,
    plane_height: usize,
}

impl<T> CorrelationVolume<T> {
    /// Wraps a flat buffer whose length is a multiple of the plane size.
    pub fn from_vec(data: Vec<T>, plane_width: usize, plane_height: usize) -> PivResult<Self> {
        let stride = plane_width
            .checked_mul(plane_height)
            .filter(|&len| len > 0)
            .ok_or(PivError::InvalidDimensions {
                width: plane_width,
                height: plane_height,
            })?;
        if data.is_empty() || data.len() % stride != 0 {
            return Err(PivError::InvalidArgument {
                reason: "volume length must be a non-zero multiple of the plane size",
            });
        }
        Ok(Self {
            data,
            plane_width,
            plane_height,
        })
    }

    /// Allocates `num_planes` planes filled with `value`.
    pub(crate) fn filled(
        num_planes: usize,
        plane_width: usize,
        plane_height: usize,
        value: T,
    ) -> PivResult<Self>
    where
        T: Clone,
    {
        let len = num_planes
            .checked_mul(plane_width)
            .and_then(|v| v.checked_mul(plane_height))
            .ok_or(PivError::InvalidDimensions {
                width: plane_width,
                height: plane_height,
            })?;
        Self::from_vec(vec![value; len], plane_width, plane_height)
    }

    /// Plane width in samples.
    pub fn plane_width(&self) -> usize {
        self.plane_width
    }

    /// Plane height in samples.
    pub fn plane_height(&self) -> usize {
        self.plane_height
    }

    /// Number of samples per plane.
    pub fn stride_2d(&self) -> usize {
        self.plane_width * self.plane_height
    }

    /// Number of planes.
    pub fn num_planes(&self) -> usize {
        self.data.len() / self.stride_2d()
    }

    /// Flat samples.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the volume and returns its buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Returns a view of plane `index`.
    pub fn plane(&self, index: usize) -> Option<ImageView<'_, T>> {
        let stride = self.stride_2d();
        let start = index.checked_mul(stride)?;
        let data = self.data.get(start..start.checked_add(stride)?)?;
        ImageView::from_slice(data, self.plane_width, self.plane_height).ok()
    }
}

/// Copies the central `window_width x window_height` region of a
/// transform-sized plane into `slot`.
///
/// Uses the same offsets as [`crate::window::pad_and_center`]; a plane of the
/// window's own size is copied unchanged.
pub fn assemble_plane<T: Copy>(
    plane: ImageView<'_, T>,
    window_width: usize,
    window_height: usize,
    slot: &mut [T],
) -> PivResult<()> {
    if plane.width() < window_width || plane.height() < window_height {
        return Err(PivError::ShapeMismatch {
            expected: window_width * window_height,
            got: plane.width() * plane.height(),
            context: "assemble_plane source",
        });
    }
    if slot.len() != window_width * window_height {
        return Err(PivError::ShapeMismatch {
            expected: window_width * window_height,
            got: slot.len(),
            context: "assemble_plane slot",
        });
    }

    let (pad_x, pad_y) = pad_offsets(plane.width(), plane.height(), window_width, window_height);
    for (row, dst) in slot.chunks_exact_mut(window_width).enumerate() {
        let src = plane.row_unchecked(pad_y + row);
        dst.copy_from_slice(&src[pad_x..pad_x + window_width]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{assemble_plane, CorrelationVolume};
    use crate::image::ImageView;
    use crate::util::PivError;

    #[test]
    fn crop_takes_the_centre() {
        let data: Vec<f32> = (0..36).map(|v| v as f32).collect();
        let plane = ImageView::from_slice(&data, 6, 6).unwrap();
        let mut slot = vec![0.0f32; 4];
        assemble_plane(plane, 2, 2, &mut slot).unwrap();
        assert_eq!(slot, vec![14.0, 15.0, 20.0, 21.0]);
    }

    #[test]
    fn volume_exposes_planes_in_order() {
        let volume = CorrelationVolume::from_vec((0..12).collect::<Vec<u32>>(), 2, 3).unwrap();
        assert_eq!(volume.stride_2d(), 6);
        assert_eq!(volume.num_planes(), 2);
        assert_eq!(volume.plane(1).unwrap().row(0).unwrap(), &[6, 7]);
        assert!(volume.plane(2).is_none());
    }

    #[test]
    fn volume_rejects_partial_planes() {
        let err = CorrelationVolume::from_vec(vec![0.0f64; 10], 2, 3).unwrap_err();
        assert!(matches!(err, PivError::InvalidArgument { .. }));
        assert!(CorrelationVolume::from_vec(vec![0.0f64; 6], 0, 3).is_err());
    }
}
