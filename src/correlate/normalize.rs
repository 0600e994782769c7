//! Normalization of raw correlation planes.
//!
//! Planes are normalized after cropping to the window size. For zero-padded
//! correlation the number of overlapping samples falls off linearly with the
//! lag; [`BiasCorrection`] holds that count per lag so every stored sample is a
//! per-overlap average.

use crate::correlate::Correlator;
use crate::grid::Rect;
use crate::image::{ImageView, ImageViewMut};
use crate::util::{PivError, PivResult, Sample};
use crate::volume::assemble_plane;
use crate::window::pad_and_center;

/// How a raw correlation plane is scaled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Normalization {
    /// Standard cross-correlation; left as computed.
    Plain,
    /// Divided by `std(A) * std(B)` and the overlap count.
    Normalized,
    /// Auto-correlation divided by `std(A)^2` and the overlap count.
    Auto,
}

/// Overlap counts of a zero-padded window, cropped to the window size.
///
/// Computed as the auto-correlation of a window-sized block of ones placed in
/// a zero transform buffer, exactly like the data windows.
#[derive(Clone, Debug)]
pub struct BiasCorrection<T> {
    plane: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Sample> BiasCorrection<T> {
    /// Builds the correction plane for a window inside a transform buffer.
    pub fn new(
        window_width: usize,
        window_height: usize,
        transform_width: usize,
        transform_height: usize,
    ) -> PivResult<Self> {
        if transform_width < window_width || transform_height < window_height {
            return Err(PivError::InvalidConfig {
                reason: "transform size must not be smaller than the window",
            });
        }
        let ones = vec![T::one(); window_width * window_height];
        let ones_view = ImageView::from_slice(&ones, window_width, window_height)?;
        let window = Rect::new(0, 0, window_width, window_height);

        let transform_len = transform_width * transform_height;
        let mut padded = vec![T::zero(); transform_len];
        pad_and_center(
            ones_view,
            &window,
            T::zero(),
            &mut ImageViewMut::from_slice(&mut padded, transform_width, transform_height)?,
        )?;

        let mut correlator = Correlator::new(transform_width, transform_height)?;
        let mut full = vec![T::zero(); transform_len];
        correlator.auto_correlate(
            ImageView::from_slice(&padded, transform_width, transform_height)?,
            &mut ImageViewMut::from_slice(&mut full, transform_width, transform_height)?,
        )?;

        let mut plane = vec![T::zero(); window_width * window_height];
        assemble_plane(
            ImageView::from_slice(&full, transform_width, transform_height)?,
            window_width,
            window_height,
            &mut plane,
        )?;

        Ok(Self {
            plane,
            width: window_width,
            height: window_height,
        })
    }

    /// Width of the cropped plane.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the cropped plane.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Overlap counts in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.plane
    }
}

/// Scale factors for one window pair.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlaneScale {
    pub(crate) mode: Normalization,
    pub(crate) std_a: f64,
    pub(crate) std_b: f64,
    pub(crate) area: usize,
}

/// Normalizes a cropped plane in place.
///
/// Zero-variance windows are not treated specially: the division yields
/// non-finite samples, which downstream stages report as failed windows.
pub(crate) fn normalize_plane<T: Sample>(
    plane: &mut [T],
    scale: PlaneScale,
    bias: Option<&BiasCorrection<T>>,
) -> PivResult<()> {
    let std_product = match scale.mode {
        Normalization::Plain => return Ok(()),
        Normalization::Normalized => scale.std_a * scale.std_b,
        Normalization::Auto => scale.std_a * scale.std_a,
    };

    match bias {
        Some(bias) => {
            if bias.plane.len() != plane.len() {
                return Err(PivError::ShapeMismatch {
                    expected: bias.plane.len(),
                    got: plane.len(),
                    context: "bias correction plane",
                });
            }
            let denom = T::cast(std_product);
            for (value, &count) in plane.iter_mut().zip(&bias.plane) {
                *value = *value / count / denom;
            }
        }
        None => {
            let denom = T::cast(std_product * scale.area as f64);
            for value in plane.iter_mut() {
                *value = *value / denom;
            }
        }
    }
    Ok(())
}
