//! Materializing interrogation windows into correlation-ready buffers.
//!
//! Two modes share one invariant: the window's samples minus a caller-supplied
//! mean are placed at the offsets returned by [`pad_offsets`]. Direct
//! extraction is the special case where the transform equals the window, so
//! the offsets are zero and both modes produce identical buffers.

use crate::grid::Rect;
use crate::image::{ImageView, ImageViewMut};
use crate::util::{PivError, PivResult, Sample};

/// Symmetric padding `(x, y)` of a window inside a transform buffer.
///
/// Floor division; the assembler uses the same offsets to crop, so the
/// re-centred plane lines up exactly with the window.
pub fn pad_offsets(
    transform_width: usize,
    transform_height: usize,
    window_width: usize,
    window_height: usize,
) -> (usize, usize) {
    (
        transform_width.saturating_sub(window_width) / 2,
        transform_height.saturating_sub(window_height) / 2,
    )
}

/// Transform size used for linear (zero-padded) correlation of one axis.
///
/// Twice the window, rounded up to the window's parity, so the zero-lag
/// sample lands at `window / 2` after cropping.
pub fn padded_len(window: usize) -> usize {
    2 * window + window % 2
}

/// Copies `rect` from `image` into `out`, subtracting `mean`.
///
/// `out` must have exactly the window's size.
pub fn extract_window<T: Sample>(
    image: ImageView<'_, T>,
    rect: &Rect,
    mean: T,
    out: &mut ImageViewMut<'_, T>,
) -> PivResult<()> {
    if out.width() != rect.width || out.height() != rect.height {
        return Err(PivError::ShapeMismatch {
            expected: rect.area(),
            got: out.width() * out.height(),
            context: "extract_window output",
        });
    }
    place(image, rect, mean, out, 0, 0)
}

/// Zero-fills `out` and places the mean-subtracted window at its centre.
pub fn pad_and_center<T: Sample>(
    image: ImageView<'_, T>,
    rect: &Rect,
    mean: T,
    out: &mut ImageViewMut<'_, T>,
) -> PivResult<()> {
    if out.width() < rect.width || out.height() < rect.height {
        return Err(PivError::ShapeMismatch {
            expected: rect.area(),
            got: out.width() * out.height(),
            context: "pad_and_center output",
        });
    }
    for y in 0..out.height() {
        out.row_mut_unchecked(y).fill(T::zero());
    }
    let (pad_x, pad_y) = pad_offsets(out.width(), out.height(), rect.width, rect.height);
    place(image, rect, mean, out, pad_x, pad_y)
}

fn place<T: Sample>(
    image: ImageView<'_, T>,
    rect: &Rect,
    mean: T,
    out: &mut ImageViewMut<'_, T>,
    pad_x: usize,
    pad_y: usize,
) -> PivResult<()> {
    if !image.contains(rect) {
        return Err(PivError::RoiOutOfBounds {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            img_width: image.width(),
            img_height: image.height(),
        });
    }

    for row in 0..rect.height {
        let src = &image.row_unchecked(rect.y + row)[rect.x..rect.right()];
        let dst = &mut out.row_mut_unchecked(pad_y + row)[pad_x..pad_x + rect.width];
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = s - mean;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{extract_window, pad_and_center, pad_offsets, padded_len};
    use crate::grid::Rect;
    use crate::image::{ImageView, ImageViewMut};

    fn ramp(width: usize, height: usize) -> Vec<f64> {
        (0..width * height).map(|v| v as f64).collect()
    }

    #[test]
    fn offsets_are_floor_symmetric() {
        assert_eq!(pad_offsets(64, 64, 32, 32), (16, 16));
        assert_eq!(pad_offsets(15, 14, 7, 7), (4, 3));
        assert_eq!(pad_offsets(32, 32, 32, 32), (0, 0));
        assert_eq!(padded_len(32), 64);
        assert_eq!(padded_len(7), 15);
    }

    #[test]
    fn padded_window_is_centred() {
        let data = ramp(8, 8);
        let image = ImageView::from_slice(&data, 8, 8).unwrap();
        let rect = Rect::new(2, 3, 2, 2);
        let mut buf = vec![-1.0f64; 16];
        let mut out = ImageViewMut::from_slice(&mut buf, 4, 4).unwrap();
        pad_and_center(image, &rect, 1.0, &mut out).unwrap();
        #[rustfmt::skip]
        let expected = vec![
            0.0, 0.0, 0.0, 0.0,
            0.0, 25.0, 26.0, 0.0,
            0.0, 33.0, 34.0, 0.0,
            0.0, 0.0, 0.0, 0.0,
        ];
        assert_eq!(buf, expected);
    }

    #[test]
    fn padding_matches_direct_extract_for_equal_sizes() {
        let data = ramp(16, 16);
        let image = ImageView::from_slice(&data, 16, 16).unwrap();
        let rect = Rect::new(4, 5, 6, 6);

        let mut direct = vec![0.0f64; 36];
        extract_window(
            image,
            &rect,
            3.25,
            &mut ImageViewMut::from_slice(&mut direct, 6, 6).unwrap(),
        )
        .unwrap();

        let mut padded = vec![9.0f64; 36];
        pad_and_center(
            image,
            &rect,
            3.25,
            &mut ImageViewMut::from_slice(&mut padded, 6, 6).unwrap(),
        )
        .unwrap();

        assert_eq!(direct, padded);
    }

    #[test]
    fn out_of_bounds_window_is_rejected() {
        let data = ramp(8, 8);
        let image = ImageView::from_slice(&data, 8, 8).unwrap();
        let mut buf = vec![0.0f64; 16];
        let mut out = ImageViewMut::from_slice(&mut buf, 4, 4).unwrap();
        assert!(extract_window(image, &Rect::new(6, 6, 4, 4), 0.0, &mut out).is_err());
    }
}
