//! Stride-aware views over flat sample buffers.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are zero-copy
//! views into the same backing slice and retain the original stride.
//!
//! The same views are used for input images, transform-sized window buffers
//! and correlation planes, so no component indexes a flat buffer by hand.

use crate::grid::Rect;
use crate::util::{PivError, PivResult};

mod owned;

pub use owned::OwnedImage;

/// Borrowed 2D view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> PivResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> PivResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(PivError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in samples.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Row access for indices already validated by the caller.
    #[inline]
    pub(crate) fn row_unchecked(&self, y: usize) -> &'a [T] {
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    /// Returns `true` when `rect` lies entirely inside the view.
    pub fn contains(&self, rect: &Rect) -> bool {
        rect.width > 0
            && rect.height > 0
            && rect.right() <= self.width
            && rect.top() <= self.height
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(&self, rect: &Rect) -> PivResult<ImageView<'a, T>> {
        if rect.width == 0 || rect.height == 0 {
            return Err(PivError::InvalidDimensions {
                width: rect.width,
                height: rect.height,
            });
        }
        if !self.contains(rect) {
            return Err(PivError::RoiOutOfBounds {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                img_width: self.width,
                img_height: self.height,
            });
        }

        let start = rect.y * self.stride + rect.x;
        let data = self.data.get(start..).ok_or(PivError::BufferTooSmall {
            needed: start.saturating_add(1),
            got: self.data.len(),
        })?;
        ImageView::new(data, rect.width, rect.height, self.stride)
    }
}

/// Mutable 2D view with an explicit stride.
#[derive(Debug)]
pub struct ImageViewMut<'a, T> {
    data: &'a mut [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageViewMut<'a, T> {
    /// Creates a contiguous mutable view with `stride == width`.
    pub fn from_slice(data: &'a mut [T], width: usize, height: usize) -> PivResult<Self> {
        let needed = required_len(width, height, width)?;
        if data.len() < needed {
            return Err(PivError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride: width,
        })
    }

    /// Returns the width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in samples.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns a mutable slice for row `y` with length `width`.
    pub fn row_mut(&mut self, y: usize) -> Option<&mut [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get_mut(start..end)
    }

    #[inline]
    pub(crate) fn row_mut_unchecked(&mut self, y: usize) -> &mut [T] {
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }

    /// Reborrows as an immutable view.
    pub fn as_view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &*self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> PivResult<usize> {
    if width == 0 || height == 0 {
        return Err(PivError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(PivError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(PivError::InvalidDimensions { width, height })?;
    Ok(needed)
}
