//! Interrogation-window grid generation.
//!
//! A grid tiles the image extent with overlapping square windows. Windows are
//! emitted rows outer, columns inner; the position in this order is the grid
//! index shared by the correlation volume and the displacement field.
//! Trailing windows that would cross the image border are dropped.

use crate::util::{PivError, PivResult};

/// Axis-aligned window rectangle.
///
/// `(x, y)` is the left column and the first row of the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left column.
    pub x: usize,
    /// First row.
    pub y: usize,
    /// Width in samples.
    pub width: usize,
    /// Height in samples.
    pub height: usize,
}

impl Rect {
    /// Creates a rectangle from its origin and size.
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of samples covered.
    pub const fn area(&self) -> usize {
        self.width * self.height
    }

    /// One past the last row.
    pub const fn top(&self) -> usize {
        self.y + self.height
    }

    /// One past the last column.
    pub const fn right(&self) -> usize {
        self.x + self.width
    }

    /// Window centre in sample coordinates.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }
}

/// Number of window rows and columns of a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldShape {
    /// Window rows.
    pub rows: usize,
    /// Window columns.
    pub cols: usize,
}

impl FieldShape {
    /// Total number of windows.
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Returns `true` when the grid has no windows.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered window grid over one image extent.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    rects: Vec<Rect>,
    shape: FieldShape,
    window_size: usize,
    step: usize,
}

impl Grid {
    /// Windows in row-major order.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Number of windows.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Returns `true` when the grid has no windows (never for a generated grid).
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Rows and columns of the grid.
    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    /// Side length of every window.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Distance between neighbouring window origins.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Window centres `(x, y)` in grid order.
    pub fn centers(&self) -> Vec<(f64, f64)> {
        self.rects.iter().map(Rect::center).collect()
    }
}

/// Step between window origins for a window size and overlap fraction.
pub fn grid_step(window_size: usize, overlap_fraction: f64) -> usize {
    let step = (window_size as f64 * (1.0 - overlap_fraction)).round();
    (step as usize).max(1)
}

/// Number of window rows and columns that fit entirely inside the image.
pub fn field_shape(
    image_width: usize,
    image_height: usize,
    window_size: usize,
    step: usize,
) -> FieldShape {
    let count = |extent: usize| {
        if window_size == 0 || step == 0 || extent < window_size {
            0
        } else {
            (extent - window_size) / step + 1
        }
    };
    FieldShape {
        rows: count(image_height),
        cols: count(image_width),
    }
}

/// Tiles an image extent with overlapping square windows.
pub fn generate_grid(
    image_width: usize,
    image_height: usize,
    window_size: usize,
    overlap_fraction: f64,
) -> PivResult<Grid> {
    if window_size < 1 {
        return Err(PivError::InvalidConfig {
            reason: "window size must be at least 1",
        });
    }
    if !overlap_fraction.is_finite() || !(0.0..1.0).contains(&overlap_fraction) {
        return Err(PivError::InvalidConfig {
            reason: "overlap fraction must lie in [0, 1)",
        });
    }

    let step = grid_step(window_size, overlap_fraction);
    let shape = field_shape(image_width, image_height, window_size, step);
    if shape.is_empty() {
        return Err(PivError::InvalidConfig {
            reason: "window grid is empty for this image size",
        });
    }

    let mut rects = Vec::with_capacity(shape.len());
    for row in 0..shape.rows {
        for col in 0..shape.cols {
            rects.push(Rect::new(col * step, row * step, window_size, window_size));
        }
    }

    Ok(Grid {
        rects,
        shape,
        window_size,
        step,
    })
}
