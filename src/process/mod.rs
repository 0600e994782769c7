//! Phase drivers.
//!
//! A run has two scheduling points: the correlation phase fills a
//! [`CorrelationVolume`](crate::volume::CorrelationVolume), then the
//! peak-extraction phase turns it into a
//! [`DisplacementField`]. Each phase validates its inputs before any worker
//! starts.

mod correction;
mod correlation;
mod displacement;

pub use correction::correct_by_neighbors;
pub use correlation::{autocorrelate_grid, correlate_grid};
pub use displacement::extract_displacements;

use crate::config::{CorrelationConfig, PeakConfig};
use crate::field::DisplacementField;
use crate::grid::{generate_grid, FieldShape, Grid};
use crate::image::ImageView;
use crate::util::{PivResult, Sample};

/// Displacement field together with the grid it was measured on.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorField<T> {
    grid: Grid,
    field: DisplacementField<T>,
}

impl<T: Sample> VectorField<T> {
    /// Window grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Per-window results.
    pub fn field(&self) -> &DisplacementField<T> {
        &self.field
    }

    /// Rows and columns of the field.
    pub fn shape(&self) -> FieldShape {
        self.grid.shape()
    }

    /// Window centres `(x, y)` in grid order.
    pub fn centers(&self) -> Vec<(f64, f64)> {
        self.grid.centers()
    }

    /// Splits into grid and field.
    pub fn into_parts(self) -> (Grid, DisplacementField<T>) {
        (self.grid, self.field)
    }
}

/// Runs both phases on one image pair.
pub fn process_image_pair<T: Sample>(
    image_a: ImageView<'_, T>,
    image_b: ImageView<'_, T>,
    correlation: &CorrelationConfig,
    peaks: &PeakConfig,
) -> PivResult<VectorField<T>> {
    correlation.validate()?;
    peaks.validate_for_plane(correlation.window_size, correlation.window_size)?;
    correlation::check_extents(image_a, image_b)?;
    let grid = generate_grid(
        image_a.width(),
        image_a.height(),
        correlation.window_size,
        correlation.overlap,
    )?;
    let volume = correlation::correlate_on_grid(image_a, image_b, &grid, correlation)?;
    let field = extract_displacements(&volume, peaks)?;
    Ok(VectorField { grid, field })
}
