//! pivcorr computes particle image velocimetry displacement fields by
//! frequency-domain cross-correlation.
//!
//! Two images are tiled into overlapping interrogation windows. Every window
//! pair is correlated with FFTs (circular or zero-padded, standard or
//! normalized), the planes are collected in a [`CorrelationVolume`], and the
//! strongest peaks of each plane are refined to sub-pixel displacements in a
//! [`DisplacementField`]. Both phases run on a fixed-size worker pool.
//!
//! ```no_run
//! use pivcorr::{process_image_pair, CorrelationConfig, ImageView, PeakConfig};
//!
//! # fn run(a: &[f32], b: &[f32]) -> pivcorr::PivResult<()> {
//! let frame_a = ImageView::from_slice(a, 256, 256)?;
//! let frame_b = ImageView::from_slice(b, 256, 256)?;
//! let result = process_image_pair(
//!     frame_a,
//!     frame_b,
//!     &CorrelationConfig::default(),
//!     &PeakConfig::default(),
//! )?;
//! println!("{} invalid windows", result.field().invalid_count());
//! # Ok(())
//! # }
//! ```

mod candidate;
pub mod config;
pub mod correlate;
pub mod field;
pub mod grid;
pub mod image;
pub mod lowlevel;
pub mod process;
mod refine;
pub mod schedule;
mod trace;
pub mod util;
pub mod volume;
pub mod window;

pub use config::{
    Connectivity, CorrelationConfig, CorrelationMethod, PaddingMode, PeakConfig, SubpixelMethod,
};
pub use field::{Channel, DisplacementField};
pub use grid::{field_shape, generate_grid, FieldShape, Grid, Rect};
pub use image::{ImageView, ImageViewMut, OwnedImage};
pub use process::{
    autocorrelate_grid, correct_by_neighbors, correlate_grid, extract_displacements,
    process_image_pair, VectorField,
};
pub use util::{PivError, PivResult, Sample};
pub use volume::CorrelationVolume;
