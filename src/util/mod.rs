//! Shared utility helpers.

pub mod error;
pub(crate) mod math;
pub mod sample;

pub use error::{PivError, PivResult};
pub use sample::Sample;
