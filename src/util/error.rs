//! Error types for pivcorr.

use thiserror::Error;

/// Result alias for pivcorr operations.
pub type PivResult<T> = std::result::Result<T, PivError>;

/// Errors that can occur when running the correlation pipeline.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PivError {
    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: &'static str },
    /// An argument passed at the public boundary violates a precondition.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: &'static str },
    /// Width or height is zero or overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the view requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A rectangle does not fit inside its image.
    #[error("roi {width}x{height} at ({x}, {y}) exceeds image {img_width}x{img_height}")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Two buffers that must agree in size do not.
    #[error("shape mismatch in {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        expected: usize,
        got: usize,
        context: &'static str,
    },
    /// The rayon thread pool could not be created.
    #[error("failed to build thread pool: {reason}")]
    ThreadPool { reason: String },
    /// A scheduled task panicked.
    #[error("worker panicked: {message}")]
    WorkerPanicked { message: String },
    /// At least one worker of a scheduling phase failed.
    #[error("worker for chunk {chunk} failed ({faults} fault(s) in phase): {cause}")]
    WorkerFailed {
        chunk: usize,
        faults: usize,
        #[source]
        cause: Box<PivError>,
    },
}
