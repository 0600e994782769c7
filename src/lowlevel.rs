//! Low-level building blocks for custom correlation pipelines.
//!
//! These expose the per-window stages that the phase drivers compose: window
//! materialization, the FFT correlator, normalization, plane assembly, peak
//! finding and sub-pixel fitting. Most users should prefer
//! [`process_image_pair`](crate::process_image_pair) or the two phase
//! functions.

pub use crate::candidate::nms::nms_2d;
pub use crate::candidate::{find_peaks, Candidate, Peak, PeakSearch};
pub use crate::correlate::normalize::{BiasCorrection, Normalization};
pub use crate::correlate::Correlator;
pub use crate::refine::gauss1d::gaussian_offset;
pub use crate::refine::quad1d::parabolic_offset;
pub use crate::refine::subpixel::{fit_offset, refine_peak};
pub use crate::schedule::{chunk_ranges, resolve_thread_count, WorkerPool};
pub use crate::volume::assemble_plane;
pub use crate::window::{extract_window, pad_and_center, pad_offsets, padded_len};
