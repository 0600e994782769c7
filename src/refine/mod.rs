//! Sub-pixel peak estimation.

pub(crate) mod gauss1d;
pub(crate) mod quad1d;
pub(crate) mod subpixel;
