//! Configuration of the correlation and peak-extraction phases.

use crate::util::{PivError, PivResult};

/// Boundary handling of the frequency-domain correlation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PaddingMode {
    /// Transform size equals the window size; lags wrap around.
    #[default]
    Circular,
    /// Windows are zero-padded to twice their size and bias corrected.
    Linear,
}

/// Correlation statistic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CorrelationMethod {
    /// Standard (unnormalized) cross-correlation.
    Standard,
    /// Normalized cross-correlation.
    #[default]
    Normalized,
}

/// Three-point sub-pixel estimator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SubpixelMethod {
    /// Fit a Gaussian through the logarithms of the samples.
    #[default]
    Gaussian,
    /// Fit a parabola through the samples.
    Parabolic,
}

/// Neighbourhood used for the local-maximum test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Connectivity {
    /// Left, right, up and down.
    #[default]
    Four,
    /// Also the diagonals.
    Eight,
}

/// Parameters of the correlation phase.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CorrelationConfig {
    /// Side length of the square interrogation window.
    pub window_size: usize,
    /// Fraction of the window shared by neighbouring windows, in `(0, 1)`.
    pub overlap: f64,
    /// Circular or zero-padded correlation.
    pub padding: PaddingMode,
    /// Standard or normalized correlation.
    pub method: CorrelationMethod,
    /// Worker threads; `0` selects all cores but one.
    pub threads: usize,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            window_size: 32,
            overlap: 0.5,
            padding: PaddingMode::Circular,
            method: CorrelationMethod::Normalized,
            threads: 0,
        }
    }
}

impl CorrelationConfig {
    /// Checks the window size and overlap.
    pub fn validate(&self) -> PivResult<()> {
        if self.window_size == 0 {
            return Err(PivError::InvalidArgument {
                reason: "window_size must be at least 1",
            });
        }
        if !self.overlap.is_finite() || self.overlap <= 0.0 || self.overlap >= 1.0 {
            return Err(PivError::InvalidArgument {
                reason: "overlap must lie strictly between 0 and 1",
            });
        }
        Ok(())
    }
}

/// Parameters of the peak-extraction phase.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PeakConfig {
    /// Number of peaks reported per window (1 to 3).
    pub num_peaks: usize,
    /// Suppression radius and half-size of the fitted neighbourhood.
    pub peak_radius: usize,
    /// Restrict the search to the central half of planes at least 12 wide and high.
    pub limit_search: bool,
    /// Sub-pixel estimator.
    pub subpixel: SubpixelMethod,
    /// Local-maximum neighbourhood.
    pub connectivity: Connectivity,
    /// Worker threads; `0` selects all cores but one.
    pub threads: usize,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            num_peaks: 1,
            peak_radius: 1,
            limit_search: true,
            subpixel: SubpixelMethod::Gaussian,
            connectivity: Connectivity::Four,
            threads: 0,
        }
    }
}

impl PeakConfig {
    /// Largest supported `num_peaks`.
    pub const MAX_PEAKS: usize = 3;

    /// Checks peak count and radius.
    pub fn validate(&self) -> PivResult<()> {
        if self.num_peaks == 0 || self.num_peaks > Self::MAX_PEAKS {
            return Err(PivError::InvalidArgument {
                reason: "num_peaks must be 1, 2 or 3",
            });
        }
        if self.peak_radius == 0 {
            return Err(PivError::InvalidArgument {
                reason: "peak_radius must be at least 1",
            });
        }
        Ok(())
    }

    /// Checks that the radius fits into planes of the given size:
    /// `2 * peak_radius < min(plane_width, plane_height)`.
    pub fn validate_for_plane(&self, plane_width: usize, plane_height: usize) -> PivResult<()> {
        self.validate()?;
        if 2 * self.peak_radius >= plane_width.min(plane_height) {
            return Err(PivError::InvalidArgument {
                reason: "peak_radius must be smaller than half the plane size",
            });
        }
        Ok(())
    }

    /// Peaks that must be found for a window to be valid.
    ///
    /// At least two, so the peak ratio is always defined.
    pub fn search_count(&self) -> usize {
        self.num_peaks.max(2)
    }
}

#[cfg(test)]
mod tests {
    use super::{CorrelationConfig, PeakConfig};
    use crate::util::PivError;

    #[test]
    fn defaults_are_valid() {
        CorrelationConfig::default().validate().unwrap();
        PeakConfig::default().validate_for_plane(32, 32).unwrap();
    }

    #[test]
    fn overlap_must_be_open_interval() {
        for overlap in [0.0, 1.0, -0.1, f64::NAN] {
            let cfg = CorrelationConfig {
                overlap,
                ..CorrelationConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(PivError::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn radius_is_bounded_by_plane() {
        let cfg = PeakConfig {
            peak_radius: 4,
            ..PeakConfig::default()
        };
        assert!(cfg.validate_for_plane(10, 10).is_ok());
        assert!(cfg.validate_for_plane(9, 9).is_ok());
        assert!(cfg.validate_for_plane(16, 8).is_err());

        let small = PeakConfig::default();
        assert!(small.validate_for_plane(3, 3).is_ok());
        assert!(small.validate_for_plane(2, 5).is_err());
    }

    #[test]
    fn search_needs_two_peaks() {
        let mut cfg = PeakConfig::default();
        assert_eq!(cfg.search_count(), 2);
        cfg.num_peaks = 3;
        assert_eq!(cfg.search_count(), 3);
        cfg.num_peaks = 4;
        assert!(cfg.validate().is_err());
    }
}
