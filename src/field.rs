//! Channel-blocked displacement field.
//!
//! The field stores one block per channel, each with one slot per grid
//! window: `u`, `v`, `peak_height`, `peak_ratio`, then `u2, v2` and `u3, v3`
//! when more than one peak is reported. A window whose search found too few
//! peaks has NaN in every channel.

use crate::util::{PivError, PivResult, Sample};

/// Output channel of a [`DisplacementField`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Horizontal displacement of the first peak.
    U,
    /// Vertical displacement of the first peak.
    V,
    /// Correlation value of the first peak.
    PeakHeight,
    /// First peak over second peak; `0` when the second is not positive.
    PeakRatio,
    /// Horizontal displacement of the second peak.
    U2,
    /// Vertical displacement of the second peak.
    V2,
    /// Horizontal displacement of the third peak.
    U3,
    /// Vertical displacement of the third peak.
    V3,
}

impl Channel {
    /// Block index within the field buffer.
    pub const fn index(self) -> usize {
        match self {
            Channel::U => 0,
            Channel::V => 1,
            Channel::PeakHeight => 2,
            Channel::PeakRatio => 3,
            Channel::U2 => 4,
            Channel::V2 => 5,
            Channel::U3 => 6,
            Channel::V3 => 7,
        }
    }

    /// Channels present when `num_peaks` peaks are reported.
    pub fn for_peaks(num_peaks: usize) -> &'static [Channel] {
        const ALL: [Channel; 8] = [
            Channel::U,
            Channel::V,
            Channel::PeakHeight,
            Channel::PeakRatio,
            Channel::U2,
            Channel::V2,
            Channel::U3,
            Channel::V3,
        ];
        &ALL[..channel_count(num_peaks).min(ALL.len())]
    }
}

/// Number of channels for `num_peaks` reported peaks.
pub const fn channel_count(num_peaks: usize) -> usize {
    4 + 2 * num_peaks.saturating_sub(1)
}

/// Per-window displacement results.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplacementField<T> {
    data: Vec<T>,
    windows: usize,
    num_peaks: usize,
}

impl<T: Sample> DisplacementField<T> {
    /// Transposes window-interleaved records into channel blocks.
    ///
    /// `records` holds `channel_count(num_peaks)` values per window.
    pub(crate) fn from_records(records: &[T], num_peaks: usize) -> PivResult<Self> {
        let channels = channel_count(num_peaks);
        if records.len() % channels != 0 {
            return Err(PivError::ShapeMismatch {
                expected: channels,
                got: records.len(),
                context: "displacement records",
            });
        }
        let windows = records.len() / channels;
        let mut data = vec![T::nan(); records.len()];
        for (window, record) in records.chunks_exact(channels).enumerate() {
            for (channel, &value) in record.iter().enumerate() {
                data[channel * windows + window] = value;
            }
        }
        Ok(Self {
            data,
            windows,
            num_peaks,
        })
    }

    /// Number of windows.
    pub fn len(&self) -> usize {
        self.windows
    }

    /// Returns `true` for a field without windows.
    pub fn is_empty(&self) -> bool {
        self.windows == 0
    }

    /// Number of peaks reported per window.
    pub fn num_peaks(&self) -> usize {
        self.num_peaks
    }

    /// Number of channel blocks.
    pub fn num_channels(&self) -> usize {
        channel_count(self.num_peaks)
    }

    /// Channel-blocked samples.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consumes the field and returns its buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// One channel block, or `None` if the channel was not requested.
    pub fn channel(&self, channel: Channel) -> Option<&[T]> {
        let idx = channel.index();
        if idx >= self.num_channels() {
            return None;
        }
        self.data.get(idx * self.windows..(idx + 1) * self.windows)
    }

    /// Horizontal displacement of the first peak.
    pub fn u(&self) -> &[T] {
        self.block(Channel::U)
    }

    /// Vertical displacement of the first peak.
    pub fn v(&self) -> &[T] {
        self.block(Channel::V)
    }

    /// Correlation value of the first peak.
    pub fn peak_height(&self) -> &[T] {
        self.block(Channel::PeakHeight)
    }

    /// Peak-to-peak ratio.
    pub fn peak_ratio(&self) -> &[T] {
        self.block(Channel::PeakRatio)
    }

    /// Number of windows flagged invalid (NaN).
    pub fn invalid_count(&self) -> usize {
        self.u().iter().filter(|v| v.is_nan()).count()
    }

    fn block(&self, channel: Channel) -> &[T] {
        let idx = channel.index();
        &self.data[idx * self.windows..(idx + 1) * self.windows]
    }
}
