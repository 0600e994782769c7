//! Peak-extraction phase: one displacement record per correlation plane.

use crate::candidate::{find_peaks, PeakSearch};
use crate::config::PeakConfig;
use crate::field::{channel_count, DisplacementField};
use crate::image::ImageView;
use crate::refine::subpixel::refine_peak;
use crate::schedule::WorkerPool;
use crate::trace::{trace_event, trace_span};
use crate::util::{PivError, PivResult, Sample};
use crate::volume::CorrelationVolume;

/// Locates and refines the correlation peaks of every plane.
///
/// Displacements are measured from the zero-lag sample at
/// `(plane_width / 2, plane_height / 2)`. A plane with fewer than
/// [`PeakConfig::search_count`] peaks yields NaN in all channels of its
/// window; this is not an error.
pub fn extract_displacements<T: Sample>(
    volume: &CorrelationVolume<T>,
    config: &PeakConfig,
) -> PivResult<DisplacementField<T>> {
    config.validate_for_plane(volume.plane_width(), volume.plane_height())?;
    let _span = trace_span!("extract_displacements", planes = volume.num_planes()).entered();

    let search = PeakSearch {
        count: config.search_count(),
        radius: config.peak_radius,
        connectivity: config.connectivity,
        limit_search: config.limit_search,
    };
    let channels = channel_count(config.num_peaks);
    let mut records = vec![T::nan(); volume.num_planes() * channels];

    let pool = WorkerPool::new(config.threads)?;
    trace_event!("workers", threads = pool.threads());
    pool.run(
        &mut records,
        channels,
        || Ok(()),
        |_, idx, record| {
            let plane = volume.plane(idx).ok_or(PivError::InvalidArgument {
                reason: "plane index outside the volume",
            })?;
            emit_record(plane, &search, config, record);
            Ok(())
        },
    )?;

    let field = DisplacementField::from_records(&records, config.num_peaks)?;
    trace_event!("invalid_windows", count = field.invalid_count());
    Ok(field)
}

/// Fills one window-interleaved record: `u, v, height, ratio, u2, v2, ...`.
fn emit_record<T: Sample>(
    plane: ImageView<'_, T>,
    search: &PeakSearch,
    config: &PeakConfig,
    record: &mut [T],
) {
    let peaks = find_peaks(plane, search);
    if peaks.len() < search.count {
        record.fill(T::nan());
        return;
    }

    let center_x = (plane.width() / 2) as f64;
    let center_y = (plane.height() / 2) as f64;
    let displacement = |k: usize| {
        let (x, y) = refine_peak(&peaks[k], config.subpixel);
        (T::cast(x - center_x), T::cast(y - center_y))
    };

    let (u, v) = displacement(0);
    record[0] = u;
    record[1] = v;
    record[2] = peaks[0].value;
    let second = peaks[1].value.widen();
    record[3] = if second > 0.0 {
        T::cast(peaks[0].value.widen() / second)
    } else {
        T::zero()
    };
    for k in 1..config.num_peaks {
        let (u, v) = displacement(k);
        record[2 + 2 * k] = u;
        record[3 + 2 * k] = v;
    }
}
