//! End-to-end behaviour of the two-phase pipeline and its supplements.

mod common;

use common::{image_pair, median};
use pivcorr::lowlevel::{find_peaks, PeakSearch};
use pivcorr::{
    autocorrelate_grid, correct_by_neighbors, correlate_grid, extract_displacements,
    process_image_pair, Channel, Connectivity, CorrelationConfig, CorrelationVolume, ImageView,
    PaddingMode, PeakConfig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn vector_field_carries_grid_geometry() {
    let (a, b) = image_pair(41, 128, 96, 1.0, 2.0);
    let result = process_image_pair(
        a.view(),
        b.view(),
        &CorrelationConfig {
            window_size: 32,
            overlap: 0.5,
            threads: 2,
            ..CorrelationConfig::default()
        },
        &PeakConfig {
            num_peaks: 2,
            ..PeakConfig::default()
        },
    )
    .unwrap();

    let shape = result.shape();
    assert_eq!((shape.rows, shape.cols), (5, 7));
    assert_eq!(result.field().len(), 35);
    assert_eq!(result.field().num_channels(), 6);
    assert!(result.field().channel(Channel::U2).is_some());
    assert!(result.field().channel(Channel::U3).is_none());

    let centers = result.centers();
    assert_eq!(centers[0], (16.0, 16.0));
    assert_eq!(centers[8], (32.0, 32.0));
    assert!((median(result.field().u()) - 1.0).abs() < 0.1);
    assert!((median(result.field().v()) - 2.0).abs() < 0.1);
}

#[test]
fn single_peak_plane_yields_nan_window() {
    let mut data = vec![0.0f64; 32 * 32];
    data[16 * 32 + 16] = 1.0;
    data[15 * 32 + 16] = 0.5;
    data[17 * 32 + 16] = 0.5;
    let volume = CorrelationVolume::from_vec(data, 32, 32).unwrap();
    let field = extract_displacements(&volume, &PeakConfig::default()).unwrap();
    assert_eq!(field.invalid_count(), 1);
    assert!(field.as_slice().iter().all(|v| v.is_nan()));
}

#[test]
fn autocorrelation_planes_are_symmetric() {
    let (a, _) = image_pair(12, 96, 96, 0.0, 0.0);
    for padding in [PaddingMode::Circular, PaddingMode::Linear] {
        let cfg = CorrelationConfig {
            window_size: 32,
            overlap: 0.5,
            padding,
            threads: 2,
            ..CorrelationConfig::default()
        };
        let volume = autocorrelate_grid(a.view(), &cfg).unwrap();
        for idx in 0..volume.num_planes() {
            let plane = volume.plane(idx).unwrap();
            assert!((plane.get(16, 16).unwrap() - 1.0).abs() < 1e-9);
            for ty in -15isize..16 {
                for tx in -15isize..16 {
                    let p = *plane.get((16 + tx) as usize, (16 + ty) as usize).unwrap();
                    let m = *plane.get((16 - tx) as usize, (16 - ty) as usize).unwrap();
                    assert!((p - m).abs() < 1e-9, "{padding:?} plane {idx} lag ({tx}, {ty})");
                }
            }
        }
    }
}

#[test]
fn neighbour_correction_keeps_the_common_peak() {
    let (a, b) = image_pair(77, 128, 128, 3.0, 1.0);
    let cfg = CorrelationConfig {
        window_size: 32,
        overlap: 0.5,
        threads: 2,
        ..CorrelationConfig::default()
    };
    let grid = pivcorr::generate_grid(128, 128, 32, 0.5).unwrap();
    let volume = correlate_grid(a.view(), b.view(), &cfg).unwrap();
    let corrected = correct_by_neighbors(&volume, grid.shape(), 2).unwrap();
    assert_eq!(corrected.num_planes(), volume.num_planes());

    let field = extract_displacements(&corrected, &PeakConfig::default()).unwrap();
    assert!((median(field.u()) - 3.0).abs() < 0.1);
    assert!((median(field.v()) - 1.0).abs() < 0.1);

    // The last plane has no right or lower neighbour.
    let last = volume.num_planes() - 1;
    assert_eq!(
        volume.plane(last).unwrap().as_slice(),
        corrected.plane(last).unwrap().as_slice()
    );
}

#[test]
fn selected_peaks_respect_suppression_radius() {
    let mut rng = StdRng::seed_from_u64(2024);
    for radius in 1..4 {
        for connectivity in [Connectivity::Four, Connectivity::Eight] {
            let data: Vec<f64> = (0..40 * 40).map(|_| rng.random_range(-1.0..1.0)).collect();
            let plane = ImageView::from_slice(&data, 40, 40).unwrap();
            let search = PeakSearch {
                count: 12,
                radius,
                connectivity,
                limit_search: false,
            };
            let peaks = find_peaks(plane, &search);
            assert!(!peaks.is_empty());
            for (i, p) in peaks.iter().enumerate() {
                assert_eq!(p.neighborhood().len(), (2 * radius + 1).pow(2));
                assert!(p.x >= radius && p.x < 40 - radius);
                for q in &peaks[i + 1..] {
                    assert!(p.value >= q.value);
                    assert!(p.x.abs_diff(q.x).max(p.y.abs_diff(q.y)) > radius);
                }
            }
        }
    }
}
