//! Worker count must not change any output bit.

mod common;

use common::image_pair;
use pivcorr::{
    autocorrelate_grid, correct_by_neighbors, correlate_grid, extract_displacements,
    generate_grid, CorrelationConfig, PaddingMode, PeakConfig,
};

fn bits(values: &[f64]) -> Vec<u64> {
    values.iter().map(|v| v.to_bits()).collect()
}

#[test]
fn parallel_matches_sequential() {
    let (a, b) = image_pair(3, 160, 144, 2.5, -1.25);
    for padding in [PaddingMode::Circular, PaddingMode::Linear] {
        let config = |threads| CorrelationConfig {
            window_size: 24,
            overlap: 0.5,
            padding,
            threads,
            ..CorrelationConfig::default()
        };
        let seq = correlate_grid(a.view(), b.view(), &config(1)).unwrap();
        let par = correlate_grid(a.view(), b.view(), &config(4)).unwrap();
        assert_eq!(bits(seq.as_slice()), bits(par.as_slice()));

        let peaks = |threads| PeakConfig {
            num_peaks: 3,
            threads,
            ..PeakConfig::default()
        };
        let field_seq = extract_displacements(&seq, &peaks(1)).unwrap();
        let field_par = extract_displacements(&par, &peaks(4)).unwrap();
        assert_eq!(bits(field_seq.as_slice()), bits(field_par.as_slice()));

        let shape = generate_grid(160, 144, 24, 0.5).unwrap().shape();
        let corr_seq = correct_by_neighbors(&seq, shape, 1).unwrap();
        let corr_par = correct_by_neighbors(&par, shape, 4).unwrap();
        assert_eq!(bits(corr_seq.as_slice()), bits(corr_par.as_slice()));
    }
}

#[test]
fn more_threads_than_windows() {
    let (a, _) = image_pair(9, 48, 48, 0.0, 0.0);
    let config = |threads| CorrelationConfig {
        window_size: 32,
        overlap: 0.5,
        threads,
        ..CorrelationConfig::default()
    };
    let seq = autocorrelate_grid(a.view(), &config(1)).unwrap();
    let par = autocorrelate_grid(a.view(), &config(16)).unwrap();
    assert_eq!(seq.num_planes(), 4);
    assert_eq!(bits(seq.as_slice()), bits(par.as_slice()));
}
