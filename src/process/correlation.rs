//! Correlation phase: one normalized plane per grid window.

use crate::config::{CorrelationConfig, CorrelationMethod, PaddingMode};
use crate::correlate::normalize::{normalize_plane, BiasCorrection, Normalization, PlaneScale};
use crate::correlate::Correlator;
use crate::grid::{generate_grid, Grid, Rect};
use crate::image::{ImageView, ImageViewMut};
use crate::schedule::WorkerPool;
use crate::trace::{trace_event, trace_span};
use crate::util::math::{window_mean, window_stats, WindowStats};
use crate::util::{PivError, PivResult, Sample};
use crate::volume::{assemble_plane, CorrelationVolume};
use crate::window::{extract_window, pad_and_center, padded_len};

/// Cross-correlates every grid window of `image_a` with the same window of
/// `image_b`.
///
/// Both images must have the same extent. The volume holds one
/// `window_size x window_size` plane per window, in grid order, with zero lag
/// at `(window_size / 2, window_size / 2)`.
pub fn correlate_grid<T: Sample>(
    image_a: ImageView<'_, T>,
    image_b: ImageView<'_, T>,
    config: &CorrelationConfig,
) -> PivResult<CorrelationVolume<T>> {
    config.validate()?;
    check_extents(image_a, image_b)?;
    let grid = generate_grid(
        image_a.width(),
        image_a.height(),
        config.window_size,
        config.overlap,
    )?;
    correlate_on_grid(image_a, image_b, &grid, config)
}

/// Auto-correlates every grid window of `image`.
///
/// With [`CorrelationMethod::Normalized`] the zero-lag sample of every plane
/// is `1`.
pub fn autocorrelate_grid<T: Sample>(
    image: ImageView<'_, T>,
    config: &CorrelationConfig,
) -> PivResult<CorrelationVolume<T>> {
    config.validate()?;
    let grid = generate_grid(image.width(), image.height(), config.window_size, config.overlap)?;
    let _span = trace_span!("autocorrelate_grid", windows = grid.len()).entered();
    let mode = match config.method {
        CorrelationMethod::Standard => Normalization::Plain,
        CorrelationMethod::Normalized => Normalization::Auto,
    };
    run_windows(image, None, &grid, config, mode)
}

pub(crate) fn check_extents<T>(
    image_a: ImageView<'_, T>,
    image_b: ImageView<'_, T>,
) -> PivResult<()> {
    if image_a.width() != image_b.width() || image_a.height() != image_b.height() {
        return Err(PivError::ShapeMismatch {
            expected: image_a.width() * image_a.height(),
            got: image_b.width() * image_b.height(),
            context: "image pair extents",
        });
    }
    Ok(())
}

/// Correlation phase on an already generated grid.
pub(crate) fn correlate_on_grid<T: Sample>(
    image_a: ImageView<'_, T>,
    image_b: ImageView<'_, T>,
    grid: &Grid,
    config: &CorrelationConfig,
) -> PivResult<CorrelationVolume<T>> {
    let _span = trace_span!("correlate_grid", windows = grid.len()).entered();
    let mode = match config.method {
        CorrelationMethod::Standard => Normalization::Plain,
        CorrelationMethod::Normalized => Normalization::Normalized,
    };
    run_windows(image_a, Some(image_b), grid, config, mode)
}

fn run_windows<T: Sample>(
    image_a: ImageView<'_, T>,
    image_b: Option<ImageView<'_, T>>,
    grid: &Grid,
    config: &CorrelationConfig,
    mode: Normalization,
) -> PivResult<CorrelationVolume<T>> {
    let window = grid.window_size();
    let transform = match config.padding {
        PaddingMode::Circular => window,
        PaddingMode::Linear => padded_len(window),
    };
    let bias = match (config.padding, mode) {
        (PaddingMode::Linear, Normalization::Normalized | Normalization::Auto) => {
            Some(BiasCorrection::new(window, window, transform, transform)?)
        }
        _ => None,
    };
    trace_event!(
        "grid",
        rows = grid.shape().rows,
        cols = grid.shape().cols,
        transform = transform
    );

    let pool = WorkerPool::new(config.threads)?;
    trace_event!("workers", threads = pool.threads());

    let setup = WindowSetup {
        padding: config.padding,
        mode,
        transform,
        bias: bias.as_ref(),
    };
    let rects = grid.rects();
    let mut volume = CorrelationVolume::filled(grid.len(), window, window, T::zero())?;
    pool.run(
        volume.as_mut_slice(),
        window * window,
        || WindowWorker::new(transform),
        |worker, idx, slot| worker.correlate(&setup, image_a, image_b, &rects[idx], slot),
    )?;
    Ok(volume)
}

/// Per-run settings shared read-only by all workers.
struct WindowSetup<'a, T> {
    padding: PaddingMode,
    mode: Normalization,
    transform: usize,
    bias: Option<&'a BiasCorrection<T>>,
}

/// Per-worker correlation state.
struct WindowWorker<T: Sample> {
    correlator: Correlator<T>,
    buf_a: Vec<T>,
    buf_b: Vec<T>,
    full: Vec<T>,
}

impl<T: Sample> WindowWorker<T> {
    fn new(transform: usize) -> PivResult<Self> {
        let len = transform * transform;
        Ok(Self {
            correlator: Correlator::new(transform, transform)?,
            buf_a: vec![T::zero(); len],
            buf_b: vec![T::zero(); len],
            full: vec![T::zero(); len],
        })
    }

    fn correlate(
        &mut self,
        setup: &WindowSetup<'_, T>,
        image_a: ImageView<'_, T>,
        image_b: Option<ImageView<'_, T>>,
        rect: &Rect,
        slot: &mut [T],
    ) -> PivResult<()> {
        let n = setup.transform;
        let stats_a = self.load(setup, image_a, rect, Buffer::A)?;
        let stats_b = match image_b {
            Some(image_b) => {
                let stats_b = self.load(setup, image_b, rect, Buffer::B)?;
                self.correlator.cross_correlate(
                    ImageView::from_slice(&self.buf_a, n, n)?,
                    ImageView::from_slice(&self.buf_b, n, n)?,
                    &mut ImageViewMut::from_slice(&mut self.full, n, n)?,
                )?;
                stats_b
            }
            None => {
                self.correlator.auto_correlate(
                    ImageView::from_slice(&self.buf_a, n, n)?,
                    &mut ImageViewMut::from_slice(&mut self.full, n, n)?,
                )?;
                stats_a
            }
        };

        let full = ImageView::from_slice(&self.full, n, n)?;
        assemble_plane(full, rect.width, rect.height, slot)?;
        let scale = PlaneScale {
            mode: setup.mode,
            std_a: stats_a.std,
            std_b: stats_b.std,
            area: rect.area(),
        };
        normalize_plane(slot, scale, setup.bias)
    }

    /// Writes one window into its transform buffer and returns its statistics.
    fn load(
        &mut self,
        setup: &WindowSetup<'_, T>,
        image: ImageView<'_, T>,
        rect: &Rect,
        which: Buffer,
    ) -> PivResult<WindowStats> {
        if !image.contains(rect) {
            return Err(PivError::RoiOutOfBounds {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                img_width: image.width(),
                img_height: image.height(),
            });
        }
        // The circular standard path correlates raw samples.
        let stats = match (setup.mode, setup.padding) {
            (Normalization::Plain, PaddingMode::Circular) => WindowStats { mean: 0.0, std: 0.0 },
            (Normalization::Plain, PaddingMode::Linear) => WindowStats {
                mean: window_mean(image, rect),
                std: 0.0,
            },
            _ => window_stats(image, rect),
        };

        let n = setup.transform;
        let buf = match which {
            Buffer::A => &mut self.buf_a,
            Buffer::B => &mut self.buf_b,
        };
        let mut out = ImageViewMut::from_slice(buf, n, n)?;
        let mean = T::cast(stats.mean);
        match setup.padding {
            PaddingMode::Circular => extract_window(image, rect, mean, &mut out)?,
            PaddingMode::Linear => pad_and_center(image, rect, mean, &mut out)?,
        }
        Ok(stats)
    }
}

#[derive(Clone, Copy)]
enum Buffer {
    A,
    B,
}
