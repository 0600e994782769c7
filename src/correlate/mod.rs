//! Frequency-domain correlation of equally sized real buffers.
//!
//! A [`Correlator`] owns the FFT plans and scratch buffers for one transform
//! size. It is not shared between threads: every worker builds its own, so no
//! transform state is ever touched concurrently.
//!
//! Conventions, for buffers of size `w x h` and `N = w * h`:
//! - `cross_correlate(a, b)[c + t] = sum_x a(x) * b(x + t)` (circular), computed
//!   as `IFFT(conj(F(a)) * F(b)) / N`. If `b` is `a` moved by `+t`, the peak sits
//!   at lag `t`.
//! - `auto_correlate(a) = IFFT(|F(a)|^2) / N`.
//! - The output is re-centred by a quadrant swap so lag zero lands at
//!   `c = (w / 2, h / 2)`.

use crate::image::{ImageView, ImageViewMut};
use crate::util::{PivError, PivResult, Sample};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

pub mod normalize;

/// Per-worker 2D correlation engine for one transform size.
pub struct Correlator<T: Sample> {
    width: usize,
    height: usize,
    row_forward: Arc<dyn Fft<T>>,
    row_inverse: Arc<dyn Fft<T>>,
    col_forward: Arc<dyn Fft<T>>,
    col_inverse: Arc<dyn Fft<T>>,
    spectrum_a: Vec<Complex<T>>,
    spectrum_b: Vec<Complex<T>>,
    column: Vec<Complex<T>>,
    scratch: Vec<Complex<T>>,
}

impl<T: Sample> Correlator<T> {
    /// Plans forward and inverse transforms for `width x height` buffers.
    pub fn new(width: usize, height: usize) -> PivResult<Self> {
        let len = width
            .checked_mul(height)
            .filter(|&len| len > 0)
            .ok_or(PivError::InvalidDimensions { width, height })?;

        let mut planner = FftPlanner::<T>::new();
        let row_forward = planner.plan_fft_forward(width);
        let row_inverse = planner.plan_fft_inverse(width);
        let col_forward = planner.plan_fft_forward(height);
        let col_inverse = planner.plan_fft_inverse(height);

        let scratch_len = [&row_forward, &row_inverse, &col_forward, &col_inverse]
            .iter()
            .map(|fft| fft.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);
        let zero = Complex::new(T::zero(), T::zero());

        Ok(Self {
            width,
            height,
            row_forward,
            row_inverse,
            col_forward,
            col_inverse,
            spectrum_a: vec![zero; len],
            spectrum_b: vec![zero; len],
            column: vec![zero; height],
            scratch: vec![zero; scratch_len],
        })
    }

    /// Transform width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Transform height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cross-correlates `a` with `b` into `out`; all three must match the
    /// transform size.
    pub fn cross_correlate(
        &mut self,
        a: ImageView<'_, T>,
        b: ImageView<'_, T>,
        out: &mut ImageViewMut<'_, T>,
    ) -> PivResult<()> {
        self.check_size(a.width(), a.height(), "cross_correlate input a")?;
        self.check_size(b.width(), b.height(), "cross_correlate input b")?;
        self.check_size(out.width(), out.height(), "cross_correlate output")?;

        load_real(a, &mut self.spectrum_a);
        load_real(b, &mut self.spectrum_b);
        self.transform(Spectrum::A, Direction::Forward);
        self.transform(Spectrum::B, Direction::Forward);

        for (fa, &fb) in self.spectrum_a.iter_mut().zip(self.spectrum_b.iter()) {
            *fa = fa.conj() * fb;
        }

        self.transform(Spectrum::A, Direction::Inverse);
        self.store_centered(out);
        Ok(())
    }

    /// Auto-correlates `a` into `out`.
    pub fn auto_correlate(
        &mut self,
        a: ImageView<'_, T>,
        out: &mut ImageViewMut<'_, T>,
    ) -> PivResult<()> {
        self.check_size(a.width(), a.height(), "auto_correlate input")?;
        self.check_size(out.width(), out.height(), "auto_correlate output")?;

        load_real(a, &mut self.spectrum_a);
        self.transform(Spectrum::A, Direction::Forward);
        for fa in self.spectrum_a.iter_mut() {
            *fa = Complex::new(fa.norm_sqr(), T::zero());
        }
        self.transform(Spectrum::A, Direction::Inverse);
        self.store_centered(out);
        Ok(())
    }

    fn check_size(&self, width: usize, height: usize, context: &'static str) -> PivResult<()> {
        if width != self.width || height != self.height {
            return Err(PivError::ShapeMismatch {
                expected: self.width * self.height,
                got: width * height,
                context,
            });
        }
        Ok(())
    }

    fn transform(&mut self, which: Spectrum, direction: Direction) {
        let (row_fft, col_fft) = match direction {
            Direction::Forward => (&self.row_forward, &self.col_forward),
            Direction::Inverse => (&self.row_inverse, &self.col_inverse),
        };
        let data = match which {
            Spectrum::A => &mut self.spectrum_a,
            Spectrum::B => &mut self.spectrum_b,
        };
        fft_2d(
            data,
            self.width,
            row_fft.as_ref(),
            col_fft.as_ref(),
            &mut self.column,
            &mut self.scratch,
        );
    }

    /// Writes the real part of spectrum A, scaled by `1 / N`, with a quadrant swap.
    fn store_centered(&self, out: &mut ImageViewMut<'_, T>) {
        let width = self.width;
        let height = self.height;
        let scale = T::cast(1.0 / (width * height) as f64);
        let (cx, cy) = (width / 2, height / 2);
        for (y, src_row) in self.spectrum_a.chunks_exact(width).enumerate() {
            let dst_row = out.row_mut_unchecked((y + cy) % height);
            for (x, value) in src_row.iter().enumerate() {
                dst_row[(x + cx) % width] = value.re * scale;
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Spectrum {
    A,
    B,
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Inverse,
}

fn load_real<T: Sample>(src: ImageView<'_, T>, dst: &mut [Complex<T>]) {
    let width = src.width();
    for (y, dst_row) in dst.chunks_exact_mut(width).enumerate() {
        for (d, &s) in dst_row.iter_mut().zip(src.row_unchecked(y)) {
            *d = Complex::new(s, T::zero());
        }
    }
}

/// In-place 2D FFT by row/column decomposition.
fn fft_2d<T: Sample>(
    data: &mut [Complex<T>],
    width: usize,
    row_fft: &dyn Fft<T>,
    col_fft: &dyn Fft<T>,
    column: &mut [Complex<T>],
    scratch: &mut [Complex<T>],
) {
    for row in data.chunks_exact_mut(width) {
        row_fft.process_with_scratch(row, scratch);
    }

    for x in 0..width {
        for (y, c) in column.iter_mut().enumerate() {
            *c = data[y * width + x];
        }
        col_fft.process_with_scratch(column, scratch);
        for (y, c) in column.iter().enumerate() {
            data[y * width + x] = *c;
        }
    }
}
