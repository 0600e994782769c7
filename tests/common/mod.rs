//! Synthetic particle images shared by the integration tests.

#![allow(dead_code)]

use pivcorr::OwnedImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Gaussian particle population that can be rendered with a rigid shift.
pub struct ParticleField {
    particles: Vec<(f64, f64, f64)>,
    sigma: f64,
}

impl ParticleField {
    /// Scatters `count` particles over the image extent plus a margin, so
    /// shifted renderings have no empty border.
    pub fn random(seed: u64, width: usize, height: usize, count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let margin = 8.0;
        let particles = (0..count)
            .map(|_| {
                let x = rng.random_range(-margin..width as f64 + margin);
                let y = rng.random_range(-margin..height as f64 + margin);
                let intensity = rng.random_range(0.5..1.0);
                (x, y, intensity)
            })
            .collect();
        Self {
            particles,
            sigma: 1.0,
        }
    }

    /// Renders the particles moved by `(dx, dy)`.
    pub fn render(&self, width: usize, height: usize, dx: f64, dy: f64) -> OwnedImage<f64> {
        let mut data = vec![0.0f64; width * height];
        let reach = (4.0 * self.sigma).ceil() as isize;
        let denom = 2.0 * self.sigma * self.sigma;
        for &(px, py, intensity) in &self.particles {
            let (px, py) = (px + dx, py + dy);
            let (cx, cy) = (px.round() as isize, py.round() as isize);
            for y in (cy - reach)..=(cy + reach) {
                if y < 0 || y >= height as isize {
                    continue;
                }
                for x in (cx - reach)..=(cx + reach) {
                    if x < 0 || x >= width as isize {
                        continue;
                    }
                    let r2 = (x as f64 - px).powi(2) + (y as f64 - py).powi(2);
                    data[y as usize * width + x as usize] += intensity * (-r2 / denom).exp();
                }
            }
        }
        OwnedImage::new(data, width, height).unwrap()
    }
}

/// Image pair where the second frame is the first moved by `(dx, dy)`.
pub fn image_pair(
    seed: u64,
    width: usize,
    height: usize,
    dx: f64,
    dy: f64,
) -> (OwnedImage<f64>, OwnedImage<f64>) {
    let count = width * height / 50;
    let field = ParticleField::random(seed, width, height, count);
    (field.render(width, height, 0.0, 0.0), field.render(width, height, dx, dy))
}

/// Converts an image to single precision.
pub fn to_f32(image: &OwnedImage<f64>) -> OwnedImage<f32> {
    let data = image.data().iter().map(|&v| v as f32).collect();
    OwnedImage::new(data, image.width(), image.height()).unwrap()
}

/// Fraction of finite values lying within `tol` of `target`.
pub fn fraction_within(values: &[f64], target: f64, tol: f64) -> f64 {
    let hits = values
        .iter()
        .filter(|v| v.is_finite() && (*v - target).abs() <= tol)
        .count();
    hits as f64 / values.len() as f64
}

/// Median of the finite values.
pub fn median(values: &[f64]) -> f64 {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    finite.sort_by(f64::total_cmp);
    finite[finite.len() / 2]
}
