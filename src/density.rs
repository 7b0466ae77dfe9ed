// density.rs - Gaussian kernel density strip for per-depth uncertainty

use std::error::Error;

use nalgebra::DMatrix;

/// Perpendicular-axis resolution used when the caller has no opinion.
pub const DENSITY_RESOLUTION: usize = 1000;

/// The rasterizable part of a density strip: for each of the N axis
/// positions, an unnormalized Gaussian marginal sampled at M points across
/// the shared perpendicular range.
#[derive(Debug, Clone)]
pub struct DensityStrip {
    /// N rows (axis positions) by M columns (perpendicular samples).
    pub intensity: DMatrix<f64>,
    /// Lower edge of the perpendicular range: min(mean - 2 sigma).
    pub vmin: f64,
    /// Upper edge of the perpendicular range: max(mean + 2 sigma).
    pub vmax: f64,
}

impl DensityStrip {
    pub fn n_positions(&self) -> usize {
        self.intensity.nrows()
    }

    pub fn resolution(&self) -> usize {
        self.intensity.ncols()
    }

    /// Largest intensity in the matrix, for grayscale normalization.
    pub fn peak(&self) -> f64 {
        self.intensity.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Compute the density strip of a 1-D sequence of (mean, stddev) Gaussian
/// marginals along a shared axis.
///
/// `x` carries the axis positions and must match `mean` and `sigma` in
/// length; the positions themselves only matter to the renderer, the matrix
/// depends on `mean` and `sigma` alone. A `sigma` entry of exactly 0 is a
/// degenerate input: the corresponding row holds non-finite spikes. Callers
/// feeding variances of converged chains never produce it; it is not
/// guarded here.
pub fn density_strip(
    x: &[f64],
    mean: &[f64],
    sigma: &[f64],
    m: usize,
) -> Result<DensityStrip, Box<dyn Error>> {
    if x.len() != mean.len() || x.len() != sigma.len() {
        return Err(format!(
            "density strip needs equal lengths, got x={}, mean={}, sigma={}",
            x.len(),
            mean.len(),
            sigma.len()
        )
        .into());
    }
    if x.is_empty() {
        return Err("density strip needs at least one position".into());
    }
    if m < 2 {
        return Err(format!("density strip resolution must be >= 2, got {m}").into());
    }

    let n = x.len();
    let vmin = mean
        .iter()
        .zip(sigma)
        .map(|(y, s)| y - 2.0 * s)
        .fold(f64::INFINITY, f64::min);
    let vmax = mean
        .iter()
        .zip(sigma)
        .map(|(y, s)| y + 2.0 * s)
        .fold(f64::NEG_INFINITY, f64::max);

    let step = (vmax - vmin) / (m - 1) as f64;
    let intensity = DMatrix::from_fn(n, m, |i, j| {
        let yy = vmin + step * j as f64;
        let t = (mean[i] - yy) / sigma[i];
        (-t * t).exp() / sigma[i]
    });

    Ok(DensityStrip { intensity, vmin, vmax })
}
