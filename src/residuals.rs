// residuals.rs - arrival-time residuals of the best model

use std::error::Error;

/// Residuals of a best-fit model against the observed arrival times,
/// restricted to receivers with a valid (positive) observation, in
/// shot-major order.
#[derive(Debug, Clone, Default)]
pub struct ResidualSet {
    pub p: Vec<f64>,
    /// Empty when S waves were not calculated.
    pub s: Vec<f64>,
    /// Per-shot time-zero offsets subtracted from the P residuals
    /// (empty when no correction was applied).
    pub t0_p: Vec<f64>,
    pub t0_s: Vec<f64>,
}

/// Compute per-receiver residuals (predicted minus observed), optionally
/// removing the unknown constant per-shot timing offset.
///
/// Both tables are `[P, S]` pairs with `n_shots * n_stations` rows, shot
/// blocks contiguous. The offset of a shot is the mean residual over that
/// shot's valid receivers, estimated and subtracted independently per wave
/// type; a shot with no valid receiver gets offset 0 (it contributes no
/// residuals either way).
pub fn compute_residuals(
    predicted: &[[f64; 2]],
    observed: &[[f64; 2]],
    n_shots: usize,
    n_stations: usize,
    swaves: bool,
    recalculate_t0: bool,
) -> Result<ResidualSet, Box<dyn Error>> {
    let rows = n_shots * n_stations;
    if predicted.len() != rows || observed.len() != rows {
        return Err(format!(
            "times tables must have n_shots*n_stations = {} rows, got predicted={}, observed={}",
            rows,
            predicted.len(),
            observed.len()
        )
        .into());
    }

    let mut diff: Vec<[f64; 2]> = predicted
        .iter()
        .zip(observed)
        .map(|(p, o)| [p[0] - o[0], p[1] - o[1]])
        .collect();

    let mut set = ResidualSet::default();

    if recalculate_t0 {
        for shot in 0..n_shots {
            let block = shot * n_stations..(shot + 1) * n_stations;
            let t0p = shot_offset(&diff[block.clone()], &observed[block.clone()], 0);
            set.t0_p.push(t0p);
            for r in block.clone() {
                diff[r][0] -= t0p;
            }
            if swaves {
                let t0s = shot_offset(&diff[block.clone()], &observed[block.clone()], 1);
                set.t0_s.push(t0s);
                for r in block {
                    diff[r][1] -= t0s;
                }
            }
        }
    }

    for (d, o) in diff.iter().zip(observed) {
        if o[0] > 0.0 {
            set.p.push(d[0]);
        }
        if swaves && o[1] > 0.0 {
            set.s.push(d[1]);
        }
    }
    Ok(set)
}

fn shot_offset(diff: &[[f64; 2]], observed: &[[f64; 2]], col: usize) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for (d, o) in diff.iter().zip(observed) {
        if o[col] > 0.0 {
            sum += d[col];
            n += 1;
        }
    }
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Total model energy matching the inversion's objective:
/// sum of (residual/sigma)^2 / 2 over the valid receivers of each wave
/// type, plus the prior energy. Reported for display consistency only.
pub fn model_energy(
    set: &ResidualSet,
    sigma_p: f64,
    sigma_s: Option<f64>,
    prior_energy: f64,
) -> f64 {
    let mut e: f64 = set.p.iter().map(|r| (r / sigma_p).powi(2) / 2.0).sum();
    if let Some(ss) = sigma_s {
        e += set.s.iter().map(|r| (r / ss).powi(2) / 2.0).sum::<f64>();
    }
    e + prior_energy
}
