use watch::residuals::{compute_residuals, model_energy, ResidualSet};

fn one_shot_tables() -> (Vec<[f64; 2]>, Vec<[f64; 2]>) {
    // One shot, three receivers, all valid, P residuals 0.1 / 0.2 / 0.3.
    let observed = vec![[1.0, -1.0], [1.0, -1.0], [1.0, -1.0]];
    let predicted = vec![[1.1, 0.0], [1.2, 0.0], [1.3, 0.0]];
    (predicted, observed)
}

#[test]
fn time_zero_correction_removes_the_shot_mean() {
    let (predicted, observed) = one_shot_tables();
    let set = compute_residuals(&predicted, &observed, 1, 3, false, true).unwrap();

    assert_eq!(set.t0_p, vec![0.2]);
    assert_eq!(set.p.len(), 3);
    let expected = [-0.1, 0.0, 0.1];
    for (r, e) in set.p.iter().zip(expected) {
        assert!((r - e).abs() < 1e-12, "residual {r}, expected {e}");
    }
    let sum: f64 = set.p.iter().sum();
    assert!(sum.abs() < 1e-12, "corrected shot should sum to ~0, got {sum}");
}

#[test]
fn without_correction_residuals_are_raw_differences() {
    let (predicted, observed) = one_shot_tables();
    let set = compute_residuals(&predicted, &observed, 1, 3, false, false).unwrap();
    assert!(set.t0_p.is_empty());
    let expected = [0.1, 0.2, 0.3];
    for (r, e) in set.p.iter().zip(expected) {
        assert!((r - e).abs() < 1e-12);
    }
}

#[test]
fn invalid_observations_are_excluded_from_mean_and_output() {
    // Middle receiver unmeasured: its residual must influence neither the
    // shot offset nor the output.
    let observed = vec![[1.0, -1.0], [-1.0, -1.0], [1.0, -1.0]];
    let predicted = vec![[1.1, 0.0], [9.9, 0.0], [1.3, 0.0]];
    let set = compute_residuals(&predicted, &observed, 1, 3, false, true).unwrap();

    assert_eq!(set.p.len(), 2);
    assert_eq!(set.t0_p, vec![0.2]);
    assert!((set.p[0] + 0.1).abs() < 1e-12);
    assert!((set.p[1] - 0.1).abs() < 1e-12);
}

#[test]
fn p_and_s_offsets_are_independent() {
    // Two receivers, one shot; P offset 0.1, S offset -0.4.
    let observed = vec![[1.0, 2.0], [1.0, 2.0]];
    let predicted = vec![[1.05, 1.55], [1.15, 1.65]];
    let set = compute_residuals(&predicted, &observed, 1, 2, true, true).unwrap();

    assert!((set.t0_p[0] - 0.1).abs() < 1e-12);
    assert!((set.t0_s[0] + 0.4).abs() < 1e-12);
    let sum_p: f64 = set.p.iter().sum();
    let sum_s: f64 = set.s.iter().sum();
    assert!(sum_p.abs() < 1e-12);
    assert!(sum_s.abs() < 1e-12);
}

#[test]
fn shots_are_corrected_blockwise() {
    // Two shots with different offsets; each block sums to zero on its own.
    let observed = vec![[1.0, -1.0], [1.0, -1.0], [1.0, -1.0], [1.0, -1.0]];
    let predicted = vec![[1.1, 0.0], [1.3, 0.0], [0.6, 0.0], [0.8, 0.0]];
    let set = compute_residuals(&predicted, &observed, 2, 2, false, true).unwrap();

    assert!((set.t0_p[0] - 0.2).abs() < 1e-12);
    assert!((set.t0_p[1] + 0.3).abs() < 1e-12);
    assert!((set.p[0] + 0.1).abs() < 1e-12);
    assert!((set.p[1] - 0.1).abs() < 1e-12);
    assert!((set.p[2] + 0.1).abs() < 1e-12);
    assert!((set.p[3] - 0.1).abs() < 1e-12);
}

#[test]
fn wrong_table_shape_is_an_error() {
    let observed = vec![[1.0, -1.0], [1.0, -1.0]];
    let predicted = vec![[1.1, 0.0]];
    assert!(compute_residuals(&predicted, &observed, 1, 2, false, false).is_err());
    assert!(compute_residuals(&observed, &observed, 2, 2, false, false).is_err());
}

#[test]
fn energy_matches_the_inversion_objective() {
    let set = ResidualSet {
        p: vec![0.2, -0.1],
        ..Default::default()
    };
    let e = model_energy(&set, 0.1, None, 2.0);
    // (0.2/0.1)^2/2 + (0.1/0.1)^2/2 + 2.0 = 2.0 + 0.5 + 2.0
    assert!((e - 4.5).abs() < 1e-12, "energy {e}, expected 4.5");
}

#[test]
fn energy_adds_the_s_contribution_when_enabled() {
    let set = ResidualSet {
        p: vec![0.1],
        s: vec![0.2],
        ..Default::default()
    };
    let e = model_energy(&set, 0.1, Some(0.2), 1.0);
    // (0.1/0.1)^2/2 + (0.2/0.2)^2/2 + 1.0
    assert!((e - 2.0).abs() < 1e-12);
}
