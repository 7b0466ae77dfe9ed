use watch::density::{density_strip, DENSITY_RESOLUTION};

#[test]
fn strip_has_n_by_m_shape_and_exact_range() {
    let x = [0.0, 10.0, 20.0];
    let y = [5.0, 6.0, 7.0];
    let sigma = [1.0, 2.0, 1.0];

    let strip = density_strip(&x, &y, &sigma, 100).unwrap();
    assert_eq!(strip.n_positions(), 3);
    assert_eq!(strip.resolution(), 100);

    // Perpendicular range is exactly [min(y - 2s), max(y + 2s)].
    assert_eq!(strip.vmin, 2.0);
    assert_eq!(strip.vmax, 10.0);
}

#[test]
fn mismatched_lengths_are_rejected_before_any_computation() {
    let x = [0.0, 1.0];
    let y = [5.0, 6.0, 7.0];
    let sigma = [1.0, 1.0];
    assert!(density_strip(&x, &y, &sigma, 100).is_err());

    let sigma_short = [1.0];
    assert!(density_strip(&x, &y[..2], &sigma_short, 100).is_err());
}

#[test]
fn empty_input_is_rejected() {
    let empty: [f64; 0] = [];
    assert!(density_strip(&empty, &empty, &empty, 100).is_err());
}

#[test]
fn each_row_peaks_at_its_own_mean() {
    let x = [0.0, 1.0, 2.0];
    let y = [-1.0, 0.0, 2.0];
    let sigma = [0.5, 0.5, 0.5];
    let strip = density_strip(&x, &y, &sigma, 2001).unwrap();

    let step = (strip.vmax - strip.vmin) / 2000.0;
    for i in 0..3 {
        let mut best_j = 0;
        let mut best_v = f64::NEG_INFINITY;
        for j in 0..strip.resolution() {
            let v = strip.intensity[(i, j)];
            if v > best_v {
                best_v = v;
                best_j = j;
            }
        }
        let peak_position = strip.vmin + step * best_j as f64;
        println!("row {i}: peak at {peak_position} (mean {})", y[i]);
        assert!(
            (peak_position - y[i]).abs() <= step,
            "row {i} peaks at {peak_position}, expected near {}",
            y[i]
        );
    }
}

#[test]
fn amplitude_scales_with_inverse_sigma() {
    // Both rows centered on 0; the range [-4, 4] sampled at 1001 points
    // contains 0 exactly, so the peaks are 1/sigma exactly.
    let x = [0.0, 1.0];
    let y = [0.0, 0.0];
    let sigma = [1.0, 2.0];
    let strip = density_strip(&x, &y, &sigma, 1001).unwrap();

    let mid = 500;
    assert!((strip.intensity[(0, mid)] - 1.0).abs() < 1e-12);
    assert!((strip.intensity[(1, mid)] - 0.5).abs() < 1e-12);
}

#[test]
fn default_resolution_is_one_thousand() {
    assert_eq!(DENSITY_RESOLUTION, 1000);
}
