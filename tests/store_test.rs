use std::fs;

use tempfile::TempDir;

use watch::best::Wave;
use watch::store::ResultStore;

mod common;
use common::{build_run_dir, write};

#[test]
fn discovers_the_run_code_from_the_stats_file() {
    let tmp = build_run_dir();
    assert_eq!(ResultStore::discover_code(tmp.path()), Some("900".to_string()));
}

#[test]
fn no_stats_file_means_no_code() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "whatever.dat", "1\n");
    assert_eq!(ResultStore::discover_code(tmp.path()), None);
}

#[test]
fn open_loads_the_whole_run() {
    let tmp = build_run_dir();
    let store = ResultStore::open(tmp.path(), "900", false).unwrap();

    assert_eq!(store.code, "900");
    assert_eq!(store.n_chains(), 2);
    assert_eq!(store.n_iterations(), 60);
    assert_eq!(store.chains[0].temperature, 1.0);
    assert_eq!(store.chains[1].temperature, 10.0);
    assert_eq!(store.chains[0].energy.len(), 60);
    assert!(store.chains[0].s.is_none(), "P-only run must not carry S stats");
    assert!(store.global_s.is_none());

    assert_eq!(store.n_shots(), 1);
    assert_eq!(store.n_stations(), 2);
    assert_eq!(store.observed_times.len(), 2);
    assert!(store.best_model_times.is_none());

    assert_eq!(store.chain_depth_grid(), &[0.0, 10.0, 20.0, 30.0]);
    assert_eq!(store.first_guess_p.len(), 4);
    assert_eq!(store.swap_log.len(), 3);
}

#[test]
fn retained_models_come_back_parsed_and_sorted() {
    let tmp = build_run_dir();
    let store = ResultStore::open(tmp.path(), "900", false).unwrap();

    assert_eq!(store.best_p.len(), 2);
    assert!(store.best_s.is_empty());
    let energies = store.best_energies(Wave::P);
    println!("retained energies: {energies:?}");
    assert!(energies.contains(&55.5));
    assert!(energies.contains(&22.25));
    let best = watch::best::select_best(&energies).unwrap();
    assert!((energies[best] - 22.25).abs() < 1e-12);
}

#[test]
fn bounds_expand_x_and_y_by_the_coordinate_tolerance() {
    let tmp = build_run_dir();
    let store = ResultStore::open(tmp.path(), "900", false).unwrap();
    let b = store.bounds();

    // x spans 0..100, y spans 0..50, tolerance 0.1.
    assert!((b.xmin + 10.0).abs() < 1e-12);
    assert!((b.xmax - 110.0).abs() < 1e-12);
    assert!((b.ymin + 5.0).abs() < 1e-12);
    assert!((b.ymax - 55.0).abs() < 1e-12);
    // z is not expanded.
    assert!((b.zmin - 0.0).abs() < 1e-12);
    assert!((b.zmax - 10.0).abs() < 1e-12);
}

#[test]
fn filtered_curves_are_keyed_by_wavelet() {
    let tmp = build_run_dir();
    let store = ResultStore::open(tmp.path(), "900", false).unwrap();
    assert_eq!(store.filtered.len(), 1);
    assert_eq!(store.filtered[0].wavelet, "ricker");
    assert!(store.filtered[0].s.is_none());
}

#[test]
fn a_missing_result_file_aborts_the_load() {
    let tmp = build_run_dir();
    fs::remove_file(tmp.path().join("globalVarP.900.dat")).unwrap();
    let err = ResultStore::open(tmp.path(), "900", false).unwrap_err().to_string();
    assert!(err.contains("globalVarP"), "error should name the file: {err}");
}

#[test]
fn a_malformed_row_aborts_the_load() {
    let tmp = build_run_dir();
    write(tmp.path(), "globalVarP.900.dat", "0 100\n10 not-a-number\n");
    assert!(ResultStore::open(tmp.path(), "900", false).is_err());
}
