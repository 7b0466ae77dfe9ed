use std::fs;

use tempfile::TempDir;

use watch::export;
use watch::residuals::ResidualSet;
use watch::store::ResultStore;

mod common;
use common::build_run_dir;

#[test]
fn best_model_summary_is_written_as_csv() {
    let tmp = build_run_dir();
    let store = ResultStore::open(tmp.path(), "900", false).unwrap();
    let out = TempDir::new().unwrap();

    let path = export::write_best_models(&store, out.path()).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("wave,iteration,chain,energy"));
    assert_eq!(lines.count(), 2);
    assert!(text.contains("P,10,0,55.5"));
    assert!(text.contains("P,40,1,22.25"));
}

#[test]
fn residual_tables_are_written_per_wave() {
    let tmp = build_run_dir();
    let store = ResultStore::open(tmp.path(), "900", false).unwrap();
    let out = TempDir::new().unwrap();

    let set = ResidualSet {
        p: vec![0.01, -0.02],
        ..Default::default()
    };
    let written = export::write_residuals(&store, &set, out.path()).unwrap();
    assert_eq!(written.len(), 1, "P-only run writes one residual table");
    let text = fs::read_to_string(&written[0]).unwrap();
    assert!(text.starts_with("receiver,residual"));
    assert!(text.contains("0,0.01"));
    assert!(text.contains("1,-0.02"));
}
