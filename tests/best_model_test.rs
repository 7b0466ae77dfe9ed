use watch::best::{kept_after, parse_best_filename, select_best, Wave};

#[test]
fn selector_returns_lowest_energy_index() {
    assert_eq!(select_best(&[5.0, 1.0, 3.0]), Some(1));
}

#[test]
fn selector_breaks_ties_by_lowest_index() {
    assert_eq!(select_best(&[2.0, 1.0, 1.0]), Some(1));
    assert_eq!(select_best(&[1.0, 1.0]), Some(0));
}

#[test]
fn selector_on_empty_list_is_none() {
    assert_eq!(select_best(&[]), None);
}

#[test]
fn threshold_filter_is_strictly_greater() {
    let iterations = [10usize, 60, 120];
    let kept = kept_after(&iterations, 50);
    let kept_iterations: Vec<usize> = kept.iter().map(|&i| iterations[i]).collect();
    assert_eq!(kept_iterations, vec![60, 120]);

    // A sample exactly at the threshold is dropped.
    assert_eq!(kept_after(&[50], 50), Vec::<usize>::new());
    // Threshold 0 keeps everything retained after the first iteration.
    assert_eq!(kept_after(&[10, 60, 120], 0), vec![0, 1, 2]);
}

#[test]
fn filename_grammar_roundtrip() {
    let meta = parse_best_filename("bestPprofile.idx60.chain2.E12.75.314.dat", "314").unwrap();
    assert_eq!(meta.wave, Wave::P);
    assert_eq!(meta.iteration, 60);
    assert_eq!(meta.chain, 2);
    assert!((meta.energy - 12.75).abs() < 1e-12);

    let meta = parse_best_filename("bestSprofile.idx60.chain2.E12.75.314.dat", "314").unwrap();
    assert_eq!(meta.wave, Wave::S);
}

#[test]
fn filename_grammar_survives_energy_code_collision() {
    // The energy text contains the run code; suffix-first parsing keeps
    // them apart.
    let meta = parse_best_filename("bestPprofile.idx120.chain3.E745.23.745.dat", "745").unwrap();
    assert_eq!(meta.iteration, 120);
    assert_eq!(meta.chain, 3);
    assert!((meta.energy - 745.23).abs() < 1e-12);
}

#[test]
fn filename_grammar_fails_loudly_on_foreign_names() {
    assert!(parse_best_filename("averageP0.745.dat", "745").is_err());
    assert!(parse_best_filename("bestPprofile.idx12.chain1.E3.0.999.dat", "745").is_err());
    assert!(parse_best_filename("bestPprofile.chain1.idx12.E3.0.745.dat", "745").is_err());
    assert!(parse_best_filename("bestPprofile.idxAB.chain1.E3.0.745.dat", "745").is_err());
}
