use watch::modes::{select_modes, DisplayFlags, Mode};

fn all_flags() -> DisplayFlags {
    DisplayFlags { all: true, ..Default::default() }
}

#[test]
fn all_expands_to_the_fixed_bundle() {
    let (modes, notices) = select_modes(&all_flags(), true);
    assert!(modes.contains(&Mode::Geometry));
    assert!(modes.contains(&Mode::Energies));
    assert!(modes.contains(&Mode::Data));
    assert!(modes.contains(&Mode::Best));
    assert!(modes.contains(&Mode::AllChainProfiles));
    assert!(modes.contains(&Mode::VpVs));
    assert!(notices.is_empty());
}

#[test]
fn all_without_s_waves_never_selects_vpvs() {
    let (modes, notices) = select_modes(&all_flags(), false);
    assert!(!modes.contains(&Mode::VpVs));
    // Vp/Vs was not explicitly requested, so there is nothing to complain
    // about either.
    assert!(notices.is_empty());
}

#[test]
fn explicit_vpvs_without_s_waves_yields_the_impossible_notice() {
    let flags = DisplayFlags { vpvs: true, ..Default::default() };
    let (modes, notices) = select_modes(&flags, false);
    assert!(modes.is_empty());
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("Impossible"), "got: {}", notices[0]);
}

#[test]
fn single_chain_request_maps_to_a_chain_scoped_mode() {
    let flags = DisplayFlags { results_chain: Some(2), ..Default::default() };
    let (modes, _) = select_modes(&flags, true);
    assert_eq!(modes, vec![Mode::ChainProfiles(2)]);
}

#[test]
fn results_flag_maps_to_the_global_figure() {
    let flags = DisplayFlags { results: true, ..Default::default() };
    let (modes, _) = select_modes(&flags, false);
    assert_eq!(modes, vec![Mode::GlobalProfiles]);
}

#[test]
fn no_flags_means_nothing_to_do() {
    let flags = DisplayFlags::default();
    assert!(!flags.any());
    let (modes, notices) = select_modes(&flags, true);
    assert!(modes.is_empty());
    assert!(notices.is_empty());
}

#[test]
fn routines_keep_a_stable_dispatch_order() {
    // Geometry first, energies second: the cheap figures come up before
    // the envelope sweep when everything is requested.
    let (modes, _) = select_modes(&all_flags(), true);
    assert_eq!(modes[0], Mode::Geometry);
    assert_eq!(modes[1], Mode::Energies);
}
