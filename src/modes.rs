// modes.rs - maps the display flags to the set of rendering routines

/// Boolean display surface of the CLI, decoupled from the parser so the
/// expansion below stays testable on its own.
#[derive(Debug, Clone, Default)]
pub struct DisplayFlags {
    pub all: bool,
    pub data: bool,
    pub geometry: bool,
    pub energies: bool,
    pub best: bool,
    pub results: bool,
    /// `Some(i)` when a single chain was requested with --resultsChain.
    pub results_chain: Option<usize>,
    pub vpvs: bool,
    pub filtering: bool,
    pub swaps: bool,
    pub paper: bool,
}

impl DisplayFlags {
    /// True when at least one display mode was requested; with nothing
    /// selected the driver has nothing to do.
    pub fn any(&self) -> bool {
        self.all
            || self.data
            || self.geometry
            || self.energies
            || self.best
            || self.results
            || self.results_chain.is_some()
            || self.vpvs
            || self.filtering
            || self.swaps
            || self.paper
    }
}

/// One independent rendering routine. Routines never mutate the store and
/// may run in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Geometry,
    Energies,
    Data,
    /// Envelope figures for every chain plus the global figure.
    AllChainProfiles,
    /// Envelope figures for one chain.
    ChainProfiles(usize),
    GlobalProfiles,
    Best,
    VpVs,
    Filtering,
    Swaps,
    Paper,
}

/// Expand the flag set into the routines to run. `--all` is the fixed
/// bundle geometry + energies + best + data (+ Vp/Vs when S waves exist,
/// and the full per-chain profile sweep). A Vp/Vs request without S waves
/// produces a notice instead of a mode.
pub fn select_modes(flags: &DisplayFlags, swaves: bool) -> (Vec<Mode>, Vec<String>) {
    let mut modes = Vec::new();
    let mut notices = Vec::new();

    if flags.geometry || flags.all {
        modes.push(Mode::Geometry);
    }
    if flags.energies || flags.all {
        modes.push(Mode::Energies);
    }
    if flags.data || flags.all {
        modes.push(Mode::Data);
    }
    if flags.all {
        modes.push(Mode::AllChainProfiles);
    } else if let Some(i) = flags.results_chain {
        modes.push(Mode::ChainProfiles(i));
    }
    if flags.results {
        modes.push(Mode::GlobalProfiles);
    }
    if flags.best || flags.all {
        modes.push(Mode::Best);
    }
    if flags.vpvs || (flags.all && swaves) {
        if swaves {
            modes.push(Mode::VpVs);
        } else {
            notices.push(
                "Impossible to print Vp/Vs ratio as S waves arrival times \
                 had not been calculated during the run"
                    .to_string(),
            );
        }
    }
    if flags.filtering {
        modes.push(Mode::Filtering);
    }
    if flags.swaps {
        modes.push(Mode::Swaps);
    }
    if flags.paper {
        modes.push(Mode::Paper);
    }

    (modes, notices)
}
