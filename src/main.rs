//! Watch the results of an inversion run: load one result directory and
//! render the requested diagnostic figures.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use watch::export;
use watch::modes::{select_modes, DisplayFlags, Mode};
use watch::plot::{self, PlotOptions};
use watch::residuals::compute_residuals;
use watch::store::ResultStore;

#[derive(Parser)]
#[command(about = "Watch the results of a run")]
struct Cli {
    /// Path to result directory (ex : OUTPUT_FILES/XXX)
    path_to_dir: PathBuf,

    /// Increase output verbosity
    #[arg(short, long)]
    verbose: bool,

    /// Plot everything
    #[arg(short, long)]
    all: bool,

    /// Plot the first guess curve (and real curves for analytical runs)
    #[arg(short, long)]
    data: bool,

    /// Plot the geometry used (sources and receivers)
    #[arg(short, long)]
    geometry: bool,

    /// Plot the energies of the chains
    #[arg(short, long)]
    energies: bool,

    /// Plot some good models found and the residuals of the best
    #[arg(short, long)]
    best: bool,

    /// Don't show first guess model on plots
    #[arg(long = "dont_show_guess")]
    dont_show_guess: bool,

    /// Show exploration ranges on plots
    #[arg(long = "show_ranges")]
    show_ranges: bool,

    /// Show average models on plots
    #[arg(long = "show_averages")]
    show_averages: bool,

    /// Represent uncertainties by a range instead of a density strip
    #[arg(long = "no_density_plots")]
    no_density_plots: bool,

    /// Plot the results from the inversion
    #[arg(short, long)]
    results: bool,

    /// Plot the results from the inversion for given chain number
    #[arg(long = "resultsChain", default_value_t = -1)]
    results_chain: i64,

    /// Iteration after which we show the models calculated
    #[arg(short, long, default_value_t = 0)]
    treshold: usize,

    /// Force recalculate t0 (even if it had not been chosen during the run)
    #[arg(long = "recalculate_t0")]
    recalculate_t0: bool,

    /// Plot the swaps
    #[arg(short, long)]
    swaps: bool,

    /// Plot mean Vp/Vs ratio plus uncertainties
    #[arg(long)]
    vpvs: bool,

    /// Show optimum filtering
    #[arg(long)]
    filtering: bool,

    /// Plot the figures for the paper
    #[arg(long)]
    paper: bool,

    /// Directory the figures are written to (default: <dir>/figures)
    #[arg(long = "out_dir")]
    out_dir: Option<PathBuf>,

    /// Also write CSV summaries (retained models, residuals)
    #[arg(long)]
    export: bool,
}

impl Cli {
    fn display_flags(&self) -> DisplayFlags {
        DisplayFlags {
            all: self.all,
            data: self.data,
            geometry: self.geometry,
            energies: self.energies,
            best: self.best,
            results: self.results,
            results_chain: (self.results_chain >= 0).then(|| self.results_chain as usize),
            vpvs: self.vpvs,
            filtering: self.filtering,
            swaps: self.swaps,
            paper: self.paper,
        }
    }

    fn plot_options(&self) -> PlotOptions {
        PlotOptions {
            show_guess: !self.dont_show_guess,
            show_ranges: self.show_ranges,
            show_averages: self.show_averages,
            density: !self.no_density_plots,
            threshold: self.treshold,
            recalculate_t0: self.recalculate_t0,
            verbose: self.verbose,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    if !args.path_to_dir.is_dir() {
        println!("Directory {} not found.", args.path_to_dir.display());
        process::exit(0);
    }
    let code = match ResultStore::discover_code(&args.path_to_dir) {
        Some(code) => code,
        None => {
            println!(
                "Directory {} does not seem to be a correct result directory... (no stats0 found)",
                args.path_to_dir.display()
            );
            process::exit(0);
        }
    };

    let flags = args.display_flags();
    if !flags.any() {
        println!("Nothing has to be done!");
        process::exit(0);
    }

    let store = ResultStore::open(&args.path_to_dir, &code, args.verbose)?;

    if let Some(i) = flags.results_chain {
        if i >= store.n_chains() {
            println!("There were just {} chains running!", store.n_chains());
            println!("-> maximum index : {}", store.n_chains() - 1);
            process::exit(0);
        }
    }

    let (selected, notices) = select_modes(&flags, store.cfg.swaves);
    for notice in &notices {
        println!("{notice}");
    }

    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| args.path_to_dir.join("figures"));
    fs::create_dir_all(&out_dir)
        .map_err(|e| format!("cannot create {}: {e}", out_dir.display()))?;

    let opts = args.plot_options();
    let mut written = Vec::new();
    for mode in &selected {
        written.extend(run_mode(*mode, &store, &opts, &out_dir)?);
    }

    if args.export {
        written.push(export::write_best_models(&store, &out_dir)?);
        if let Some(predicted) = &store.best_model_times {
            let set = compute_residuals(
                predicted,
                &store.observed_times,
                store.n_shots(),
                store.n_stations(),
                store.cfg.swaves,
                store.cfg.recalculate_t0 || args.recalculate_t0,
            )?;
            written.extend(export::write_residuals(&store, &set, &out_dir)?);
        }
    }

    for path in &written {
        println!("wrote {}", path.display());
    }
    Ok(())
}

/// Registry of the rendering routines: every display mode maps to one
/// independent function over the read-only store.
fn run_mode(
    mode: Mode,
    store: &ResultStore,
    opts: &PlotOptions,
    out_dir: &std::path::Path,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    match mode {
        Mode::Geometry => plot::geometry(store, out_dir),
        Mode::Energies => plot::energies(store, opts, out_dir),
        Mode::Data => plot::data(store, opts, out_dir),
        Mode::AllChainProfiles => plot::all_chain_profiles(store, opts, out_dir),
        Mode::ChainProfiles(i) => plot::chain_profiles(store, opts, i, out_dir),
        Mode::GlobalProfiles => plot::global_profiles(store, opts, out_dir),
        Mode::Best => plot::best(store, opts, out_dir),
        Mode::VpVs => plot::vpvs(store, opts, out_dir),
        Mode::Filtering => plot::filtering(store, out_dir),
        Mode::Swaps => plot::swaps(store, out_dir),
        Mode::Paper => plot::paper(store, opts, out_dir),
    }
}
