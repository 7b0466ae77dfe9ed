// store.rs - eager loader for one inversion result directory
//
// Resolves the run code, parses both configuration files and pulls every
// result array into memory before any rendering starts. One missing or
// malformed file aborts the whole run; the only optional file is
// bestModelTimes.<code>.dat, whose absence means the best model was never
// re-run through the forward solver.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use crate::best::{parse_best_filename, BestSample, Wave};
use crate::config::{RunConfig, RunInfo};
use crate::profile::{load_fixed_width, load_table, DepthProfile};

/// Per-depth summary curves of one wave type for one chain.
#[derive(Debug, Clone)]
pub struct ChainWave {
    pub average: DepthProfile,
    pub variance: DepthProfile,
    pub q_sup: DepthProfile,
    pub q_inf: DepthProfile,
    pub min: DepthProfile,
    pub max: DepthProfile,
}

/// Aggregates over all chains for one wave type.
#[derive(Debug, Clone)]
pub struct GlobalWave {
    pub average: DepthProfile,
    pub variance: DepthProfile,
    pub min: DepthProfile,
    pub max: DepthProfile,
}

/// One parallel-tempering replica: its fixed temperature, its energy trace
/// and its per-depth statistics. Read-only to every renderer.
#[derive(Debug, Clone)]
pub struct ChainSummary {
    pub index: usize,
    pub temperature: f64,
    /// Energy sample per iteration (last column of the chain trace file).
    pub energy: Vec<f64>,
    pub p: ChainWave,
    pub s: Option<ChainWave>,
}

/// First-guess curve after convolution with one source wavelet.
#[derive(Debug, Clone)]
pub struct FilteredGuess {
    pub wavelet: String,
    pub p: DepthProfile,
    pub s: Option<DepthProfile>,
}

/// Geometry bounding box, X and Y expanded by the coordinate tolerance.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
}

#[derive(Debug)]
pub struct ResultStore {
    pub dir: PathBuf,
    pub code: String,
    pub cfg: RunConfig,
    pub info: RunInfo,
    pub chains: Vec<ChainSummary>,
    pub global_p: GlobalWave,
    pub global_s: Option<GlobalWave>,
    pub global_var_vpvs: Option<DepthProfile>,
    pub shots: Vec<[f64; 3]>,
    pub stations: Vec<[f64; 3]>,
    pub first_guess_p: DepthProfile,
    pub first_guess_s: DepthProfile,
    pub real_p: Option<DepthProfile>,
    pub real_s: Option<DepthProfile>,
    pub prior_p: Vec<DepthProfile>,
    pub prior_s: Vec<DepthProfile>,
    /// Observed arrival times, [P, S] per receiver, shot-major.
    pub observed_times: Vec<[f64; 2]>,
    /// Predicted times of the best model, when it was re-run.
    pub best_model_times: Option<Vec<[f64; 2]>>,
    /// Raw swap log (ll file), arbitrary width.
    pub swap_log: Vec<Vec<f64>>,
    pub best_p: Vec<BestSample>,
    pub best_s: Vec<BestSample>,
    pub filtered: Vec<FilteredGuess>,
}

impl ResultStore {
    /// Run code from the first `stats0.<code>...` entry; `None` when the
    /// directory does not look like an inversion output directory.
    pub fn discover_code(dir: &Path) -> Option<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .ok()?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with("stats0."))
            .collect();
        names.sort();
        let code = names.first()?.split('.').nth(1)?.to_string();
        if code.chars().all(|c| c.is_ascii_digit()) && !code.is_empty() {
            Some(code)
        } else {
            None
        }
    }

    pub fn open(dir: &Path, code: &str, verbose: bool) -> Result<Self, Box<dyn Error>> {
        let cfg = RunConfig::load(&dir.join("config.cfg"))?;
        let info = RunInfo::load(&dir.join(format!("config.{code}.dat")))?;
        let nbt = info.n_chains();

        if verbose {
            println!("Watching the results of run : {code} ...");
            if cfg.analytical {
                println!("This is an analytical run");
            }
            if cfg.swaves {
                println!("S waves arrival times were calculated");
            }
            print!("There are {nbt} temperatures (tmax = {}) :", info.t_max);
            for (i, t) in info.temperatures.iter().enumerate() {
                print!(" T[{i}] = {t}");
            }
            println!();
            println!("Loading files ...");
        }

        let file = |name: String| dir.join(name);
        let profile = |name: String| DepthProfile::load(&file(name));

        let bar = ProgressBar::new(nbt as u64);
        bar.set_style(
            ProgressStyle::with_template(" {bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}]")
                .unwrap(),
        );

        let mut chains = Vec::with_capacity(nbt);
        for i in 0..nbt {
            let trace = load_table(&file(format!("chain{i}.{code}.dat")))?;
            let energy = trace
                .iter()
                .map(|row| row.last().copied().ok_or("empty row in chain trace"))
                .collect::<Result<Vec<f64>, _>>()?;
            let p = ChainWave {
                average: profile(format!("averageP{i}.{code}.dat"))?,
                variance: profile(format!("varP{i}.{code}.dat"))?,
                q_sup: profile(format!("qSupP{i}.{code}.dat"))?,
                q_inf: profile(format!("qInfP{i}.{code}.dat"))?,
                min: profile(format!("minP.{i}.{code}.dat"))?,
                max: profile(format!("maxP.{i}.{code}.dat"))?,
            };
            let s = if cfg.swaves {
                Some(ChainWave {
                    average: profile(format!("averageS{i}.{code}.dat"))?,
                    variance: profile(format!("varS{i}.{code}.dat"))?,
                    q_sup: profile(format!("qSupS{i}.{code}.dat"))?,
                    q_inf: profile(format!("qInfS{i}.{code}.dat"))?,
                    min: profile(format!("minS.{i}.{code}.dat"))?,
                    max: profile(format!("maxS.{i}.{code}.dat"))?,
                })
            } else {
                None
            };
            chains.push(ChainSummary {
                index: i,
                temperature: info.temperatures[i],
                energy,
                p,
                s,
            });
            bar.inc(1);
        }
        bar.finish_and_clear();

        let global_p = GlobalWave {
            average: profile(format!("globalAverageP.{code}.dat"))?,
            variance: profile(format!("globalVarP.{code}.dat"))?,
            min: profile(format!("minP.{code}.dat"))?,
            max: profile(format!("maxP.{code}.dat"))?,
        };
        let (global_s, global_var_vpvs) = if cfg.swaves {
            (
                Some(GlobalWave {
                    average: profile(format!("globalAverageS.{code}.dat"))?,
                    variance: profile(format!("globalVarS.{code}.dat"))?,
                    min: profile(format!("minS.{code}.dat"))?,
                    max: profile(format!("maxS.{code}.dat"))?,
                }),
                Some(profile(format!("globalVarVpVs.{code}.dat"))?),
            )
        } else {
            (None, None)
        };

        let shots = load_coords(&file(cfg.shots_file.clone()))?;
        let stations = load_coords(&file(cfg.stations_file.clone()))?;

        let first_guess_p = profile(cfg.first_guess_p_file.clone())?;
        let first_guess_s = profile(cfg.first_guess_s_file.clone())?;
        let (real_p, real_s) = if cfg.analytical {
            (
                Some(profile(cfg.real_profile_p_file.clone())?),
                Some(profile(cfg.real_profile_s_file.clone())?),
            )
        } else {
            (None, None)
        };

        let observed_times = if cfg.analytical {
            load_times(&file(format!("calculatedTimes.{code}.dat")))?
        } else {
            load_times(&file(cfg.times_file.clone()))?
        };
        let best_times_path = file(format!("bestModelTimes.{code}.dat"));
        let best_model_times = if best_times_path.is_file() {
            Some(load_times(&best_times_path)?)
        } else {
            None
        };

        let swap_log = load_table(&file(format!("ll.{code}.dat")))?;

        let mut prior_p = Vec::with_capacity(cfg.n_prior_profiles);
        let mut prior_s = Vec::with_capacity(cfg.n_prior_profiles);
        for i in 0..cfg.n_prior_profiles {
            let sub = dir.join(format!("priorProfiles{code}"));
            prior_p.push(DepthProfile::load(&sub.join(format!("priorProfileP.{code}.{i}.dat")))?);
            prior_s.push(DepthProfile::load(&sub.join(format!("priorProfileS.{code}.{i}.dat")))?);
        }

        let (best_p, best_s) = load_best_samples(dir, code)?;
        let filtered = load_filtered(dir)?;

        let store = ResultStore {
            dir: dir.to_path_buf(),
            code: code.to_string(),
            cfg,
            info,
            chains,
            global_p,
            global_s,
            global_var_vpvs,
            shots,
            stations,
            first_guess_p,
            first_guess_s,
            real_p,
            real_s,
            prior_p,
            prior_s,
            observed_times,
            best_model_times,
            swap_log,
            best_p,
            best_s,
            filtered,
        };

        if verbose {
            println!("Loading done !");
            println!();
            println!(
                "During this simulation the {} chains have run during {} steps",
                store.chains.len(),
                store.n_iterations()
            );
        }
        if store.n_iterations() < 50 {
            println!("Take care!! Below 50 iterations min and max profiles don't make sense!");
        }

        Ok(store)
    }

    pub fn n_chains(&self) -> usize {
        self.chains.len()
    }

    pub fn n_iterations(&self) -> usize {
        self.chains.first().map(|c| c.energy.len()).unwrap_or(0)
    }

    pub fn n_shots(&self) -> usize {
        self.shots.len()
    }

    pub fn n_stations(&self) -> usize {
        self.stations.len()
    }

    /// Depth grid of the chain statistics files.
    pub fn chain_depth_grid(&self) -> &[f64] {
        &self.chains[0].p.variance.depth
    }

    /// Depth grid of the first-guess profile.
    pub fn guess_depth_grid(&self) -> &[f64] {
        &self.first_guess_p.depth
    }

    /// Bounding box of shots and stations, X/Y expanded by COORD_TOL.
    pub fn bounds(&self) -> Bounds {
        let mut b = Bounds {
            xmin: f64::INFINITY,
            xmax: f64::NEG_INFINITY,
            ymin: f64::INFINITY,
            ymax: f64::NEG_INFINITY,
            zmin: f64::INFINITY,
            zmax: f64::NEG_INFINITY,
        };
        for c in self.shots.iter().chain(self.stations.iter()) {
            b.xmin = b.xmin.min(c[0]);
            b.xmax = b.xmax.max(c[0]);
            b.ymin = b.ymin.min(c[1]);
            b.ymax = b.ymax.max(c[1]);
            b.zmin = b.zmin.min(c[2]);
            b.zmax = b.zmax.max(c[2]);
        }
        let tol = self.cfg.coord_tol;
        let dx = (b.xmax - b.xmin) * tol;
        let dy = (b.ymax - b.ymin) * tol;
        b.xmin -= dx;
        b.xmax += dx;
        b.ymin -= dy;
        b.ymax += dy;
        b
    }

    pub fn best_energies(&self, wave: Wave) -> Vec<f64> {
        let list = match wave {
            Wave::P => &self.best_p,
            Wave::S => &self.best_s,
        };
        list.iter().map(|b| b.meta.energy).collect()
    }
}

fn load_coords(path: &Path) -> Result<Vec<[f64; 3]>, Box<dyn Error>> {
    Ok(load_fixed_width(path, 3)?
        .into_iter()
        .map(|row| [row[0], row[1], row[2]])
        .collect())
}

fn load_times(path: &Path) -> Result<Vec<[f64; 2]>, Box<dyn Error>> {
    Ok(load_fixed_width(path, 2)?
        .into_iter()
        .map(|row| [row[0], row[1]])
        .collect())
}

fn load_best_samples(
    dir: &Path,
    code: &str,
) -> Result<(Vec<BestSample>, Vec<BestSample>), Box<dyn Error>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("bestPprofile") || n.starts_with("bestSprofile"))
        .collect();
    names.sort();

    let mut best_p = Vec::new();
    let mut best_s = Vec::new();
    for name in names {
        let meta = parse_best_filename(&name, code)?;
        let profile = DepthProfile::load(&dir.join(&name))?;
        let sample = BestSample { meta, profile };
        match sample.meta.wave {
            Wave::P => best_p.push(sample),
            Wave::S => best_s.push(sample),
        }
    }
    Ok((best_p, best_s))
}

fn load_filtered(dir: &Path) -> Result<Vec<FilteredGuess>, Box<dyn Error>> {
    let mut wavelets: Vec<String> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("filteredFirstGuessP."))
        .filter_map(|n| n.split('.').nth(1).map(|w| w.to_string()))
        .collect();
    wavelets.sort();
    wavelets.dedup();

    let mut filtered = Vec::with_capacity(wavelets.len());
    for wavelet in wavelets {
        let p = DepthProfile::load(&dir.join(format!("filteredFirstGuessP.{wavelet}.dat")))?;
        let s_path = dir.join(format!("filteredFirstGuessS.{wavelet}.dat"));
        let s = if s_path.is_file() {
            Some(DepthProfile::load(&s_path)?)
        } else {
            None
        };
        filtered.push(FilteredGuess { wavelet, p, s });
    }
    Ok(filtered)
}
