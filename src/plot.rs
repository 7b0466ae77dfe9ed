// plot.rs - the diagnostic figure set
//
// One routine per display mode. Every routine takes the loaded store by
// shared reference, renders PNG figures into the output directory and
// returns the paths it wrote. Routines are independent and idempotent;
// none mutates the store.

use std::error::Error;
use std::path::{Path, PathBuf};

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::best::{kept_after, select_best, BestSample};
use crate::density::{density_strip, DensityStrip, DENSITY_RESOLUTION};
use crate::profile::DepthProfile;
use crate::residuals::{compute_residuals, model_energy};
use crate::store::{ChainWave, GlobalWave, ResultStore};

/// Display options shared by the routines, fixed for the whole invocation.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub show_guess: bool,
    pub show_ranges: bool,
    pub show_averages: bool,
    /// Shade uncertainties as a density strip instead of bound curves.
    pub density: bool,
    /// Only samples retained strictly after this iteration are drawn.
    pub threshold: usize,
    /// Force the per-shot time-zero correction on the residuals.
    pub recalculate_t0: bool,
    pub verbose: bool,
}

const FIG_SIZE: (u32, u32) = (900, 700);
const PAPER_SIZE: (u32, u32) = (800, 1000);

// Curve colors of the figure set.
const GUESS_P: RGBColor = RGBColor(128, 128, 242);
const GUESS_S: RGBColor = RGBColor(128, 242, 128);
const REAL_P: RGBColor = RGBColor(0, 0, 128);
const REAL_S: RGBColor = RGBColor(0, 128, 0);
const AVERAGE: RGBColor = RGBColor(128, 128, 0);
const BOUND: RGBColor = RGBColor(77, 77, 179);
const CHAIN_RANGE: RGBColor = RGBColor(102, 204, 204);
const GLOBAL_RANGE: RGBColor = RED;
const FILTERED: RGBColor = RGBColor(128, 0, 0);

type Chart2d<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// (value, depth) pairs of a profile, ready for a depth chart.
fn curve(profile: &DepthProfile) -> Vec<(f64, f64)> {
    profile.value.iter().zip(&profile.depth).map(|(v, z)| (*v, *z)).collect()
}

fn pairs(values: &[f64], depths: &[f64]) -> Vec<(f64, f64)> {
    values.iter().zip(depths).map(|(v, z)| (*v, *z)).collect()
}

/// Rasterize a density strip onto a depth chart: one grayscale cell per
/// matrix entry, darker where the density is higher. Cells below 2% of the
/// peak are left white (and with them any non-finite entry from a
/// degenerate zero-sigma input).
fn draw_density(
    chart: &mut Chart2d,
    positions: &[f64],
    strip: &DensityStrip,
) -> Result<(), Box<dyn Error>> {
    let n = strip.n_positions();
    let m = strip.resolution();
    let peak = strip.peak();
    let dv = (strip.vmax - strip.vmin) / (m - 1) as f64;

    // Depth cell edges: midpoints between consecutive grid positions.
    let mut edges = Vec::with_capacity(n + 1);
    if n == 1 {
        edges.push(positions[0] - 0.5);
        edges.push(positions[0] + 0.5);
    } else {
        edges.push(positions[0] - (positions[1] - positions[0]) / 2.0);
        for w in positions.windows(2) {
            edges.push((w[0] + w[1]) / 2.0);
        }
        edges.push(positions[n - 1] + (positions[n - 1] - positions[n - 2]) / 2.0);
    }

    let mut cells = Vec::new();
    for i in 0..n {
        for j in 0..m {
            let norm = strip.intensity[(i, j)] / peak;
            if !(norm > 0.02) {
                continue;
            }
            let level = 255 - (norm.min(1.0) * 255.0) as u8;
            let v0 = strip.vmin + dv * (j as f64 - 0.5);
            cells.push(Rectangle::new(
                [(v0, edges[i]), (v0 + dv, edges[i + 1])],
                RGBColor(level, level, level).filled(),
            ));
        }
    }
    chart.draw_series(cells)?;
    Ok(())
}

/// How an envelope figure depicts its uncertainty band.
enum Band<'a> {
    /// Gaussian density strip along the chain depth grid.
    Density { z: &'a [f64], mean: Vec<f64>, sigma: Vec<f64> },
    /// Dashed-style upper/lower bound curves.
    Curves { z: &'a [f64], upper: Vec<f64>, lower: Vec<f64>, label: String },
}

struct EnvelopeFigure<'a> {
    out: PathBuf,
    title: String,
    xlabel: String,
    xlim: (f64, f64),
    zfilt: &'a [f64],
    guess: Option<(&'a DepthProfile, RGBColor)>,
    real: Option<(&'a DepthProfile, RGBColor)>,
    average: Option<&'a DepthProfile>,
    show_average_again: bool,
    band: Band<'a>,
    chain_range: Option<(&'a DepthProfile, &'a DepthProfile, String)>,
    global_range: Option<(&'a DepthProfile, &'a DepthProfile)>,
}

/// Velocity-versus-depth figure with an uncertainty band; shared by the
/// per-chain and global profile routines.
fn envelope_figure(fig: EnvelopeFigure<'_>) -> Result<(), Box<dyn Error>> {
    let zmin = fig.zfilt.iter().copied().fold(f64::INFINITY, f64::min);
    let zmax = fig.zfilt.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let root = BitMapBackend::new(&fig.out, FIG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(&fig.title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(fig.xlim.0..fig.xlim.1, zmax..zmin)?;
    chart
        .configure_mesh()
        .x_desc(fig.xlabel.clone())
        .y_desc("Depth (m)")
        .draw()?;

    if let Band::Density { z, mean, sigma } = &fig.band {
        let strip = density_strip(z, mean, sigma, DENSITY_RESOLUTION)?;
        draw_density(&mut chart, z, &strip)?;
    }

    if let Some((upper, lower, label)) = &fig.chain_range {
        chart
            .draw_series(LineSeries::new(curve(upper), &CHAIN_RANGE))?
            .label(label.clone())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], CHAIN_RANGE));
        chart.draw_series(LineSeries::new(curve(lower), &CHAIN_RANGE))?;
    }
    if let Some((guess, color)) = fig.guess {
        chart
            .draw_series(LineSeries::new(curve(guess), color.stroke_width(3)))?
            .label("First guess velocity profile")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }
    if let Some((real, color)) = fig.real {
        chart
            .draw_series(LineSeries::new(curve(real), color.stroke_width(3)))?
            .label("Real velocity profile")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }
    if let Some(average) = fig.average {
        chart
            .draw_series(LineSeries::new(curve(average), AVERAGE.stroke_width(3)))?
            .label("Average profile")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], AVERAGE));
        if fig.show_average_again {
            chart
                .draw_series(LineSeries::new(curve(average), &AVERAGE))?
                .label("Average model")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], AVERAGE));
        }
    }
    if let Band::Curves { z, upper, lower, label } = &fig.band {
        chart
            .draw_series(LineSeries::new(pairs(upper, z), &BOUND))?
            .label(label.clone())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BOUND));
        chart.draw_series(LineSeries::new(pairs(lower, z), &BOUND))?;
    }
    if let Some((upper, lower)) = fig.global_range {
        chart
            .draw_series(LineSeries::new(curve(upper), &GLOBAL_RANGE))?
            .label("Range investigated by all chains")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GLOBAL_RANGE));
        chart.draw_series(LineSeries::new(curve(lower), &GLOBAL_RANGE))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// X-axis limits padded by a tenth of the globally investigated span.
fn padded_xlim(global: &GlobalWave) -> (f64, f64) {
    let mini = global.min.value_min();
    let maxi = global.max.value_max();
    let pad = (maxi - mini) / 10.0;
    (mini - pad, maxi + pad)
}

// ---------------------------------------------------------------------
// Geometry

pub fn geometry(store: &ResultStore, out_dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let path = out_dir.join(format!("geometry.{}.png", store.code));
    let b = store.bounds();

    let root = BitMapBackend::new(&path, FIG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Geometry", ("sans-serif", 28))
        .margin(10)
        .build_cartesian_3d(b.xmin..b.xmax, b.zmax..b.zmin, b.ymin..b.ymax)?;
    chart.configure_axes().draw()?;

    chart.draw_series(
        store
            .stations
            .iter()
            .map(|c| Circle::new((c[0], c[2], c[1]), 3, BLUE.filled())),
    )?;
    let shot_size = if store.shots.len() > 1 { 5 } else { 9 };
    chart.draw_series(
        store
            .shots
            .iter()
            .map(|c| TriangleMarker::new((c[0], c[2], c[1]), shot_size, RED.filled())),
    )?;
    root.present()?;
    Ok(vec![path.clone()])
}

// ---------------------------------------------------------------------
// Energies

pub fn energies(
    store: &ResultStore,
    opts: &PlotOptions,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let path = out_dir.join(format!("energies.{}.png", store.code));
    energy_trace_figure(store, opts, &path, store.n_chains())?;
    Ok(vec![path])
}

/// Semilog energy traces of the first `max_chains` chains, each multiplied
/// by its ladder temperature, with the retained-model markers.
fn energy_trace_figure(
    store: &ResultStore,
    opts: &PlotOptions,
    path: &Path,
    max_chains: usize,
) -> Result<(), Box<dyn Error>> {
    let nit = store.n_iterations();
    let ep = store.info.prior_energy;

    // Retained-model markers: (iteration, tempered energy at retention).
    let meta: Vec<_> = store.best_p.iter().map(|b| b.meta.clone()).collect();
    let energies: Vec<f64> = meta.iter().map(|m| m.energy).collect();
    let iterations: Vec<usize> = meta.iter().map(|m| m.iteration).collect();
    let marker = |it: usize, chain: usize| -> Option<(f64, f64)> {
        let c = store.chains.get(chain)?;
        let e = c.energy.get(it)?;
        Some((it as f64, e * c.temperature))
    };
    let idx_best = select_best(&energies);
    let kept = kept_after(&iterations, opts.threshold);
    if opts.verbose {
        println!("Models kept after iteration : {} will be shown", opts.threshold);
    }

    let mut ymin = f64::INFINITY;
    let mut ymax = f64::NEG_INFINITY;
    for c in store.chains.iter().take(max_chains) {
        for &e in &c.energy {
            let v = e * c.temperature;
            if v > 0.0 {
                ymin = ymin.min(v);
                ymax = ymax.max(v);
            }
        }
    }
    if ep > 0.0 {
        ymin = ymin.min(ep);
        ymax = ymax.max(ep);
    }
    if !ymin.is_finite() || !ymax.is_finite() {
        ymin = 1e-3;
        ymax = 1.0;
    }

    let root = BitMapBackend::new(path, FIG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(
            0f64..(nit.max(2) - 1) as f64,
            ((ymin * 0.5)..(ymax * 2.0)).log_scale(),
        )?;
    chart
        .configure_mesh()
        .x_desc("Iteration number")
        .y_desc("Energy")
        .draw()?;

    for c in store.chains.iter().take(max_chains) {
        let color = Palette99::pick(c.index).to_rgba();
        let len = c.energy.len().min(nit);
        chart.draw_series(LineSeries::new(
            c.energy[..len]
                .iter()
                .enumerate()
                .map(|(k, &e)| (k as f64, e * c.temperature)),
            &color,
        ))?;
    }

    let kept_points: Vec<(f64, f64)> = kept
        .iter()
        .filter_map(|&j| marker(meta[j].iteration, meta[j].chain))
        .collect();
    if !kept_points.is_empty() {
        chart
            .draw_series(kept_points.iter().map(|&p| Circle::new(p, 4, BLUE.filled())))?
            .label("Best models saved")
            .legend(|(x, y)| Circle::new((x + 10, y), 4, BLUE.filled()));
    }
    if let Some(j) = idx_best {
        if let Some(p) = marker(meta[j].iteration, meta[j].chain) {
            chart
                .draw_series(std::iter::once(Circle::new(p, 5, RED.filled())))?
                .label("Best model")
                .legend(|(x, y)| Circle::new((x + 10, y), 5, RED.filled()));
        }
    }

    if store.cfg.recalculate_t0 {
        // Behind this line every model is acceptable: one sigma of misfit
        // per measurement.
        let level = if store.cfg.swaves {
            (store.n_stations() * store.n_shots()) as f64 + ep
        } else {
            (store.n_stations() * store.n_shots()) as f64 / 2.0 + ep
        };
        chart
            .draw_series(LineSeries::new(
                [(0.0, level), ((nit.max(2) - 1) as f64, level)],
                BLUE.stroke_width(2),
            ))?
            .label("Acceptable misfit level")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    }
    if ep > 0.0 {
        chart
            .draw_series(LineSeries::new(
                [(0.0, ep), ((nit.max(2) - 1) as f64, ep)],
                &BLACK,
            ))?
            .label("Prior's energy")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------
// First guess and prior profiles

pub fn data(
    store: &ResultStore,
    _opts: &PlotOptions,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut written = Vec::new();
    let z = &store.first_guess_p;
    let zmin = z.depth_min();
    let zmax = z.depth_max();

    let path = out_dir.join(format!("firstGuess.{}.png", store.code));
    {
        let root = BitMapBackend::new(&path, FIG_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let title = if store.cfg.swaves {
            "First guess velocity profiles"
        } else {
            "First guess velocity profile"
        };
        let mut xmin = store.first_guess_p.value_min();
        let mut xmax = store.first_guess_p.value_max();
        if store.cfg.swaves {
            xmin = xmin.min(store.first_guess_s.value_min());
        }
        if let Some(real) = &store.real_p {
            xmax = xmax.max(real.value_max());
            xmin = xmin.min(real.value_min());
        }
        let pad = (xmax - xmin) / 20.0;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((xmin - pad)..(xmax + pad), zmax..zmin)?;
        chart
            .configure_mesh()
            .x_desc("Wave speed (m/s)")
            .y_desc("Depth (m)")
            .draw()?;

        chart.draw_series(LineSeries::new(curve(&store.first_guess_p), &GUESS_P))?;
        if store.cfg.swaves {
            chart.draw_series(LineSeries::new(curve(&store.first_guess_s), &GUESS_S))?;
        }
        if let Some(real) = &store.real_p {
            chart.draw_series(LineSeries::new(curve(real), REAL_P.stroke_width(3)))?;
        }
        if store.cfg.swaves {
            if let Some(real) = &store.real_s {
                chart.draw_series(LineSeries::new(curve(real), REAL_S.stroke_width(3)))?;
            }
        }
        root.present()?;
    }
    written.push(path);

    if !store.prior_p.is_empty() {
        written.push(prior_figure(store, out_dir, 'P', 1, "prior")?);
        if store.cfg.swaves {
            written.push(prior_figure(store, out_dir, 'S', 1, "prior")?);
        }
    }
    Ok(written)
}

/// Prior-draw overlay over the first guess; `stride` thins the profiles
/// (the publication variant shows every third one).
fn prior_figure(
    store: &ResultStore,
    out_dir: &Path,
    wave: char,
    stride: usize,
    prefix: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let (guess, priors, real, color) = if wave == 'P' {
        (&store.first_guess_p, &store.prior_p, &store.real_p, GUESS_P)
    } else {
        (&store.first_guess_s, &store.prior_s, &store.real_s, GUESS_S)
    };
    let path = out_dir.join(format!("{prefix}{wave}.{}.png", store.code));

    let zmin = guess.depth_min();
    let zmax = guess.depth_max();
    let mut xmin = guess.value_min();
    let mut xmax = guess.value_max();
    for p in priors.iter() {
        xmin = xmin.min(p.value_min());
        xmax = xmax.max(p.value_max());
    }
    let pad = (xmax - xmin) / 20.0;

    let root = BitMapBackend::new(&path, FIG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((xmin - pad)..(xmax + pad), zmax..zmin)?;
    chart
        .configure_mesh()
        .x_desc(format!("{wave} wave velocity profiles from prior (m/s)"))
        .y_desc("Depth (m)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(curve(guess), &color))?
        .label(format!("{wave} wave sonic log"))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    if let Some(real) = real {
        let real_color = if wave == 'P' { REAL_P } else { REAL_S };
        chart.draw_series(LineSeries::new(curve(real), real_color.stroke_width(3)))?;
    }
    let mut labelled = false;
    for (i, p) in priors.iter().enumerate() {
        if i % stride != 0 {
            continue;
        }
        let series = chart.draw_series(LineSeries::new(curve(p), &MAGENTA))?;
        if !labelled {
            series
                .label(format!("{wave} wave velocity profiles from prior"))
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MAGENTA));
            labelled = true;
        }
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(path.clone())
}

// ---------------------------------------------------------------------
// Per-chain and global envelopes

pub fn chain_profiles(
    store: &ResultStore,
    opts: &PlotOptions,
    chain: usize,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut written = Vec::new();
    let c = &store.chains[chain];

    written.push(one_chain_figure(store, opts, chain, &c.p, 'P', out_dir)?);
    if let Some(s) = &c.s {
        written.push(one_chain_figure(store, opts, chain, s, 'S', out_dir)?);
    }
    Ok(written)
}

fn one_chain_figure(
    store: &ResultStore,
    opts: &PlotOptions,
    chain: usize,
    wave: &ChainWave,
    letter: char,
    out_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    let (global, guess, real, guess_color) = if letter == 'P' {
        (&store.global_p, &store.first_guess_p, &store.real_p, GUESS_P)
    } else {
        (
            store.global_s.as_ref().ok_or("S-wave globals missing")?,
            &store.first_guess_s,
            &store.real_s,
            GUESS_S,
        )
    };
    let path = out_dir.join(format!("chain{letter}.{chain}.{}.png", store.code));
    let zfilt = &wave.variance.depth;

    // Density strip from the quantile envelope: midpoint and half-width.
    let band = if opts.density {
        Band::Density {
            z: &wave.q_sup.depth,
            mean: wave
                .q_sup
                .value
                .iter()
                .zip(&wave.q_inf.value)
                .map(|(s, i)| (s + i) / 2.0)
                .collect(),
            sigma: wave
                .q_sup
                .value
                .iter()
                .zip(&wave.q_inf.value)
                .map(|(s, i)| (s - i) / 2.0)
                .collect(),
        }
    } else {
        Band::Curves {
            z: &wave.q_sup.depth,
            upper: wave.q_sup.value.clone(),
            lower: wave.q_inf.value.clone(),
            label: format!("{}% confidence interval", store.cfg.qp),
        }
    };

    envelope_figure(EnvelopeFigure {
        out: path.clone(),
        title: format!("Chain {chain}"),
        xlabel: format!("{letter} waves velocity (m/s)"),
        xlim: padded_xlim(global),
        zfilt,
        guess: opts.show_guess.then_some((guess, guess_color)),
        real: real.as_ref().map(|r| {
            (r, if letter == 'P' { REAL_P } else { REAL_S })
        }),
        average: Some(&wave.average),
        show_average_again: opts.show_averages,
        band,
        chain_range: opts.show_ranges.then(|| {
            (
                &wave.max,
                &wave.min,
                format!("Range investigated by chain {chain}"),
            )
        }),
        global_range: opts.show_ranges.then_some((&global.max, &global.min)),
    })?;
    Ok(path)
}

pub fn all_chain_profiles(
    store: &ResultStore,
    opts: &PlotOptions,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut written = Vec::new();
    for i in 0..store.n_chains() {
        written.extend(chain_profiles(store, opts, i, out_dir)?);
    }
    Ok(written)
}

pub fn global_profiles(
    store: &ResultStore,
    opts: &PlotOptions,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut written = Vec::new();
    written.push(one_global_figure(store, opts, 'P', out_dir)?);
    if store.cfg.swaves {
        written.push(one_global_figure(store, opts, 'S', out_dir)?);
    }
    Ok(written)
}

fn one_global_figure(
    store: &ResultStore,
    opts: &PlotOptions,
    letter: char,
    out_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    let (global, guess, real, guess_color) = if letter == 'P' {
        (&store.global_p, &store.first_guess_p, &store.real_p, GUESS_P)
    } else {
        (
            store.global_s.as_ref().ok_or("S-wave globals missing")?,
            &store.first_guess_s,
            &store.real_s,
            GUESS_S,
        )
    };
    let path = out_dir.join(format!("global{letter}.{}.png", store.code));
    let zfilt = &global.variance.depth;
    let sigma: Vec<f64> = global.variance.value.iter().map(|v| v.sqrt()).collect();

    let band = if opts.density {
        Band::Density {
            z: &global.average.depth,
            mean: global.average.value.clone(),
            sigma,
        }
    } else {
        Band::Curves {
            z: &global.average.depth,
            upper: global
                .average
                .value
                .iter()
                .zip(&sigma)
                .map(|(a, s)| a + s)
                .collect(),
            lower: global
                .average
                .value
                .iter()
                .zip(&sigma)
                .map(|(a, s)| a - s)
                .collect(),
            label: "Standard deviation".to_string(),
        }
    };

    envelope_figure(EnvelopeFigure {
        out: path.clone(),
        title: "Global results".to_string(),
        xlabel: format!("{letter} waves velocity (m/s)"),
        xlim: padded_xlim(global),
        zfilt,
        guess: opts.show_guess.then_some((guess, guess_color)),
        real: real.as_ref().map(|r| {
            (r, if letter == 'P' { REAL_P } else { REAL_S })
        }),
        // The global average shares the guess toggle.
        average: opts.show_guess.then_some(&global.average),
        show_average_again: false,
        band,
        chain_range: None,
        global_range: opts.show_ranges.then_some((&global.max, &global.min)),
    })?;
    Ok(path)
}

// ---------------------------------------------------------------------
// Best models and residuals

pub fn best(
    store: &ResultStore,
    opts: &PlotOptions,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut written = Vec::new();

    match &store.best_model_times {
        Some(predicted) => {
            let recalc = store.cfg.recalculate_t0 || opts.recalculate_t0;
            let set = compute_residuals(
                predicted,
                &store.observed_times,
                store.n_shots(),
                store.n_stations(),
                store.cfg.swaves,
                recalc,
            )?;
            if opts.verbose && recalc {
                for (i, t0) in set.t0_p.iter().enumerate() {
                    println!("t0P[{i}] = {t0}");
                }
                for (i, t0) in set.t0_s.iter().enumerate() {
                    println!("t0S[{i}] = {t0}");
                }
            }

            let p_path = out_dir.join(format!("residualsP.{}.png", store.code));
            residual_figure(&p_path, &set.p, store.cfg.sigma_p, 20.0, 'P')?;
            written.push(p_path);
            if store.cfg.swaves {
                let s_path = out_dir.join(format!("residualsS.{}.png", store.code));
                residual_figure(&s_path, &set.s, store.cfg.sigma_s, 20.0, 'S')?;
                written.push(s_path);
            }

            if opts.verbose {
                let sigma_s = store.cfg.swaves.then_some(store.cfg.sigma_s);
                let e = model_energy(&set, store.cfg.sigma_p, sigma_s, store.info.prior_energy);
                println!("Energy of best model : {e}");
            }
        }
        None => println!("The best model has not been calculated"),
    }

    if opts.verbose {
        println!("Number of good model kept : {}", store.best_p.len());
        for (i, b) in store.best_p.iter().enumerate() {
            println!(
                "Model number : {} -> generated by chain {} at iteration {} (energy {})",
                i + 1,
                b.meta.chain,
                b.meta.iteration,
                b.meta.energy
            );
        }
    }

    if !store.best_p.is_empty() {
        let path = out_dir.join(format!("bestP.{}.png", store.code));
        best_profiles_figure(store, opts, &store.best_p, 'P', &path)?;
        written.push(path);
    }
    if store.cfg.swaves && !store.best_s.is_empty() {
        let path = out_dir.join(format!("bestS.{}.png", store.code));
        best_profiles_figure(store, opts, &store.best_s, 'S', &path)?;
        written.push(path);
    }
    Ok(written)
}

/// Residual scatter with the 1/2/3 sigma guide bands.
fn residual_figure(
    path: &Path,
    diffs: &[f64],
    sigma: f64,
    ylim_sigmas: f64,
    wave: char,
) -> Result<(), Box<dyn Error>> {
    let n = diffs.len().max(2);
    let root = BitMapBackend::new(path, FIG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Best model residuals", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(
            0f64..(n - 1) as f64,
            (-ylim_sigmas * sigma)..(ylim_sigmas * sigma),
        )?;
    chart
        .configure_mesh()
        .x_desc("Receiver number")
        .y_desc(format!("{wave} waves arrival times residuals (s)"))
        .draw()?;

    let shades = [
        (1.0, RGBColor(0, 0, 255), 2),
        (2.0, RGBColor(77, 77, 255), 2),
        (3.0, RGBColor(128, 128, 255), 1),
    ];
    for (k, color, width) in shades {
        for sign in [1.0, -1.0] {
            chart.draw_series(LineSeries::new(
                [(0.0, sign * k * sigma), ((n - 1) as f64, sign * k * sigma)],
                color.stroke_width(width),
            ))?;
        }
        chart.draw_series(std::iter::once(Text::new(
            format!("{} sigma", k as u32),
            ((0.6 + 0.1 * k) * (n - 1) as f64, (k + 0.1) * sigma),
            ("sans-serif", 22).into_font().color(&color),
        )))?;
    }
    chart.draw_series(
        diffs
            .iter()
            .enumerate()
            .map(|(i, &d)| Cross::new((i as f64, d), 4, GREEN.filled())),
    )?;
    root.present()?;
    Ok(())
}

/// Retained-model spaghetti; the minimum-energy model is emphasized.
fn best_profiles_figure(
    store: &ResultStore,
    opts: &PlotOptions,
    samples: &[BestSample],
    letter: char,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let global = if letter == 'P' {
        &store.global_p
    } else {
        store.global_s.as_ref().ok_or("S-wave globals missing")?
    };
    let real = if letter == 'P' { &store.real_p } else { &store.real_s };
    let xlim = padded_xlim(global);

    let energies: Vec<f64> = samples.iter().map(|b| b.meta.energy).collect();
    let idx_best = select_best(&energies);
    let iterations: Vec<usize> = samples.iter().map(|b| b.meta.iteration).collect();
    let kept = kept_after(&iterations, opts.threshold);
    if opts.verbose {
        println!("Models kept after iteration : {} will be shown", opts.threshold);
    }

    let zmin = store.first_guess_p.depth_min();
    let zmax = store.first_guess_p.depth_max();

    let root = BitMapBackend::new(path, FIG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(xlim.0..xlim.1, zmax..zmin)?;
    chart
        .configure_mesh()
        .x_desc(format!("Best {letter} wave velocity models (m/s)"))
        .y_desc("Depth (m)")
        .draw()?;

    if let Some(real) = real {
        chart
            .draw_series(LineSeries::new(curve(real), REAL_P.stroke_width(3)))?
            .label("Real velocity profile")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], REAL_P));
    }
    for (rank, &i) in kept.iter().enumerate() {
        let color = Palette99::pick(rank).to_rgba();
        let series = chart.draw_series(LineSeries::new(
            curve(&samples[i].profile),
            if Some(i) == idx_best {
                color.stroke_width(4)
            } else {
                color.stroke_width(1)
            },
        ))?;
        if Some(i) == idx_best {
            series
                .label("Best model")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------
// Vp/Vs

pub fn vpvs(
    store: &ResultStore,
    opts: &PlotOptions,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut written = Vec::new();
    for i in 0..store.n_chains() {
        let c = &store.chains[i];
        let s = c.s.as_ref().ok_or("S-wave statistics missing")?;
        let path = out_dir.join(format!("vpvsChain.{i}.{}.png", store.code));
        let ratio = ratio_band(&c.p.average, &c.p.variance, &s.average, &s.variance);
        vpvs_figure(
            store,
            &path,
            &ratio,
            format!("Average Vp/Vs for chain {i}"),
            None,
            false,
        )?;
        written.push(path);
    }

    let global_s = store.global_s.as_ref().ok_or("S-wave globals missing")?;
    let path = out_dir.join(format!("vpvsGlobal.{}.png", store.code));
    let ratio = ratio_band(
        &store.global_p.average,
        &store.global_p.variance,
        &global_s.average,
        &global_s.variance,
    );
    vpvs_figure(
        store,
        &path,
        &ratio,
        "Global average Vp/Vs".to_string(),
        store.global_var_vpvs.as_ref(),
        opts.verbose,
    )?;
    written.push(path);
    Ok(written)
}

struct RatioBand {
    z: Vec<f64>,
    mean: Vec<f64>,
    /// Mean ratio scaled by the summed fractional uncertainties of the two
    /// averages (a first-order error propagation, not a real stddev).
    uncertainty: Vec<f64>,
}

fn ratio_band(
    avg_p: &DepthProfile,
    var_p: &DepthProfile,
    avg_s: &DepthProfile,
    var_s: &DepthProfile,
) -> RatioBand {
    let mut z = Vec::with_capacity(avg_p.len());
    let mut mean = Vec::with_capacity(avg_p.len());
    let mut uncertainty = Vec::with_capacity(avg_p.len());
    for i in 0..avg_p.len() {
        let vp_frac = var_p.value[i].sqrt() / avg_p.value[i];
        let vs_frac = var_s.value[i].sqrt() / avg_s.value[i];
        let ratio = avg_p.value[i] / avg_s.value[i];
        z.push(avg_p.depth[i]);
        mean.push(ratio);
        uncertainty.push(ratio * (vp_frac + vs_frac));
    }
    RatioBand { z, mean, uncertainty }
}

fn vpvs_figure(
    store: &ResultStore,
    path: &Path,
    band: &RatioBand,
    mean_label: String,
    var_vpvs: Option<&DepthProfile>,
    _verbose: bool,
) -> Result<(), Box<dyn Error>> {
    let zmin = band.z.iter().copied().fold(f64::INFINITY, f64::min);
    let zmax = band.z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut xmin = f64::INFINITY;
    let mut xmax = f64::NEG_INFINITY;
    for i in 0..band.mean.len() {
        xmin = xmin.min(band.mean[i] - band.uncertainty[i]);
        xmax = xmax.max(band.mean[i] + band.uncertainty[i]);
    }
    let pad = (xmax - xmin) / 10.0;

    let root = BitMapBackend::new(path, FIG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((xmin - pad)..(xmax + pad), zmax..zmin)?;
    chart
        .configure_mesh()
        .x_desc("Ratio Vp/Vs")
        .y_desc("Depth (m)")
        .draw()?;

    if let Some(var) = var_vpvs {
        // Posterior stddev of the ratio itself, scaled down as the
        // envelope over-counts the tempered chains.
        let upper: Vec<(f64, f64)> = band
            .mean
            .iter()
            .zip(&var.value)
            .zip(&band.z)
            .map(|((m, v), z)| (m + v.sqrt() / 3.0, *z))
            .collect();
        let lower: Vec<(f64, f64)> = band
            .mean
            .iter()
            .zip(&var.value)
            .zip(&band.z)
            .map(|((m, v), z)| (m - v.sqrt() / 3.0, *z))
            .collect();
        let color = RGBColor(77, 128, 179);
        chart
            .draw_series(LineSeries::new(upper, &color))?
            .label("Real standard deviation")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart.draw_series(LineSeries::new(lower, &color))?;
    }

    let upper: Vec<(f64, f64)> = band
        .mean
        .iter()
        .zip(&band.uncertainty)
        .zip(&band.z)
        .map(|((m, u), z)| (m + u, *z))
        .collect();
    let lower: Vec<(f64, f64)> = band
        .mean
        .iter()
        .zip(&band.uncertainty)
        .zip(&band.z)
        .map(|((m, u), z)| (m - u, *z))
        .collect();
    chart
        .draw_series(LineSeries::new(upper, &BOUND))?
        .label(if var_vpvs.is_some() {
            "Approx standard deviation"
        } else {
            "Standard deviation"
        })
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BOUND));
    chart.draw_series(LineSeries::new(lower, &BOUND))?;

    chart
        .draw_series(LineSeries::new(
            band.mean.iter().zip(&band.z).map(|(m, z)| (*m, *z)),
            &BLACK,
        ))?
        .label(mean_label)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    // Best-model ratio, only when both wave families retained samples.
    let ep = store.best_energies(crate::best::Wave::P);
    let es = store.best_energies(crate::best::Wave::S);
    if let (Some(ip), Some(is)) = (select_best(&ep), select_best(&es)) {
        let bp = &store.best_p[ip].profile;
        let bs = &store.best_s[is].profile;
        let n = bp.len().min(bs.len());
        let series: Vec<(f64, f64)> = (0..n)
            .map(|k| (bp.value[k] / bs.value[k], bp.depth[k]))
            .collect();
        chart
            .draw_series(LineSeries::new(series, GREEN.stroke_width(3)))?
            .label("Vp/Vs of the best model")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));
    }

    if let (Some(rp), Some(rs)) = (&store.real_p, &store.real_s) {
        if var_vpvs.is_some() {
            let n = rp.len().min(rs.len());
            let series: Vec<(f64, f64)> = (0..n)
                .map(|k| (rp.value[k] / rs.value[k], rp.depth[k]))
                .collect();
            chart
                .draw_series(LineSeries::new(series, REAL_P.stroke_width(3)))?
                .label("Real Vp/Vs")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], REAL_P));
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------
// Filtered first-guess curves

pub fn filtering(store: &ResultStore, out_dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut written = Vec::new();
    for f in &store.filtered {
        let path = out_dir.join(format!("filtered.{}.{}.png", f.wavelet, store.code));
        let guess = &store.first_guess_p;
        let zmin = guess.depth_min();
        let zmax = guess.depth_max();
        let xmin = guess.value_min().min(f.p.value_min());
        let xmax = guess.value_max().max(f.p.value_max());
        let pad = (xmax - xmin) / 20.0;

        let root = BitMapBackend::new(&path, (500, 750)).into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((xmin - pad)..(xmax + pad), zmax..zmin)?;
        chart
            .configure_mesh()
            .x_desc("Wave speed (m/s)")
            .y_desc("Depth (m)")
            .draw()?;

        chart.draw_series(LineSeries::new(curve(guess), &GUESS_P))?;
        chart
            .draw_series(LineSeries::new(curve(&f.p), FILTERED.stroke_width(3)))?
            .label(f.wavelet.clone())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], FILTERED));
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        root.present()?;
        written.push(path.clone());
    }
    Ok(written)
}

// ---------------------------------------------------------------------
// Swaps (provisional)

pub fn swaps(store: &ResultStore, out_dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    println!("Not implemented for now");
    let rows: Vec<&Vec<f64>> = store
        .swap_log
        .iter()
        .filter(|row| row.len() > 3 && row[2] == 3.0)
        .collect();
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let path = out_dir.join(format!("swaps.{}.png", store.code));
    let xs: Vec<f64> = rows.iter().map(|r| r[1]).collect();
    let ys: Vec<f64> = rows.iter().map(|r| r[3]).collect();
    let (xmin, xmax) = min_max(&xs);
    let (ymin, ymax) = min_max(&ys);

    let root = BitMapBackend::new(&path, FIG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Swaps", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(xmin..xmax.max(xmin + 1.0), ymin..ymax.max(ymin + 1.0))?;
    chart.configure_mesh().draw()?;
    chart.draw_series(LineSeries::new(
        xs.into_iter().zip(ys),
        &BLACK,
    ))?;
    root.present()?;
    Ok(vec![path.clone()])
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

// ---------------------------------------------------------------------
// Publication bundle

pub fn paper(
    store: &ResultStore,
    opts: &PlotOptions,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut written = Vec::new();

    written.extend(geometry(store, out_dir)?);
    written.extend(data(store, opts, out_dir)?);
    if !store.prior_p.is_empty() {
        // Publication variant thins the prior overlay to every third draw.
        written.push(prior_figure(store, out_dir, 'P', 3, "paperPrior")?);
        if store.cfg.swaves {
            written.push(prior_figure(store, out_dir, 'S', 3, "paperPrior")?);
        }
    }

    let energies_path = out_dir.join(format!("paperEnergies.{}.png", store.code));
    energy_trace_figure(store, opts, &energies_path, store.n_chains().min(20))?;
    written.push(energies_path);

    if store.cfg.swaves {
        let global_s = store.global_s.as_ref().ok_or("S-wave globals missing")?;
        if let Some(var_vpvs) = &store.global_var_vpvs {
            let path = out_dir.join(format!("paperVpvs.{}.png", store.code));
            paper_vpvs_figure(store, global_s, var_vpvs, &path)?;
            written.push(path);
        }
    }

    if let Some(predicted) = &store.best_model_times {
        let recalc = store.cfg.recalculate_t0 || opts.recalculate_t0;
        let set = compute_residuals(
            predicted,
            &store.observed_times,
            store.n_shots(),
            store.n_stations(),
            store.cfg.swaves,
            recalc,
        )?;
        let p_path = out_dir.join(format!("paperResidualsP.{}.png", store.code));
        residual_figure(&p_path, &set.p, store.cfg.sigma_p, 10.0, 'P')?;
        written.push(p_path);
        if store.cfg.swaves {
            let s_path = out_dir.join(format!("paperResidualsS.{}.png", store.code));
            residual_figure(&s_path, &set.s, store.cfg.sigma_s, 10.0, 'S')?;
            written.push(s_path);
        }
    } else {
        println!("The best model has not been calculated");
    }

    written.push(paper_results_figure(store, 'P', out_dir)?);
    if store.cfg.swaves {
        written.push(paper_results_figure(store, 'S', out_dir)?);
    }
    written.extend(filtering(store, out_dir)?);
    Ok(written)
}

/// Global Vp/Vs with the density strip under the curves.
fn paper_vpvs_figure(
    store: &ResultStore,
    global_s: &GlobalWave,
    var_vpvs: &DepthProfile,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let band = ratio_band(
        &store.global_p.average,
        &store.global_p.variance,
        &global_s.average,
        &global_s.variance,
    );
    let sigma: Vec<f64> = var_vpvs.value.iter().map(|v| v.sqrt() / 3.0).collect();

    let zmin = band.z.iter().copied().fold(f64::INFINITY, f64::min);
    let zmax = band.z.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let root = BitMapBackend::new(path, PAPER_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.5..3.5, zmax..zmin)?;
    chart
        .configure_mesh()
        .x_desc("Ratio Vp/Vs")
        .y_desc("Depth (m)")
        .draw()?;

    let guess_ratio: Vec<(f64, f64)> = {
        let n = store.first_guess_p.len().min(store.first_guess_s.len());
        (0..n)
            .map(|k| {
                (
                    store.first_guess_p.value[k] / store.first_guess_s.value[k],
                    store.first_guess_p.depth[k],
                )
            })
            .collect()
    };
    chart
        .draw_series(LineSeries::new(guess_ratio, RGBColor(242, 230, 230)))?
        .label("Sonic logs Vp/Vs")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RGBColor(242, 230, 230)));

    let strip = density_strip(&band.z, &band.mean, &sigma, DENSITY_RESOLUTION)?;
    draw_density(&mut chart, &band.z, &strip)?;

    let upper: Vec<(f64, f64)> = band
        .mean
        .iter()
        .zip(&sigma)
        .zip(&band.z)
        .map(|((m, s), z)| (m + s, *z))
        .collect();
    let lower: Vec<(f64, f64)> = band
        .mean
        .iter()
        .zip(&sigma)
        .zip(&band.z)
        .map(|((m, s), z)| (m - s, *z))
        .collect();
    chart
        .draw_series(LineSeries::new(upper, &BOUND))?
        .label("Standard deviation")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BOUND));
    chart.draw_series(LineSeries::new(lower, &BOUND))?;
    chart
        .draw_series(LineSeries::new(
            band.mean.iter().zip(&band.z).map(|(m, z)| (*m, *z)),
            &BLACK,
        ))?
        .label("Average Vp/Vs")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    let ep = store.best_energies(crate::best::Wave::P);
    let es = store.best_energies(crate::best::Wave::S);
    if let (Some(ip), Some(is)) = (select_best(&ep), select_best(&es)) {
        let bp = &store.best_p[ip].profile;
        let bs = &store.best_s[is].profile;
        let n = bp.len().min(bs.len());
        let series: Vec<(f64, f64)> = (0..n)
            .map(|k| (bp.value[k] / bs.value[k], bp.depth[k]))
            .collect();
        chart
            .draw_series(LineSeries::new(series, GREEN.stroke_width(2)))?
            .label("Vp/Vs of the best model")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Global result figure with density strip, average, best model and the
/// one-sigma curves, print-styled.
fn paper_results_figure(
    store: &ResultStore,
    letter: char,
    out_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    let (global, guess, real, samples) = if letter == 'P' {
        (&store.global_p, &store.first_guess_p, &store.real_p, &store.best_p)
    } else {
        (
            store.global_s.as_ref().ok_or("S-wave globals missing")?,
            &store.first_guess_s,
            &store.real_s,
            &store.best_s,
        )
    };
    let path = out_dir.join(format!("paperResults{letter}.{}.png", store.code));
    let sigma: Vec<f64> = global.variance.value.iter().map(|v| v.sqrt()).collect();
    let zfilt = &global.average.depth;
    let zmin = zfilt.iter().copied().fold(f64::INFINITY, f64::min);
    let zmax = zfilt.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let xlim = padded_xlim(global);

    let root = BitMapBackend::new(&path, PAPER_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(xlim.0..xlim.1, zmax..zmin)?;
    chart
        .configure_mesh()
        .x_desc(format!("{letter} wave velocity (m/s)"))
        .y_desc("Depth (m)")
        .draw()?;

    let faint = if letter == 'P' {
        RGBColor(230, 230, 252)
    } else {
        RGBColor(227, 250, 227)
    };
    chart
        .draw_series(LineSeries::new(curve(guess), &faint))?
        .label("Sonic log")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], faint));
    if let Some(real) = real {
        let color = if letter == 'P' { REAL_P } else { REAL_S };
        chart
            .draw_series(LineSeries::new(curve(real), color.stroke_width(3)))?
            .label("Real velocity profile")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    let strip = density_strip(zfilt, &global.average.value, &sigma, DENSITY_RESOLUTION)?;
    draw_density(&mut chart, zfilt, &strip)?;

    chart
        .draw_series(LineSeries::new(curve(&global.average), AVERAGE.stroke_width(2)))?
        .label("Average model")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], AVERAGE));

    let energies: Vec<f64> = samples.iter().map(|b| b.meta.energy).collect();
    if let Some(ib) = select_best(&energies) {
        chart
            .draw_series(LineSeries::new(
                curve(&samples[ib].profile),
                GREEN.stroke_width(2),
            ))?
            .label("Best model")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));
    }

    let upper: Vec<(f64, f64)> = global
        .average
        .value
        .iter()
        .zip(&sigma)
        .zip(zfilt)
        .map(|((a, s), z)| (a + s, *z))
        .collect();
    let lower: Vec<(f64, f64)> = global
        .average
        .value
        .iter()
        .zip(&sigma)
        .zip(zfilt)
        .map(|((a, s), z)| (a - s, *z))
        .collect();
    chart
        .draw_series(LineSeries::new(upper, &BOUND))?
        .label("Standard deviation")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BOUND));
    chart.draw_series(LineSeries::new(lower, &BOUND))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(path.clone())
}
