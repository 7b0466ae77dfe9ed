// config.rs - run parameters parsed from the inversion's configuration files

use std::error::Error;
use std::fs;
use std::path::Path;

/// Run-time parameters of the inversion (single source of truth).
///
/// Parsed once from `config.cfg` and never mutated afterwards; every
/// rendering routine borrows it from the store.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub swaves: bool,
    pub analytical: bool,
    pub recalculate_t0: bool,
    /// Confidence-interval percentile, kept as text for axis labels.
    pub qp: String,
    pub first_guess_p_file: String,
    pub first_guess_s_file: String,
    pub real_profile_p_file: String,
    pub real_profile_s_file: String,
    pub n_prior_profiles: usize,
    pub stations_file: String,
    pub shots_file: String,
    pub times_file: String,
    pub sigma_p: f64,
    pub sigma_s: f64,
    pub coord_tol: f64,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        Self::parse(&text)
    }

    /// Parse the line-oriented `KEY = VALUE # comment` format.
    pub fn parse(text: &str) -> Result<Self, Box<dyn Error>> {
        let mut keys: Vec<(String, String)> = Vec::new();
        for line in text.lines() {
            let payload = line.split('#').next().unwrap_or("");
            if payload.trim().is_empty() {
                continue;
            }
            if let Some((key, value)) = payload.split_once('=') {
                keys.push((key.trim().to_string(), value.trim().to_string()));
            }
        }
        let get = |name: &str| -> Result<String, Box<dyn Error>> {
            keys.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| format!("config.cfg: missing key {name}").into())
        };
        let get_flag = |name: &str| -> Result<bool, Box<dyn Error>> { Ok(get(name)? == "1") };
        let get_f64 = |name: &str| -> Result<f64, Box<dyn Error>> {
            let v = get(name)?;
            v.parse()
                .map_err(|_| format!("config.cfg: {name} = {v:?} is not a number").into())
        };
        let n_prior: usize = {
            let v = get("N_PRIOR_PROFILES")?;
            v.parse()
                .map_err(|_| format!("config.cfg: N_PRIOR_PROFILES = {v:?} is not an integer"))?
        };

        Ok(RunConfig {
            swaves: get_flag("SWAVES")?,
            analytical: get_flag("ANALYTICAL_RUN")?,
            recalculate_t0: get_flag("RECALCULATE_T0")?,
            qp: get("QP")?,
            first_guess_p_file: get("NAME_OF_FIRST_GUESS_P_FILE")?,
            first_guess_s_file: get("NAME_OF_FIRST_GUESS_S_FILE")?,
            real_profile_p_file: get("NAME_OF_REAL_PROFILE_FILE_P")?,
            real_profile_s_file: get("NAME_OF_REAL_PROFILE_FILE_S")?,
            n_prior_profiles: n_prior,
            stations_file: get("NAME_OF_STATIONS_FILE")?,
            shots_file: get("NAME_OF_SHOTS_FILE")?,
            times_file: get("NAME_OF_TIMES_FILE")?,
            sigma_p: get_f64("SIGMAP")?,
            sigma_s: get_f64("SIGMAS")?,
            coord_tol: get_f64("COORD_TOL")?,
        })
    }
}

/// Quantities the inversion wrote about itself into `config.<code>.dat`:
/// the prior energy and the parallel-tempering ladder.
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub prior_energy: f64,
    pub t_max: f64,
    /// One fixed temperature per chain, index = chain id.
    pub temperatures: Vec<f64>,
}

impl RunInfo {
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, Box<dyn Error>> {
        let mut prior_energy = None;
        let mut t_max = None;
        let mut n_temperatures = None;
        let mut ladder: Vec<f64> = Vec::new();

        for line in text.lines() {
            if line.contains("Energy of the prior :") {
                prior_energy = Some(tail_number(line)?);
            } else if line.contains("Temperature max :") {
                t_max = Some(tail_number(line)?);
            } else if line.contains("temperatures :") {
                n_temperatures = Some(tail_number(line)? as usize);
            } else if line.contains("Temperature ladder :") {
                ladder = parse_ladder(line)?;
            }
        }

        let prior_energy =
            prior_energy.ok_or("run config: no 'Energy of the prior' line")?;
        let t_max = t_max.ok_or("run config: no 'Temperature max' line")?;
        let nbt = n_temperatures.ok_or("run config: no 'temperatures' line")?;
        if ladder.len() != nbt {
            return Err(format!(
                "run config: ladder has {} temperatures, header announces {}",
                ladder.len(),
                nbt
            )
            .into());
        }
        Ok(RunInfo { prior_energy, t_max, temperatures: ladder })
    }

    pub fn n_chains(&self) -> usize {
        self.temperatures.len()
    }
}

/// Number after the last ':' of a header line.
fn tail_number(line: &str) -> Result<f64, Box<dyn Error>> {
    let tail = line.rsplit(':').next().unwrap_or("").trim();
    tail.parse()
        .map_err(|_| format!("run config: {tail:?} is not a number in line {line:?}").into())
}

/// Parse the `T[0] = v0 | T[1] = v1 | ...` ladder tokens.
fn parse_ladder(line: &str) -> Result<Vec<f64>, Box<dyn Error>> {
    let tail = match line.split_once("Temperature ladder :") {
        Some((_, t)) => t,
        None => line,
    };
    let mut entries: Vec<(usize, f64)> = Vec::new();
    for segment in tail.split("T[").skip(1) {
        let (idx_text, rest) = segment
            .split_once(']')
            .ok_or_else(|| format!("run config: malformed ladder token in {line:?}"))?;
        let index: usize = idx_text
            .trim()
            .parse()
            .map_err(|_| format!("run config: bad ladder index {idx_text:?}"))?;
        let value_text = rest
            .trim_start()
            .trim_start_matches('=')
            .trim()
            .trim_end_matches('|')
            .trim();
        // The next token may follow on the same segment without a delimiter.
        let value_text = value_text.split_whitespace().next().unwrap_or("");
        let value: f64 = value_text
            .parse()
            .map_err(|_| format!("run config: bad ladder value {value_text:?}"))?;
        entries.push((index, value));
    }
    entries.sort_by_key(|(i, _)| *i);
    for (pos, (i, _)) in entries.iter().enumerate() {
        if *i != pos {
            return Err(format!("run config: ladder index {i} out of sequence").into());
        }
    }
    Ok(entries.into_iter().map(|(_, v)| v).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_with_pipes() {
        let ladder = parse_ladder("Temperature ladder : T[0] = 1 | T[1] = 2.5 | T[2] = 10").unwrap();
        assert_eq!(ladder, vec![1.0, 2.5, 10.0]);
    }

    #[test]
    fn ladder_without_pipes() {
        let ladder = parse_ladder("Temperature ladder : T[0] = 1 T[1] = 3").unwrap();
        assert_eq!(ladder, vec![1.0, 3.0]);
    }
}
