// profile.rs - depth-indexed curves and plain numeric tables

use std::error::Error;
use std::fs;
use std::path::Path;

/// Ordered (depth, value) pairs, monotonic in depth.
///
/// Used for first-guess, real, average, quantile-bound and retained-sample
/// curves. Profiles sharing a depth grid have equal length; the first-guess
/// grid and the chain-statistics grid are two distinct grids.
#[derive(Debug, Clone, Default)]
pub struct DepthProfile {
    pub depth: Vec<f64>,
    pub value: Vec<f64>,
}

impl DepthProfile {
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let table = load_table(path)?;
        let mut depth = Vec::with_capacity(table.len());
        let mut value = Vec::with_capacity(table.len());
        for (i, row) in table.iter().enumerate() {
            if row.len() < 2 {
                return Err(format!(
                    "{}: row {} has {} columns, profile needs 2",
                    path.display(),
                    i,
                    row.len()
                )
                .into());
            }
            depth.push(row[0]);
            value.push(row[1]);
        }
        Ok(DepthProfile { depth, value })
    }

    pub fn len(&self) -> usize {
        self.depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth.is_empty()
    }

    pub fn depth_min(&self) -> f64 {
        self.depth.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn depth_max(&self) -> f64 {
        self.depth.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn value_min(&self) -> f64 {
        self.value.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn value_max(&self) -> f64 {
        self.value.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Load a whitespace-delimited numeric table. Blank lines and lines whose
/// first non-blank character is `#` are skipped; every remaining field must
/// parse as f64.
pub fn load_table(path: &Path) -> Result<Vec<Vec<f64>>, Box<dyn Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let mut rows = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut row = Vec::new();
        for field in trimmed.split_whitespace() {
            let v: f64 = field.parse().map_err(|_| {
                format!(
                    "{}: line {}: {:?} is not a number",
                    path.display(),
                    lineno + 1,
                    field
                )
            })?;
            row.push(v);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Load a table of fixed width, flattening a single-row file written on one
/// line (coordinate files with one shot are sometimes written that way).
pub fn load_fixed_width(path: &Path, width: usize) -> Result<Vec<Vec<f64>>, Box<dyn Error>> {
    let table = load_table(path)?;
    if table.len() == 1 && table[0].len() > width && table[0].len() % width == 0 {
        return Ok(table[0].chunks(width).map(|c| c.to_vec()).collect());
    }
    for (i, row) in table.iter().enumerate() {
        if row.len() < width {
            return Err(format!(
                "{}: row {} has {} columns, expected at least {}",
                path.display(),
                i,
                row.len(),
                width
            )
            .into());
        }
    }
    Ok(table)
}
