// export.rs - CSV summaries of the loaded run

use std::error::Error;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use crate::residuals::ResidualSet;
use crate::store::ResultStore;

/// Retained-model metadata table: one row per sample of either wave family.
pub fn write_best_models(store: &ResultStore, out_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let path = out_dir.join(format!("bestModels.{}.csv", store.code));
    let mut wtr = WriterBuilder::new().from_path(&path)?;
    wtr.write_record(["wave", "iteration", "chain", "energy"])?;
    for b in store.best_p.iter().chain(store.best_s.iter()) {
        wtr.write_record(&[
            b.meta.wave.letter().to_string(),
            b.meta.iteration.to_string(),
            b.meta.chain.to_string(),
            b.meta.energy.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(path)
}

/// Valid-receiver residual tables of the best model, one file per wave type.
pub fn write_residuals(
    store: &ResultStore,
    set: &ResidualSet,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut written = Vec::new();

    let p_path = out_dir.join(format!("residualsP.{}.csv", store.code));
    write_one(&p_path, &set.p)?;
    written.push(p_path);
    if store.cfg.swaves {
        let s_path = out_dir.join(format!("residualsS.{}.csv", store.code));
        write_one(&s_path, &set.s)?;
        written.push(s_path);
    }
    Ok(written)
}

fn write_one(path: &Path, residuals: &[f64]) -> Result<(), Box<dyn Error>> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["receiver", "residual"])?;
    for (i, r) in residuals.iter().enumerate() {
        wtr.write_record(&[i.to_string(), r.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}
