// Shared fixture: a minimal on-disk run directory for the loader tests.

use std::fs;
use std::path::Path;

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tempfile::TempDir;

pub fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

pub const PROFILE: &str = "0 2000\n10 2100\n20 2200\n30 2300\n";

/// Build a minimal P-only run directory with two chains, code 900.
pub fn build_run_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();

    write(
        dir,
        "config.cfg",
        "SWAVES = 0 # no S waves\n\
         ANALYTICAL_RUN = 0\n\
         RECALCULATE_T0 = 1\n\
         QP = 95\n\
         NAME_OF_FIRST_GUESS_P_FILE = firstGuessP.dat\n\
         NAME_OF_FIRST_GUESS_S_FILE = firstGuessS.dat\n\
         NAME_OF_REAL_PROFILE_FILE_P = realP.dat\n\
         NAME_OF_REAL_PROFILE_FILE_S = realS.dat\n\
         N_PRIOR_PROFILES = 0\n\
         NAME_OF_STATIONS_FILE = stations.dat\n\
         NAME_OF_SHOTS_FILE = shots.dat\n\
         NAME_OF_TIMES_FILE = times.dat\n\
         SIGMAP = 0.01\n\
         SIGMAS = 0.02\n\
         COORD_TOL = 0.1\n",
    );
    write(
        dir,
        "config.900.dat",
        "Energy of the prior : 12.5\n\
         Number of temperatures : 2\n\
         Temperature max : 10\n\
         Temperature ladder : T[0] = 1 | T[1] = 10\n",
    );
    write(dir, "stats0.900.dat", "0 0\n");

    let mut rng = Pcg64::seed_from_u64(900);
    for i in 0..2 {
        let mut trace = String::new();
        for it in 0..60 {
            let energy: f64 = rng.gen_range(10.0..100.0);
            trace.push_str(&format!("{it} 0.5 {energy}\n"));
        }
        write(dir, &format!("chain{i}.900.dat"), &trace);
        write(dir, &format!("averageP{i}.900.dat"), PROFILE);
        write(dir, &format!("varP{i}.900.dat"), "0 100\n10 100\n20 100\n30 100\n");
        write(dir, &format!("qSupP{i}.900.dat"), "0 2100\n10 2200\n20 2300\n30 2400\n");
        write(dir, &format!("qInfP{i}.900.dat"), "0 1900\n10 2000\n20 2100\n30 2200\n");
        write(dir, &format!("minP.{i}.900.dat"), "0 1800\n10 1900\n20 2000\n30 2100\n");
        write(dir, &format!("maxP.{i}.900.dat"), "0 2200\n10 2300\n20 2400\n30 2500\n");
    }
    write(dir, "globalAverageP.900.dat", PROFILE);
    write(dir, "globalVarP.900.dat", "0 100\n10 100\n20 100\n30 100\n");
    write(dir, "maxP.900.dat", "0 2200\n10 2300\n20 2400\n30 2500\n");
    write(dir, "minP.900.dat", "0 1800\n10 1900\n20 2000\n30 2100\n");

    write(dir, "shots.dat", "0 0 0\n");
    write(dir, "stations.dat", "100 0 0\n0 50 10\n");
    write(dir, "firstGuessP.dat", PROFILE);
    write(dir, "firstGuessS.dat", "0 1000\n10 1100\n20 1200\n30 1300\n");
    write(dir, "times.dat", "0.05 -1\n0.06 -1\n");
    write(dir, "ll.900.dat", "0 1 3 0.5\n1 2 3 0.7\n2 0 1 0.1\n");

    write(dir, "bestPprofile.idx10.chain0.E55.5.900.dat", PROFILE);
    write(dir, "bestPprofile.idx40.chain1.E22.25.900.dat", PROFILE);
    write(dir, "filteredFirstGuessP.ricker.dat", PROFILE);

    tmp
}
