use clap::Parser;
use log::warn;

use crate::mem::SimError;

/// positional file names, in the order the simulator expects them
pub const EXPECTED_FILES: [&str; 6] = [
    "imem0.txt",
    "imem1.txt",
    "imem2.txt",
    "imem3.txt",
    "memin.txt",
    "memout.txt",
];

#[derive(Parser)]
#[command(
    name = "cachesim-bus",
    version,
    about = "Shared-bus arbitration simulator for a 4-core coherent cache system"
)]
pub struct Cli {
    /// Input and output files, in order: imem0-3.txt memin.txt memout.txt
    pub files: Vec<String>,
}

/// Validate the positional file list. A wrong count is fatal; a name that
/// differs from the expected one only warns, and the provided name is used
/// for that position.
pub fn check_input_files(files: &[String]) -> Result<(), SimError> {
    if files.len() != EXPECTED_FILES.len() {
        return Err(SimError::ArgCount {
            expected: EXPECTED_FILES.len(),
            got: files.len(),
        });
    }
    for (given, expected) in files.iter().zip(EXPECTED_FILES) {
        if given.as_str() != expected {
            warn!("input file name {expected} does not match, using {given} instead");
        }
    }
    Ok(())
}
