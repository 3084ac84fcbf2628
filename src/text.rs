use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use log::info;

use crate::conversion::ConversionPoint;

/// Directory created inside the spectra directory to hold the output.
pub const RESULTS_DIR: &str = "results";
/// Name of the conversion table written into [`RESULTS_DIR`].
pub const RESULTS_FILE: &str = "conversion.dat";

/// Write the conversion table to `<spectra_dir>/results/conversion.dat`,
/// creating the results directory when absent, and return the path
/// written. One `temperature<TAB>conversion` row per point, preceded by a
/// header row naming the two columns.
pub fn write_conversion_table<P: AsRef<Path>>(
    spectra_dir: P,
    curve: &[ConversionPoint],
) -> io::Result<PathBuf> {
    let results_dir = spectra_dir.as_ref().join(RESULTS_DIR);
    fs::create_dir_all(&results_dir)?;
    let path = results_dir.join(RESULTS_FILE);

    let file = fs::File::create(&path)?;
    let mut writer = io::BufWriter::new(file);
    writer.write_all(b"temperature\tconversion\n")?;
    for point in curve {
        writer.write_all(format!("{}\n", point).as_bytes())?;
    }
    writer.flush()?;
    info!("wrote {} conversion points to {}", curve.len(), path.display());
    Ok(path)
}
