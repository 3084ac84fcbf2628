//! Parser for the tab-delimited ASCII scan exports written by the
//! Quadera-style acquisition software of a quadrupole mass spectrometer.
//!
//! An export interleaves free-form text with two recognizable blocks:
//! a scan metadata header naming, among others, the `T [°C]` and
//! `Pressure [mbar]` columns, followed by one line of values, and an
//! ion trace header `Mass [amu]	Ion Current [A]` followed by one
//! `mass	current` row per m/q step, ending at a blank line or EOF.
//!
//! Parsing is two-phase: the scalar scan readings are located first, the
//! ion trace second, and the trace is pressure-normalized only once both
//! are in hand, so the relative order of the two blocks in the file does
//! not matter.

use std::fs;
use std::io;
use std::io::prelude::*;
use std::num::ParseFloatError;
use std::path::Path;

use log::{debug, info};
use thiserror::Error;

use crate::spectrum::{ScanHeader, Spectrum};

const TEMPERATURE_COLUMN: &str = "T [°C]";
/// The same column as exported when the UTF-8 degree sign has been run
/// through a Latin-1 round trip.
const TEMPERATURE_COLUMN_MOJIBAKE: &str = "T [Â°C]";
const PRESSURE_COLUMN: &str = "Pressure [mbar]";
const MASS_COLUMN: &str = "Mass [amu]";
const ION_CURRENT_COLUMN: &str = "Ion Current [A]";

/// All the ways reading a scan export can fail
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O failure reading spectrum: {0}")]
    Io(#[from] io::Error),
    #[error("no temperature/pressure header line found")]
    MissingScanHeader,
    #[error("no ion current header line found")]
    MissingIonHeader,
    #[error("the scan header does not name a {0:?} column")]
    MissingColumn(&'static str),
    #[error("the line after the scan header is missing the named columns")]
    TruncatedValueLine,
    #[error("line {line_no}: expected a mass and an ion current separated by a tab")]
    MalformedRow { line_no: usize },
    #[error("line {line_no}: {source}")]
    BadNumber {
        line_no: usize,
        #[source]
        source: ParseFloatError,
    },
    #[error("the ion current header is not followed by any data rows")]
    EmptyTrace,
}

fn is_temperature_column(field: &str) -> bool {
    field == TEMPERATURE_COLUMN || field == TEMPERATURE_COLUMN_MOJIBAKE
}

fn parse_float(field: &str, line_no: usize) -> Result<f64, ParseError> {
    field
        .trim()
        .parse()
        .map_err(|source| ParseError::BadNumber { line_no, source })
}

/// Phase one: find the scan metadata header, resolve the temperature and
/// pressure columns by name, and read both values off the following line.
fn scan_header(lines: &[String]) -> Result<ScanHeader, ParseError> {
    for (i, line) in lines.iter().enumerate() {
        let columns: Vec<&str> = line.split('\t').collect();
        let Some(t_idx) = columns.iter().position(|c| is_temperature_column(c)) else {
            continue;
        };
        let p_idx = columns
            .iter()
            .position(|c| *c == PRESSURE_COLUMN)
            .ok_or(ParseError::MissingColumn(PRESSURE_COLUMN))?;

        let values = lines.get(i + 1).ok_or(ParseError::TruncatedValueLine)?;
        let fields: Vec<&str> = values.split('\t').collect();
        if fields.len() <= t_idx.max(p_idx) {
            return Err(ParseError::TruncatedValueLine);
        }
        return Ok(ScanHeader {
            temperature: parse_float(fields[t_idx], i + 2)?,
            pressure: parse_float(fields[p_idx], i + 2)?,
        });
    }
    Err(ParseError::MissingScanHeader)
}

fn is_ion_header(line: &str) -> bool {
    let mut fields = line.split('\t');
    fields.next() == Some(MASS_COLUMN) && fields.next() == Some(ION_CURRENT_COLUMN)
}

/// Phase two: find the ion trace header and collect the raw
/// `(mass, ion current)` rows below it, stopping at the first blank line.
fn ion_trace(lines: &[String]) -> Result<(Vec<f64>, Vec<f64>), ParseError> {
    let start = lines
        .iter()
        .position(|line| is_ion_header(line))
        .ok_or(ParseError::MissingIonHeader)?;

    let mut masses = Vec::new();
    let mut currents = Vec::new();
    for (offset, line) in lines[start + 1..].iter().enumerate() {
        if line.trim().is_empty() {
            break;
        }
        let line_no = start + 2 + offset;
        let mut fields = line.split('\t');
        let (Some(mass), Some(current)) = (fields.next(), fields.next()) else {
            return Err(ParseError::MalformedRow { line_no });
        };
        masses.push(parse_float(mass, line_no)?);
        currents.push(parse_float(current, line_no)?);
    }
    if masses.is_empty() {
        return Err(ParseError::EmptyTrace);
    }
    Ok((masses, currents))
}

/// Parse a single scan export from a buffered reader.
pub fn read_spectrum<R: BufRead>(reader: R) -> Result<Spectrum, ParseError> {
    let lines: Vec<String> = reader
        .lines()
        .map(|line| line.map(|l| l.trim_end().to_string()))
        .collect::<Result<_, _>>()?;

    let header = scan_header(&lines)?;
    let (masses, raw_currents) = ion_trace(&lines)?;
    debug!(
        "temperature: {} °C, pressure: {} mbar",
        header.temperature, header.pressure
    );
    debug!("# of ion current vs m/q pairs: {}", masses.len());
    Ok(Spectrum::new(header, masses, raw_currents))
}

/// Parse the scan export at `path`.
pub fn read_spectrum_file<P: AsRef<Path>>(path: P) -> Result<Spectrum, ParseError> {
    let path = path.as_ref();
    info!("processing file: {}", path.display());
    let reader = io::BufReader::new(fs::File::open(path)?);
    read_spectrum(reader)
}

/// Parse every regular file directly inside `dir` as a scan export.
/// Subdirectories, including a `results/` directory left by an earlier
/// run, are skipped. The traversal order is whatever the filesystem
/// yields; callers that care about order must sort downstream.
pub fn read_spectrum_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<Spectrum>, ParseError> {
    let mut spectra = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        spectra.push(read_spectrum_file(entry.path())?);
    }
    info!("parsed {} spectra", spectra.len());
    Ok(spectra)
}
