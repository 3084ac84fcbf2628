//! `lightoff` computes catalytic CO2 conversion as a function of
//! temperature from the tab-delimited scan exports of a quadrupole mass
//! spectrometer, producing the light-off curve of a CO oxidation
//! experiment.
//!
//! One scan export per temperature point is parsed into a pressure-normalized
//! [`Spectrum`], a calibration run with known feed composition anchors the
//! mass-44 signal to a CO2 mole fraction, and the stoichiometry of
//! CO + 1/2 O2 -> CO2 turns that fraction into the converted share of the
//! CO feed.
//!
//! # Usage
//! ```no_run
//! use lightoff::{BaselineMethod, FlowRates};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let calibration = lightoff::read_spectrum_file("calibration.asc")?;
//! let spectra = lightoff::read_spectrum_dir("spectra")?;
//! let curve = lightoff::conversion_curve(
//!     &spectra,
//!     &calibration,
//!     FlowRates::default(),
//!     BaselineMethod::default(),
//! )?;
//! lightoff::write_conversion_table("spectra", &curve)?;
//! # Ok(())
//! # }
//! ```
pub mod baseline;
pub mod conversion;
pub mod quadera;
pub mod spectrum;
pub mod text;

pub use crate::baseline::{BaselineError, BaselineMethod};
pub use crate::conversion::{
    co2_mole_fraction, conversion_curve, conversion_from_fraction, ConversionError,
    ConversionPoint, FlowRates,
};
pub use crate::quadera::{read_spectrum, read_spectrum_dir, read_spectrum_file, ParseError};
pub use crate::spectrum::{ScanHeader, Spectrum, CO2_MASS};
pub use crate::text::write_conversion_table;
