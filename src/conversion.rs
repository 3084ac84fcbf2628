//! Turn mass-44 peak intensities into CO2 mole fractions and catalytic
//! conversion of the CO feed.

use std::fmt;

use log::debug;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::baseline::{BaselineError, BaselineMethod};
use crate::spectrum::{Spectrum, CO2_MASS};

/// All the ways the conversion calculation can fail
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("no m/q = {0} entry in the trace, the CO2 peak cannot be located")]
    MassNotFound(f64),
    #[error(transparent)]
    Baseline(#[from] BaselineError),
}

/// Feed gas flow rates ahead of the reactor, in sccm.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlowRates {
    /// Helium carrier flow
    pub helium: f64,
    /// CO feed flow before any reaction
    pub carbon_monoxide: f64,
    /// O2 feed flow before any reaction
    pub oxygen: f64,
}

impl Default for FlowRates {
    fn default() -> Self {
        Self {
            helium: 30.0,
            carbon_monoxide: 2.0,
            oxygen: 4.0,
        }
    }
}

impl FlowRates {
    pub fn new(helium: f64, carbon_monoxide: f64, oxygen: f64) -> Self {
        Self {
            helium,
            carbon_monoxide,
            oxygen,
        }
    }

    /// Total feed flow entering the reactor.
    pub fn total(&self) -> f64 {
        self.helium + self.carbon_monoxide + self.oxygen
    }

    /// The known CO2 mole fraction of the calibration stream, assuming the
    /// calibration ran under the same flow regime as the experiment.
    pub fn calibration_fraction(&self) -> f64 {
        self.carbon_monoxide / self.total()
    }
}

/// One row of the conversion-vs-temperature table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConversionPoint {
    /// Sample temperature, in degrees Celsius
    pub temperature: f64,
    /// Fraction of the CO feed converted to CO2
    pub conversion: f64,
}

impl fmt::Display for ConversionPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}", self.temperature, self.conversion)
    }
}

/// The baseline-subtracted ion current at the CO2 mass.
fn net_co2_signal(spectrum: &Spectrum, method: BaselineMethod) -> Result<f64, ConversionError> {
    let signal = spectrum
        .signal_at(CO2_MASS)
        .ok_or(ConversionError::MassNotFound(CO2_MASS))?;
    let baseline = method.estimate(&spectrum.relative_ion_currents)?;
    Ok(signal - baseline)
}

/// Compute the CO2 mole fraction of the experimental stream from the ratio
/// of baseline-subtracted mass-44 signals between experiment and
/// calibration.
///
/// A vanishing calibration signal is not guarded against; the returned
/// fraction may then fall outside `[0, 1]`, which callers must treat as a
/// sign of a calibration mismatch.
pub fn co2_mole_fraction(
    experiment: &Spectrum,
    calibration: &Spectrum,
    flows: FlowRates,
    method: BaselineMethod,
) -> Result<f64, ConversionError> {
    let net_experiment = net_co2_signal(experiment, method)?;
    let net_calibration = net_co2_signal(calibration, method)?;
    Ok(flows.calibration_fraction() * net_experiment / net_calibration)
}

/// Fraction of the CO feed converted, corrected for the mole count change
/// of CO + 1/2 O2 -> CO2 concentrating the measured stream.
pub fn conversion_from_fraction(x_co2: f64, flows: FlowRates) -> f64 {
    (x_co2 * flows.total() / flows.carbon_monoxide) * (1.0 / (1.0 + x_co2 / 2.0))
}

/// Compute one [`ConversionPoint`] per experimental spectrum and sort the
/// curve ascending by temperature. The iteration order of `spectra` does
/// not affect the result.
pub fn conversion_curve(
    spectra: &[Spectrum],
    calibration: &Spectrum,
    flows: FlowRates,
    method: BaselineMethod,
) -> Result<Vec<ConversionPoint>, ConversionError> {
    let mut curve = Vec::with_capacity(spectra.len());
    for spectrum in spectra {
        let x_co2 = co2_mole_fraction(spectrum, calibration, flows, method)?;
        let point = ConversionPoint {
            temperature: spectrum.temperature,
            conversion: conversion_from_fraction(x_co2, flows),
        };
        debug!(
            "{} °C: x(CO2) = {:.6}, conversion = {:.6}",
            point.temperature, x_co2, point.conversion
        );
        curve.push(point);
    }
    curve.sort_by(|a, b| a.temperature.total_cmp(&b.temperature));
    Ok(curve)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::spectrum::ScanHeader;
    use approx::assert_abs_diff_eq;

    fn spectrum(temperature: f64, raw_currents: Vec<f64>) -> Spectrum {
        let header = ScanHeader {
            temperature,
            pressure: 2.0,
        };
        Spectrum::new(header, vec![4.0, 18.0, 28.0, 32.0, 40.0, 44.0], raw_currents)
    }

    /// Baseline 1.0, mass-44 signal 10.0 after pressure normalization.
    fn calibration() -> Spectrum {
        spectrum(25.0, vec![2.0, 2.0, 2.0, 2.0, 6.0, 20.0])
    }

    /// Baseline 0.5, mass-44 signal 5.5 after pressure normalization.
    fn experiment() -> Spectrum {
        spectrum(200.0, vec![1.0, 1.0, 1.0, 1.0, 2.0, 11.0])
    }

    #[test]
    fn test_calibration_fraction() {
        let flows = FlowRates::default();
        assert_abs_diff_eq!(flows.total(), 36.0);
        assert_abs_diff_eq!(flows.calibration_fraction(), 2.0 / 36.0);
    }

    #[test]
    fn test_co2_mole_fraction() {
        let x = co2_mole_fraction(
            &experiment(),
            &calibration(),
            FlowRates::default(),
            BaselineMethod::Mode,
        )
        .unwrap();
        // (2/36) * (5.5 - 0.5) / (10 - 1)
        assert_abs_diff_eq!(x, 2.0 / 36.0 * 5.0 / 9.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x, 0.030864, epsilon = 1e-6);
    }

    #[test]
    fn test_conversion_formula() {
        let x = 0.030864197530864196;
        let conversion = conversion_from_fraction(x, FlowRates::default());
        assert_abs_diff_eq!(conversion, 0.547, epsilon = 1e-3);
    }

    #[test]
    fn test_missing_co2_mass_is_fatal() {
        let header = ScanHeader {
            temperature: 200.0,
            pressure: 1.0,
        };
        let no_co2 = Spectrum::new(header, vec![28.0, 32.0], vec![1.0, 1.0]);
        let err = co2_mole_fraction(
            &no_co2,
            &calibration(),
            FlowRates::default(),
            BaselineMethod::Mode,
        )
        .unwrap_err();
        assert!(matches!(err, ConversionError::MassNotFound(m) if m == CO2_MASS));
    }

    #[test]
    fn test_curve_sorted_by_temperature() {
        let spectra = [
            spectrum(250.0, vec![1.0, 1.0, 1.0, 1.0, 2.0, 16.0]),
            experiment(),
        ];
        let curve = conversion_curve(
            &spectra,
            &calibration(),
            FlowRates::default(),
            BaselineMethod::Mode,
        )
        .unwrap();
        assert_eq!(curve.len(), 2);
        assert_eq!(curve[0].temperature, 200.0);
        assert_eq!(curve[1].temperature, 250.0);
        assert!(curve[1].conversion > curve[0].conversion);

        let reversed: Vec<_> = spectra.iter().rev().cloned().collect();
        let again = conversion_curve(
            &reversed,
            &calibration(),
            FlowRates::default(),
            BaselineMethod::Mode,
        )
        .unwrap();
        assert_eq!(curve, again);
    }

    #[test]
    fn test_point_display() {
        let point = ConversionPoint {
            temperature: 200.0,
            conversion: 0.5,
        };
        assert_eq!(point.to_string(), "200\t0.5");
    }
}
