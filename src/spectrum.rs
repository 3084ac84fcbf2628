use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The mass-to-charge ratio, in amu, at which CO2 appears in a mass spectrum.
pub const CO2_MASS: f64 = 44.0;

/// The two scalar readings anchored to a scan's metadata block: the sample
/// temperature in degrees Celsius and the chamber pressure in millibar.
///
/// The pressure is consumed when the ion current trace is normalized and is
/// not carried into the resulting [`Spectrum`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanHeader {
    pub temperature: f64,
    pub pressure: f64,
}

/// A single pressure-normalized mass scan.
///
/// `masses` and `relative_ion_currents` are parallel arrays: index `i` pairs
/// `masses[i]` with `relative_ion_currents[i]`. The currents have already
/// been divided by the chamber pressure of the scan they came from, so
/// scans recorded at different pressures are directly comparable.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Spectrum {
    /// Sample temperature during the scan, in degrees Celsius
    pub temperature: f64,
    /// The m/q axis of the scan, in amu
    pub masses: Vec<f64>,
    /// Ion current per m/q value, divided by the chamber pressure
    pub relative_ion_currents: Vec<f64>,
}

impl Spectrum {
    /// Build a spectrum from a scan header and the raw ion current trace,
    /// normalizing each current by the header's pressure.
    pub fn new(header: ScanHeader, masses: Vec<f64>, raw_ion_currents: Vec<f64>) -> Self {
        debug_assert_eq!(masses.len(), raw_ion_currents.len());
        let relative_ion_currents = raw_ion_currents
            .iter()
            .map(|ic| ic / header.pressure)
            .collect();
        Self {
            temperature: header.temperature,
            masses,
            relative_ion_currents,
        }
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    /// Look up the relative ion current recorded at exactly `mass`, taking
    /// the first match when the axis repeats a value.
    ///
    /// The comparison is exact. Quadera exports scan on integral m/q steps,
    /// so the characteristic mass of a species either appears verbatim or
    /// not at all.
    pub fn signal_at(&self, mass: f64) -> Option<f64> {
        self.masses
            .iter()
            .position(|m| *m == mass)
            .map(|i| self.relative_ion_currents[i])
    }
}

impl fmt::Display for Spectrum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Spectrum({} °C, {} points)",
            self.temperature,
            self.len()
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn header() -> ScanHeader {
        ScanHeader {
            temperature: 225.0,
            pressure: 2.0,
        }
    }

    #[test]
    fn test_normalization() {
        let spectrum = Spectrum::new(
            header(),
            vec![28.0, 32.0, 44.0],
            vec![4.0e-9, 1.0e-9, 6.0e-9],
        );
        assert_eq!(spectrum.len(), 3);
        assert_eq!(
            spectrum.relative_ion_currents,
            vec![2.0e-9, 0.5e-9, 3.0e-9]
        );
    }

    #[test]
    fn test_signal_at() {
        let spectrum = Spectrum::new(
            header(),
            vec![28.0, 44.0, 44.0],
            vec![4.0, 6.0, 8.0],
        );
        assert_eq!(spectrum.signal_at(CO2_MASS), Some(3.0));
        assert_eq!(spectrum.signal_at(28.0), Some(2.0));
        assert_eq!(spectrum.signal_at(18.0), None);
    }
}
