//! Estimate the background level of an ion current trace.
//!
//! Between peaks a quadrupole detector reports its noise floor, a flat
//! level repeated across many m/q steps, so the most common trace value
//! is taken as the baseline.

use num_traits::{Float, FromPrimitive};
use thiserror::Error;

/// Bin count used when no explicit histogram resolution is requested.
pub const DEFAULT_BINS: usize = 10;

/// All the ways baseline estimation can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BaselineError {
    #[error("cannot estimate a baseline from an empty trace")]
    EmptyTrace,
    #[error("no value repeats in the trace, its mode is undefined")]
    NoRepeatedValue,
}

/// The baseline estimator to apply to an ion current trace.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BaselineMethod {
    /// The most frequently occurring exact value in the trace. Ties break
    /// toward the smaller value. Fails with
    /// [`BaselineError::NoRepeatedValue`] when every sample is distinct.
    #[default]
    Mode,
    /// Bin the trace into `bins` equal-width intensity bins and return the
    /// mean of the most populated bin. Ties break toward the lower bin.
    /// Robust for traces whose noise floor drifts enough that exact values
    /// never repeat.
    Histogram { bins: usize },
}

impl BaselineMethod {
    pub fn estimate<T: Float + FromPrimitive>(&self, trace: &[T]) -> Result<T, BaselineError> {
        match self {
            Self::Mode => mode(trace),
            Self::Histogram { bins } => histogram_mode(trace, *bins),
        }
    }
}

pub fn minmax<T: Float>(values: &[T]) -> (T, T) {
    let mut max = -T::infinity();
    let mut min = T::infinity();

    for v in values.iter() {
        if *v > max {
            max = *v;
        }
        if *v < min {
            min = *v
        }
    }
    (min, max)
}

/// The statistical mode of `trace`: the exact value occurring most often.
pub fn mode<T: Float>(trace: &[T]) -> Result<T, BaselineError> {
    if trace.is_empty() {
        return Err(BaselineError::EmptyTrace);
    }
    let mut sorted = trace.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mut best_value = sorted[0];
    let mut best_len = 1;
    let mut run_value = sorted[0];
    let mut run_len = 1;
    for v in sorted.iter().skip(1).copied() {
        if v == run_value {
            run_len += 1;
        } else {
            run_value = v;
            run_len = 1;
        }
        if run_len > best_len {
            best_len = run_len;
            best_value = run_value;
        }
    }
    if best_len < 2 {
        return Err(BaselineError::NoRepeatedValue);
    }
    Ok(best_value)
}

/// A binned rendition of [`mode`]: populate an equal-width histogram over
/// the trace and return the mean of the densest bin.
pub fn histogram_mode<T: Float + FromPrimitive>(
    trace: &[T],
    bins: usize,
) -> Result<T, BaselineError> {
    if trace.is_empty() {
        return Err(BaselineError::EmptyTrace);
    }
    let bins = bins.max(1);
    let (min, max) = minmax(trace);
    if min == max {
        // a flat trace is its own baseline
        return Ok(min);
    }
    let binwidth = (max - min) / T::from_usize(bins).unwrap();

    let mut bin_count = vec![0usize; bins];
    let mut bin_total = vec![T::zero(); bins];
    for v in trace.iter().copied() {
        let mut j = ((v - min) / binwidth).to_usize().unwrap_or(0);
        if j >= bins {
            j = bins - 1;
        }
        bin_count[j] += 1;
        bin_total[j] = bin_total[j] + v;
    }

    let mut densest = 0;
    for j in 1..bins {
        if bin_count[j] > bin_count[densest] {
            densest = j;
        }
    }
    Ok(bin_total[densest] / T::from_usize(bin_count[densest]).unwrap())
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mode() {
        let trace = [0.1, 0.1, 0.1, 5.0, 3.0];
        assert_eq!(mode(&trace), Ok(0.1));
    }

    #[test]
    fn test_mode_tie_breaks_low() {
        let trace = [2.0, 1.0, 2.0, 1.0, 0.5];
        assert_eq!(mode(&trace), Ok(1.0));
    }

    #[test]
    fn test_mode_all_distinct() {
        let trace = [1.0, 2.0, 3.0];
        assert_eq!(mode(&trace), Err(BaselineError::NoRepeatedValue));
        assert_eq!(mode::<f64>(&[]), Err(BaselineError::EmptyTrace));
    }

    #[test]
    fn test_histogram_mode() {
        let trace = [0.1, 0.12, 0.11, 5.0, 3.0];
        let baseline = histogram_mode(&trace, DEFAULT_BINS).unwrap();
        assert_abs_diff_eq!(baseline, 0.11, epsilon = 1e-12);
    }

    #[test]
    fn test_histogram_mode_flat_trace() {
        let trace = [2.5, 2.5, 2.5];
        assert_eq!(histogram_mode(&trace, DEFAULT_BINS), Ok(2.5));
    }

    #[test]
    fn test_method_dispatch() {
        let trace = [0.1, 0.1, 0.1, 5.0, 3.0];
        assert_eq!(BaselineMethod::default().estimate(&trace), Ok(0.1));
        let binned = BaselineMethod::Histogram { bins: DEFAULT_BINS }
            .estimate(&trace)
            .unwrap();
        assert_abs_diff_eq!(binned, 0.1, epsilon = 1e-12);
    }
}
