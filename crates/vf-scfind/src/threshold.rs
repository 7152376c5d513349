use vf_cube::{DataCube, MaskCube};
use vf_noise::NoiseStatistic;
use vf_stats::FluxRange;

use crate::error::{Result, ScfindError};

/// The simple (unsmoothed) threshold finder's clipping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdMode {
    /// `mask[v] = 1` wherever `|data[v]| > threshold`, unscaled.
    Absolute,
    /// `mask[v] = 1` wherever `|data[v]| > threshold * sigma`, with
    /// `sigma` the chosen noise statistic over the unsmoothed cube.
    Relative,
}

/// Runs the single-shot threshold finder: the unsmoothed sibling of the
/// S+C finder used when `threshold.enable` is set instead of
/// `scfind.enable`.
///
/// # Errors
/// Returns [`ScfindError::InvalidThreshold`] if `threshold` is
/// non-finite.
pub fn run_threshold(
    data: &DataCube,
    mask: &mut MaskCube<i8>,
    mode: ThresholdMode,
    threshold: f64,
    statistic: NoiseStatistic,
    range: FluxRange,
) -> Result<()> {
    if !threshold.is_finite() {
        return Err(ScfindError::InvalidThreshold(threshold));
    }

    let clip = match mode {
        ThresholdMode::Absolute => threshold as f32,
        ThresholdMode::Relative => {
            let sigma = statistic.estimate(data.as_slice(), 1, range);
            if !sigma.is_finite() || sigma == 0.0 {
                return Ok(());
            }
            threshold as f32 * sigma
        }
    };

    for (i, &v) in data.as_slice().iter().enumerate() {
        if v.is_finite() && v.abs() > clip {
            mask.as_mut_slice()[i] = 1;
        }
    }

    Ok(())
}
