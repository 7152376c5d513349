use vf_stats::FluxRange;

/// The noise estimator used by the S+C finder, threshold finder and both
/// noise-scaling modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseStatistic {
    /// Standard deviation about the admitted subsample's mean.
    Std,
    /// Median absolute deviation, converted to a Gaussian-equivalent sigma.
    Mad,
    /// Histogram-based Gaussian fit.
    Gauss,
}

impl NoiseStatistic {
    /// Estimates the noise of `buf`, admitting only every `stride`-th
    /// sample that satisfies `range`.
    ///
    /// Returns `NAN` if the chosen statistic cannot be computed (no
    /// admissible samples, or no dynamic range for the Gaussian fit).
    pub fn estimate(self, buf: &[f32], stride: usize, range: FluxRange) -> f32 {
        match self {
            NoiseStatistic::Std => {
                let mu = vf_stats::mean_admitted(buf, stride, range);
                if mu.is_nan() {
                    return f32::NAN;
                }
                vf_stats::std_dev_about(buf, mu, stride, range)
            }
            NoiseStatistic::Mad => vf_stats::mad_admitted(buf, stride, range),
            NoiseStatistic::Gauss => vf_stats::gauss_fit(buf, stride, range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_estimate() {
        let data = [-1.0, 1.0, -1.0, 1.0];
        let sigma = NoiseStatistic::Std.estimate(&data, 1, FluxRange::Full);
        assert!((sigma - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_mad_estimate() {
        let data = [-2.0, -1.0, 1.0, 2.0];
        let sigma = NoiseStatistic::Mad.estimate(&data, 1, FluxRange::Full);
        assert!(sigma.is_finite());
    }

    #[test]
    fn test_nan_on_empty_admission() {
        let data = [1.0, 2.0];
        assert!(NoiseStatistic::Std.estimate(&data, 1, FluxRange::Negative).is_nan());
    }
}
