use crate::moments::min_max;
use crate::range::FluxRange;

const N_BINS: usize = 101;
/// Target fraction of the histogram width covered by the distribution's
/// second moment; the histogram is rescaled once to approach this before
/// the final fit.
const INV_OPTIMAL_MOM2: f64 = 5.0 / N_BINS as f64;

fn create_histogram(buf: &[f32], stride: usize, data_min: f64, data_max: f64) -> Vec<u64> {
    let mut histogram = vec![0u64; N_BINS];
    let slope = (N_BINS - 1) as f64 / (data_max - data_min);
    let offset = 0.5 - slope * data_min;

    for &v in buf.iter().step_by(stride) {
        let v = v as f64;
        if v >= data_min && v <= data_max {
            let bin = (slope * v + offset) as usize;
            histogram[bin.min(N_BINS - 1)] += 1;
        }
    }

    histogram
}

/// Estimates the Gaussian standard deviation of `buf` by fitting a
/// parabola to the logarithm of a histogram of the data.
///
/// Only every `stride`-th sample is used, restricted to `range`. The
/// histogram is built twice: once to measure the distribution's second
/// moment, and again after rescaling the bin limits so that moment covers
/// an optimal fraction of the histogram width. A linear regression of
/// `ln(count)` against `(bin - origin)^2` over the interior bins then
/// yields the standard deviation from the fitted slope.
///
/// Returns `NAN` if the data has no dynamic range in the requested
/// direction, or if fewer than two interior bins carry counts.
pub fn gauss_fit(buf: &[f32], stride: usize, range: FluxRange) -> f32 {
    assert!(stride >= 1, "gauss_fit: stride must be >= 1");

    let (data_min, data_max) = min_max(buf);
    if !(data_min.is_finite() && data_max.is_finite()) || data_min >= 0.0 || data_max <= 0.0 {
        return f32::NAN;
    }

    let (mut data_min, mut data_max) = (data_min as f64, data_max as f64);
    let origin: usize = match range {
        FluxRange::Negative => {
            if data_min >= 0.0 {
                return f32::NAN;
            }
            data_max = 0.0;
            N_BINS - 1
        }
        FluxRange::Positive => {
            if data_max <= 0.0 {
                return f32::NAN;
            }
            data_min = 0.0;
            0
        }
        FluxRange::Full => {
            let limit = data_min.abs().min(data_max.abs());
            data_min = -limit;
            data_max = limit;
            N_BINS / 2
        }
    };

    let histogram = create_histogram(buf, stride, data_min, data_max);

    let mut mom0 = 0.0f64;
    let mut mom1 = 0.0f64;
    for (i, &count) in histogram.iter().enumerate() {
        mom0 += count as f64;
        mom1 += count as f64 * i as f64;
    }
    if mom0 == 0.0 {
        return f32::NAN;
    }
    mom1 /= mom0;

    let mut mom2 = 0.0f64;
    for (i, &count) in histogram.iter().enumerate() {
        let d = mom1 - i as f64;
        mom2 += count as f64 * d * d;
    }
    let mom2 = (mom2 / mom0).sqrt();

    match range {
        FluxRange::Negative => data_min *= mom2 * INV_OPTIMAL_MOM2,
        FluxRange::Positive => data_max *= mom2 * INV_OPTIMAL_MOM2,
        FluxRange::Full => {
            data_min *= mom2 * INV_OPTIMAL_MOM2;
            data_max *= mom2 * INV_OPTIMAL_MOM2;
        }
    }

    let histogram = create_histogram(buf, stride, data_min, data_max);

    let mut mean_x = 0.0f64;
    let mut mean_y = 0.0f64;
    let mut counter = 0usize;
    for i in 1..N_BINS - 1 {
        if histogram[i] > 0 {
            let ii = i as i64 - origin as i64;
            mean_x += (ii * ii) as f64;
            mean_y += (histogram[i] as f64).ln();
            counter += 1;
        }
    }
    if counter == 0 {
        return f32::NAN;
    }
    mean_x /= counter as f64;
    mean_y /= counter as f64;

    let mut upper_sum = 0.0f64;
    let mut lower_sum = 0.0f64;
    for i in 1..N_BINS - 1 {
        if histogram[i] > 0 {
            let ii = i as i64 - origin as i64;
            let x = (ii * ii) as f64;
            let y = (histogram[i] as f64).ln();
            upper_sum += (x - mean_x) * (y - mean_y);
            lower_sum += (x - mean_x) * (x - mean_x);
        }
    }

    if upper_sum == 0.0 || lower_sum == 0.0 {
        return f32::NAN;
    }

    let sigma = (-0.5 * lower_sum / upper_sum).sqrt() * (data_max - data_min) / (N_BINS - 1) as f64;
    sigma as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand::distributions::Standard;

    fn gaussian_sample(rng: &mut StdRng, sigma: f32) -> f32 {
        // Box-Muller transform.
        let u1: f32 = rng.sample(Standard);
        let u2: f32 = rng.sample(Standard);
        let u1 = u1.max(1e-9);
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos() * sigma
    }

    #[test]
    fn test_gauss_fit_recovers_sigma() {
        let mut rng = StdRng::seed_from_u64(42);
        let sigma_true = 3.0f32;
        let data: Vec<f32> = (0..200_000).map(|_| gaussian_sample(&mut rng, sigma_true)).collect();
        let sigma_est = gauss_fit(&data, 1, FluxRange::Full);
        assert!(sigma_est.is_finite());
        assert!((sigma_est - sigma_true).abs() / sigma_true < 0.1);
    }

    #[test]
    fn test_gauss_fit_no_dynamic_range() {
        let data = vec![1.0f32; 100];
        assert!(gauss_fit(&data, 1, FluxRange::Full).is_nan());
    }

    #[test]
    fn test_gauss_fit_negative_only_requires_negative_data() {
        let data = vec![1.0f32, 2.0, 3.0];
        assert!(gauss_fit(&data, 1, FluxRange::Negative).is_nan());
    }
}
