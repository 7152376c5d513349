use crate::range::{admitted, FluxRange};

/// Minimum and maximum finite value in `buf`.
///
/// Returns `(NAN, NAN)` if every sample is non-finite or `buf` is empty.
pub fn min_max(buf: &[f32]) -> (f32, f32) {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    let mut any = false;

    for &v in buf {
        if v.is_finite() {
            any = true;
            if v < lo {
                lo = v;
            }
            if v > hi {
                hi = v;
            }
        }
    }

    if any {
        (lo, hi)
    } else {
        (f32::NAN, f32::NAN)
    }
}

/// Sum of finite values in `buf`.
///
/// Returns `NAN` if `buf` contains no finite samples.
pub fn sum(buf: &[f32]) -> f32 {
    let mut total = 0.0f32;
    let mut any = false;
    for &v in buf {
        if v.is_finite() {
            total += v;
            any = true;
        }
    }
    if any {
        total
    } else {
        f32::NAN
    }
}

/// Arithmetic mean of finite values in `buf`.
///
/// Returns `NAN` if `buf` contains no finite samples.
pub fn mean(buf: &[f32]) -> f32 {
    let mut total = 0.0f32;
    let mut count = 0usize;
    for &v in buf {
        if v.is_finite() {
            total += v;
            count += 1;
        }
    }
    if count == 0 {
        f32::NAN
    } else {
        total / count as f32
    }
}

/// Arithmetic mean of `buf`, admitting only every `stride`-th sample that
/// satisfies `range`.
///
/// Returns `NAN` if no sample is admitted.
pub fn mean_admitted(buf: &[f32], stride: usize, range: FluxRange) -> f32 {
    assert!(stride >= 1, "mean_admitted: stride must be >= 1");
    let mut total = 0.0f64;
    let mut count = 0usize;
    for (i, &v) in buf.iter().enumerate() {
        if admitted(v, i, stride, range) {
            total += v as f64;
            count += 1;
        }
    }
    if count == 0 {
        f32::NAN
    } else {
        (total / count as f64) as f32
    }
}

/// Standard deviation of `buf` about a user-supplied value `mu`, admitting
/// only every `stride`-th sample that satisfies `range`.
///
/// `sqrt(sum((x - mu)^2) / k)` where `k` is the number of admitted samples.
/// Returns `NAN` if no sample is admitted.
pub fn std_dev_about(buf: &[f32], mu: f32, stride: usize, range: FluxRange) -> f32 {
    assert!(stride >= 1, "std_dev_about: stride must be >= 1");
    let mut total = 0.0f64;
    let mut count = 0usize;

    for (i, &v) in buf.iter().enumerate() {
        if admitted(v, i, stride, range) {
            let d = (v - mu) as f64;
            total += d * d;
            count += 1;
        }
    }

    if count == 0 {
        f32::NAN
    } else {
        (total / count as f64).sqrt() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[3.0, 1.0, 2.0]), (1.0, 3.0));
        assert_eq!(min_max(&[1.0, f32::NAN, 3.0]), (1.0, 3.0));
        let (lo, hi) = min_max(&[f32::NAN, f32::NAN]);
        assert!(lo.is_nan() && hi.is_nan());
    }

    #[test]
    fn test_mean_admitted_range_and_stride() {
        let data = [-2.0, 2.0, -4.0, 4.0];
        assert_eq!(mean_admitted(&data, 1, FluxRange::Positive), 3.0);
        assert_eq!(mean_admitted(&data, 2, FluxRange::Full), -3.0);
        assert!(mean_admitted(&[1.0, 2.0], 1, FluxRange::Negative).is_nan());
    }

    #[test]
    fn test_sum_mean() {
        assert_eq!(sum(&[1.0, 2.0, 3.0]), 6.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(sum(&[1.0, f32::NAN, 3.0]), 4.0);
        assert!(mean(&[f32::NAN]).is_nan());
    }

    #[test]
    fn test_std_dev_about_mean() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mu = mean(&data);
        let sd = std_dev_about(&data, mu, 1, FluxRange::Full);
        assert!((sd - 1.4142135).abs() < 1e-4);
    }

    #[test]
    fn test_std_dev_about_range() {
        let data = [-2.0, -1.0, 1.0, 2.0];
        let sd_neg = std_dev_about(&data, 0.0, 1, FluxRange::Negative);
        assert!((sd_neg - 1.5811388).abs() < 1e-4);
    }

    #[test]
    fn test_std_dev_about_stride() {
        let data = [100.0, 1.0, 100.0, 1.0];
        let sd = std_dev_about(&data, 1.0, 2, FluxRange::Full);
        assert_eq!(sd, 0.0);
    }

    #[test]
    fn test_std_dev_about_no_samples() {
        let data = [1.0, 2.0, 3.0];
        assert!(std_dev_about(&data, 0.0, 1, FluxRange::Negative).is_nan());
    }
}
