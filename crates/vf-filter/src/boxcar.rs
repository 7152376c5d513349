/// Minimum number of boxcar passes considered when approximating a
/// Gaussian kernel via [`optimal_boxcar_params`].
const BOXCAR_MIN_ITER: usize = 2;
/// Maximum number of boxcar passes considered when approximating a
/// Gaussian kernel via [`optimal_boxcar_params`].
const BOXCAR_MAX_ITER: usize = 8;

/// Replaces non-finite values with zero, as the boxcar filter treats them.
#[inline]
fn filter_nan(x: f32) -> f32 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Applies an in-place boxcar (moving average) filter of the given
/// `radius` to `buf`. A radius of zero leaves the (NaN-cleaned) data
/// unchanged.
///
/// Values beyond the array boundary are treated as zero, and non-finite
/// input values are replaced with zero before filtering. The filter is a
/// simple moving average of width `2 * radius + 1`, applied via a single
/// forward-difference recurrence after an initial window sum at the last
/// element.
pub fn boxcar_1d(buf: &mut [f32], radius: usize) {
    let size = buf.len();
    if size == 0 {
        return;
    }

    let filter_size = 2 * radius + 1;
    let inv_filter_size = 1.0 / filter_size as f32;

    let mut scratch = vec![0.0f32; size + 2 * radius];
    for (i, &v) in buf.iter().enumerate() {
        scratch[radius + i] = filter_nan(v);
    }
    // Edges beyond the array are implicitly zero from the vec init above.

    let mut last = 0.0f32;
    for i in 0..filter_size {
        last += scratch[size + i - 1];
    }
    last *= inv_filter_size;
    buf[size - 1] = last;

    for i in (0..size - 1).rev() {
        buf[i] = buf[i + 1] + (scratch[i] - scratch[filter_size + i]) * inv_filter_size;
    }
}

/// Finds the boxcar radius and iteration count that best approximate a
/// Gaussian kernel of standard deviation `sigma` when applied
/// repeatedly, searching iteration counts in `2..=8`.
///
/// Returns `(filter_radius, n_iter)`. Iterating the boxcar filter
/// converges to a Gaussian by the central limit theorem; this picks the
/// `(radius, n_iter)` pair whose implied radius is closest to an
/// integer, minimizing rounding error in the approximation.
pub fn optimal_boxcar_params(sigma: f64) -> (usize, usize) {
    let mut best_diff = -1.0f64;
    let mut best_radius = 0usize;
    let mut best_iter = 0usize;

    for n in BOXCAR_MIN_ITER..=BOXCAR_MAX_ITER {
        let radius = (3.0 * sigma * sigma / n as f64 + 0.25).sqrt() - 0.5;
        let diff = (radius - (radius + 0.5).floor()).abs();

        if best_diff < 0.0 || diff < best_diff {
            best_diff = diff;
            best_iter = n;
            best_radius = (radius + 0.5) as usize;
        }
    }

    (best_radius, best_iter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_boxcar_identity_radius_zero() {
        let mut data = vec![1.0, 2.0, 3.0, 4.0];
        boxcar_1d(&mut data, 0);
        assert_eq!(data, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_boxcar_constant_preserved() {
        let mut data = vec![5.0; 10];
        boxcar_1d(&mut data, 2);
        // Interior points (far from the zero-padded edges) stay at 5.0.
        for &v in &data[2..8] {
            assert_relative_eq!(v, 5.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_boxcar_replaces_nan() {
        let mut data = vec![1.0, f32::NAN, 1.0];
        boxcar_1d(&mut data, 1);
        assert!(data.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_optimal_boxcar_params_nonzero() {
        let (radius, n_iter) = optimal_boxcar_params(3.0);
        assert!(radius > 0);
        assert!((2..=8).contains(&n_iter));
    }
}
