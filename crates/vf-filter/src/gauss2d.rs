use crate::boxcar::boxcar_1d;
use crate::error::{FilterError, Result};

/// Applies a pseudo-Gaussian filter to a `size_x * size_y` image stored
/// row-major in `buf`, by running `n_iter` boxcar passes of `radius`
/// along each axis in turn.
///
/// Iterating a boxcar filter converges to a Gaussian kernel by the
/// central limit theorem; [`crate::boxcar::optimal_boxcar_params`] picks
/// `radius`/`n_iter` for a target standard deviation. Three to four
/// iterations already give a reasonable approximation.
pub fn pseudo_gaussian_2d(
    buf: &mut [f32],
    size_x: usize,
    size_y: usize,
    radius: usize,
    n_iter: usize,
) -> Result<()> {
    if buf.len() != size_x * size_y {
        return Err(FilterError::DimensionMismatch {
            size_x,
            size_y,
            len: buf.len(),
        });
    }

    for row in buf.chunks_mut(size_x) {
        for _ in 0..n_iter {
            boxcar_1d(row, radius);
        }
    }

    let mut column = vec![0.0f32; size_y];
    for x in 0..size_x {
        for y in 0..size_y {
            column[y] = buf[y * size_x + x];
        }
        for _ in 0..n_iter {
            boxcar_1d(&mut column, radius);
        }
        for y in 0..size_y {
            buf[y * size_x + x] = column[y];
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pseudo_gaussian_preserves_constant_interior() {
        let size_x = 10;
        let size_y = 10;
        let mut buf = vec![2.0f32; size_x * size_y];
        pseudo_gaussian_2d(&mut buf, size_x, size_y, 1, 3).unwrap();
        let centre = buf[5 * size_x + 5];
        assert!((centre - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_pseudo_gaussian_dimension_mismatch() {
        let mut buf = vec![0.0f32; 9];
        assert!(pseudo_gaussian_2d(&mut buf, 4, 4, 1, 3).is_err());
    }

    #[test]
    fn test_pseudo_gaussian_smooths_spike() {
        let size_x = 9;
        let size_y = 9;
        let mut buf = vec![0.0f32; size_x * size_y];
        buf[4 * size_x + 4] = 100.0;
        pseudo_gaussian_2d(&mut buf, size_x, size_y, 2, 4).unwrap();
        assert!(buf[4 * size_x + 4] < 100.0);
        assert!(buf[4 * size_x + 3] > 0.0);
        assert!(buf[3 * size_x + 4] > 0.0);
    }
}
