use rayon::prelude::*;
use vf_cube::{DataCube, MaskCube};
use vf_filter::{boxcar_1d, optimal_boxcar_params, pseudo_gaussian_2d};
use vf_noise::NoiseStatistic;
use vf_stats::FluxRange;

use crate::error::{Result, ScfindError};
use crate::kernels::prepare_kernels;

#[inline]
fn sign(x: f32) -> f32 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Smooths every z-plane of `buf` (`nx * ny * nz`, x fastest) in place
/// with a 2-D pseudo-Gaussian of standard deviation `sigma`.
fn smooth_spatial(buf: &mut [f32], nx: usize, ny: usize, sigma: f64) -> Result<()> {
    if sigma <= 0.0 {
        return Ok(());
    }
    let (radius, n_iter) = optimal_boxcar_params(sigma);
    let plane_size = nx * ny;
    buf.par_chunks_mut(plane_size)
        .try_for_each(|plane| pseudo_gaussian_2d(plane, nx, ny, radius, n_iter))?;
    Ok(())
}

/// Smooths every spectral column of `buf` in place with a 1-D boxcar of
/// the given `radius` (already halved from the odd kernel length).
///
/// Columns are gathered and filtered independently in parallel, then
/// scattered back sequentially (each column is a disjoint strided slice
/// at spacing `plane_size`, not a contiguous range, so it can't be
/// filtered in place via `par_chunks_mut`).
fn smooth_spectral(buf: &mut [f32], nx: usize, ny: usize, nz: usize, radius: usize) {
    if radius == 0 {
        return;
    }
    let plane_size = nx * ny;
    let columns: Vec<Vec<f32>> = (0..plane_size)
        .into_par_iter()
        .map(|plane_idx| {
            let mut column: Vec<f32> = (0..nz).map(|z| buf[plane_idx + plane_size * z]).collect();
            boxcar_1d(&mut column, radius);
            column
        })
        .collect();

    for (plane_idx, column) in columns.into_iter().enumerate() {
        for (z, v) in column.into_iter().enumerate() {
            buf[plane_idx + plane_size * z] = v;
        }
    }
}

/// Runs the multi-scale Smooth-and-Clip finder.
///
/// For each `(spatial_sigma, spectral_length)` pair, ordered ascending
/// outer-spatial / inner-spectral, this copies the data cube, clamps
/// already-detected voxels to `sign(v) * replacement * sigma_global`,
/// smooths spatially and/or spectrally, re-estimates the noise, and
/// unions `|smoothed| > threshold * sigma` into `mask`.
///
/// # Errors
/// Returns an error if any sigma, threshold, or replacement value is
/// non-finite, or a sigma is not strictly less than `min(nx, ny)`.
#[allow(clippy::too_many_arguments)]
pub fn run_scfind(
    data: &DataCube,
    mask: &mut MaskCube<i8>,
    spatial_sigmas: &[f64],
    spectral_lengths: &[usize],
    threshold: f64,
    replacement: f64,
    statistic: NoiseStatistic,
    range: FluxRange,
) -> Result<()> {
    if !threshold.is_finite() {
        return Err(ScfindError::InvalidThreshold(threshold));
    }
    if !replacement.is_finite() {
        return Err(ScfindError::InvalidReplacement(replacement));
    }

    let (nx, ny, nz) = data.shape();
    let (spatial, spectral) = prepare_kernels(spatial_sigmas, spectral_lengths, nx, ny)?;

    let sigma_global = {
        let s = statistic.estimate(data.as_slice(), 1, range);
        if s.is_finite() && s != 0.0 {
            s as f64
        } else {
            1.0
        }
    };

    for &s in &spatial {
        for &k in &spectral {
            let mut scratch: Vec<f32> = data.as_slice().to_vec();

            for (i, v) in scratch.iter_mut().enumerate() {
                if mask.as_slice()[i] != 0 {
                    *v = sign(*v) * (replacement * sigma_global) as f32;
                }
            }

            smooth_spatial(&mut scratch, nx, ny, s)?;
            if k >= 3 {
                smooth_spectral(&mut scratch, nx, ny, nz, (k - 1) / 2);
            }

            let sigma = statistic.estimate(&scratch, 1, range);
            if !sigma.is_finite() || sigma == 0.0 {
                continue;
            }
            let clip = threshold as f32 * sigma;

            for (i, &v) in scratch.iter().enumerate() {
                if v.is_finite() && v.abs() > clip {
                    mask.as_mut_slice()[i] = 1;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_scfind_single_voxel_source() {
        let mut data = DataCube::new_blank(8, 8, 8).unwrap();
        data.set(4, 4, 4, 100.0);
        let mut mask = MaskCube::<i8>::new_blank(8, 8, 8).unwrap();

        run_scfind(&data, &mut mask, &[0.0], &[0], 5.0, 2.0, NoiseStatistic::Std, FluxRange::Full).unwrap();

        assert_eq!(mask.get(4, 4, 4), 1);
        assert_eq!(mask.get(0, 0, 0), 0);
    }

    #[test]
    fn test_run_scfind_rejects_nonfinite_threshold() {
        let data = DataCube::new_blank(4, 4, 4).unwrap();
        let mut mask = MaskCube::<i8>::new_blank(4, 4, 4).unwrap();
        let err = run_scfind(&data, &mut mask, &[0.0], &[0], f64::NAN, 2.0, NoiseStatistic::Std, FluxRange::Full);
        assert!(err.is_err());
    }

    #[test]
    fn test_run_scfind_unions_across_kernels() {
        let mut data = DataCube::new_blank(16, 16, 16).unwrap();
        data.set(8, 8, 8, 50.0);
        data.set(2, 2, 2, 50.0);
        let mut mask = MaskCube::<i8>::new_blank(16, 16, 16).unwrap();

        // Two different spatial scales should each be able to contribute
        // detections; the mask accumulates across both.
        run_scfind(&data, &mut mask, &[0.0, 2.0], &[0], 4.0, 2.0, NoiseStatistic::Std, FluxRange::Full).unwrap();

        assert_eq!(mask.get(8, 8, 8), 1);
        assert_eq!(mask.get(2, 2, 2), 1);
    }
}
