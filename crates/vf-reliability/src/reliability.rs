use rayon::prelude::*;
use vf_cube::Region;
use vf_linker::ObjectParams;

use crate::error::Result;
use crate::features::feature_vector;
use crate::kernel::{fit_inverse_bandwidth, kernel_weight};

/// Reliability stage configuration.
#[derive(Debug, Clone, Copy)]
pub struct ReliabilityParams {
    /// Multiplier on the negative population's covariance that sets the
    /// kernel bandwidth.
    pub scale_kernel: f64,
    /// Minimum total flux (`fmin`) gate: objects with
    /// `log10(f_sum) + log10(f_sum/n_pix) <= 2*log10(fmin)` keep the
    /// default reliability of `0` rather than being scored.
    pub fmin: f64,
}

fn intersects_any(obj: &ObjectParams, regions: &[Region]) -> bool {
    regions.iter().any(|r| {
        obj.x_min <= r.x_max
            && obj.x_max >= r.x_min
            && obj.y_min <= r.y_max
            && obj.y_max >= r.y_min
            && obj.z_min <= r.z_max
            && obj.z_max >= r.z_min
    })
}

/// Scores every positive object's reliability `R in [0, 1]` using a
/// multivariate Gaussian kernel density fit to the negative population.
///
/// Negative objects whose bounding box intersects any of
/// `exclusion_regions` (a world-coordinate reliability catalogue
/// translated to pixel space upstream) are excluded from the kernel fit
/// entirely, not merely from the output catalogue, mirroring
/// `original_source`'s `rel_cat` handling. Objects below the `fmin` gate
/// are left at their default `rel = 0` without being scored.
///
/// Mutates `table` in place, writing each qualifying positive object's
/// `rel` field.
///
/// # Errors
/// Returns [`crate::ReliabilityError::NotEnoughNegatives`] or
/// [`crate::ReliabilityError::SingularCovariance`] if the negative
/// population cannot support a kernel fit.
pub fn run_reliability(
    table: &mut [ObjectParams],
    params: &ReliabilityParams,
    exclusion_regions: &[Region],
) -> Result<()> {
    let negatives: Vec<[f64; 3]> = table
        .iter()
        .filter(|o| o.f_sum < 0.0 && !intersects_any(o, exclusion_regions))
        .filter_map(feature_vector)
        .collect();

    let inv_cov = fit_inverse_bandwidth(&negatives, params.scale_kernel)?;

    let positive_features: Vec<[f64; 3]> = table
        .iter()
        .filter(|o| o.f_sum > 0.0)
        .filter_map(feature_vector)
        .collect();

    let log_fmin_sq = 2.0 * params.fmin.log10();

    let gated_indices: Vec<usize> = table
        .iter()
        .enumerate()
        .filter_map(|(i, o)| {
            if o.f_sum <= 0.0 {
                return None;
            }
            let f = feature_vector(o)?;
            let gate = f[1] + f[2];
            if gate > log_fmin_sq {
                Some(i)
            } else {
                None
            }
        })
        .collect();

    let scored: Vec<(usize, f32)> = gated_indices
        .par_iter()
        .map(|&i| {
            let v = feature_vector(&table[i]).expect("gated index always has a feature vector");
            let p: f64 = positive_features.iter().map(|pj| kernel_weight(&v, pj, &inv_cov)).sum();
            let n: f64 = negatives.iter().map(|nj| kernel_weight(&v, nj, &inv_cov)).sum();
            let r = if p > 0.0 { ((p - n) / p).max(0.0) } else { 0.0 };
            (i, r as f32)
        })
        .collect();

    for (i, r) in scored {
        table[i].rel = r;
    }

    Ok(())
}
