use crate::error::{Result, ScfindError};

/// Validates and sorts the spatial-sigma and spectral-length kernel
/// lists, promoting even spectral lengths to the next odd value with a
/// warning, per spec.md's S+C edge-case policy.
///
/// Returns the two lists sorted ascending; the caller iterates their
/// cartesian product with the spatial axis outermost.
pub fn prepare_kernels(
    spatial_sigmas: &[f64],
    spectral_lengths: &[usize],
    nx: usize,
    ny: usize,
) -> Result<(Vec<f64>, Vec<usize>)> {
    let limit = nx.min(ny);

    let mut spatial: Vec<f64> = Vec::with_capacity(spatial_sigmas.len());
    for &sigma in spatial_sigmas {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(ScfindError::InvalidSigma { sigma });
        }
        if sigma > 0.0 && sigma >= limit as f64 {
            return Err(ScfindError::SigmaTooLarge { sigma, limit });
        }
        spatial.push(sigma);
    }
    spatial.sort_by(|a, b| a.partial_cmp(b).expect("already validated finite"));

    let mut spectral: Vec<usize> = spectral_lengths
        .iter()
        .map(|&k| {
            if k >= 2 && k % 2 == 0 {
                log::warn!("scfind: even spectral kernel length {} promoted to {}", k, k + 1);
                k + 1
            } else {
                k
            }
        })
        .collect();
    spectral.sort_unstable();

    Ok((spatial, spectral))
}
