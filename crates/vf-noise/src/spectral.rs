use rayon::prelude::*;
use vf_cube::DataCube;
use vf_stats::FluxRange;

use crate::statistic::NoiseStatistic;

/// Normalises every z-plane of `cube` by its own noise estimate.
///
/// A plane with no admissible samples (estimate is non-finite or zero)
/// is left unchanged, per spec.md's edge-case policy.
pub fn scale_noise_spec(cube: &mut DataCube, statistic: NoiseStatistic, range: FluxRange) {
    let (nx, ny, _) = cube.shape();
    let plane_size = nx * ny;

    cube.as_mut_slice()
        .par_chunks_mut(plane_size)
        .for_each(|plane| {
            let sigma = statistic.estimate(plane, 1, range);
            if sigma.is_finite() && sigma != 0.0 {
                plane.iter_mut().for_each(|v| *v /= sigma);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_noise_spec_normalises_planes() {
        let mut cube = DataCube::new_blank(4, 4, 2).unwrap();
        for v in cube.z_plane_mut(0) {
            *v = 2.0;
        }
        // Build a plane with a known std of 2 via +/-2 checkerboard.
        let plane1 = cube.z_plane_mut(1);
        for (i, v) in plane1.iter_mut().enumerate() {
            *v = if i % 2 == 0 { 2.0 } else { -2.0 };
        }

        scale_noise_spec(&mut cube, NoiseStatistic::Std, FluxRange::Full);

        // Plane 0 is constant: std is 0, so it is left unchanged.
        assert!(cube.z_plane(0).iter().all(|&v| v == 2.0));
        // Plane 1 has std 2.0, so it becomes +/-1.
        assert!(cube.z_plane(1).iter().all(|&v| v.abs() - 1.0 < 1e-5));
    }

    #[test]
    fn test_scale_noise_spec_leaves_all_zero_plane_alone() {
        let mut cube = DataCube::new_blank(2, 2, 1).unwrap();
        scale_noise_spec(&mut cube, NoiseStatistic::Std, FluxRange::Full);
        assert!(cube.as_slice().iter().all(|&v| v == 0.0));
    }
}
