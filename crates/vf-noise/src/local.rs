use rayon::prelude::*;
use vf_cube::DataCube;
use vf_stats::FluxRange;

use crate::error::{NoiseError, Result};
use crate::statistic::NoiseStatistic;

/// Grid node positions along one axis: `0, spacing, 2*spacing, ...`,
/// clamped so the final node always lands on `n - 1`.
fn grid_positions(n: usize, spacing: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let mut positions = Vec::new();
    let mut i = 0usize;
    loop {
        let p = i.min(n - 1);
        if positions.last() != Some(&p) {
            positions.push(p);
        }
        if p == n - 1 {
            break;
        }
        i += spacing;
    }
    positions
}

/// A sparse lattice of noise estimates, one per grid node, plus the node
/// positions along each axis.
struct NoiseLattice {
    gx: Vec<usize>,
    gy: Vec<usize>,
    gz: Vec<usize>,
    values: Vec<f32>,
}

impl NoiseLattice {
    #[inline]
    fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        ix + self.gx.len() * (iy + self.gy.len() * iz)
    }

    fn get(&self, ix: usize, iy: usize, iz: usize) -> f32 {
        self.values[self.index(ix, iy, iz)]
    }

    /// Replaces every non-finite lattice value with that of its nearest
    /// (by grid-index Euclidean distance) finite node.
    fn fill_invalid_from_nearest(&mut self) {
        let n = self.values.len();
        let valid: Vec<usize> = (0..n).filter(|&i| self.values[i].is_finite()).collect();
        if valid.is_empty() || valid.len() == n {
            return;
        }
        let dims = (self.gx.len(), self.gy.len(), self.gz.len());
        let coord = |i: usize| -> (usize, usize, usize) {
            let ix = i % dims.0;
            let iy = (i / dims.0) % dims.1;
            let iz = i / (dims.0 * dims.1);
            (ix, iy, iz)
        };

        let mut filled = self.values.clone();
        for i in 0..n {
            if self.values[i].is_finite() {
                continue;
            }
            let (ix, iy, iz) = coord(i);
            let mut best_dist = f64::INFINITY;
            let mut best_val = f32::NAN;
            for &j in &valid {
                let (jx, jy, jz) = coord(j);
                let dx = ix as f64 - jx as f64;
                let dy = iy as f64 - jy as f64;
                let dz = iz as f64 - jz as f64;
                let dist = dx * dx + dy * dy + dz * dz;
                if dist < best_dist {
                    best_dist = dist;
                    best_val = self.values[j];
                }
            }
            filled[i] = best_val;
        }
        self.values = filled;
    }

    /// Locates the bracketing grid index pair and interpolation fraction
    /// for coordinate `x` along an axis with node positions `axis`.
    fn bracket(axis: &[usize], x: usize) -> (usize, usize, f64) {
        if axis.len() == 1 {
            return (0, 0, 0.0);
        }
        let mut lo = 0usize;
        while lo + 1 < axis.len() && axis[lo + 1] <= x {
            lo += 1;
        }
        let hi = (lo + 1).min(axis.len() - 1);
        if hi == lo {
            return (lo, hi, 0.0);
        }
        let span = (axis[hi] - axis[lo]) as f64;
        let t = if span > 0.0 {
            (x as f64 - axis[lo] as f64) / span
        } else {
            0.0
        };
        (lo, hi, t.clamp(0.0, 1.0))
    }

    /// Nearest-grid-node projection of the lattice onto a dense cube of
    /// shape `(nx, ny, nz)`.
    fn project_nearest(&self, nx: usize, ny: usize, nz: usize) -> DataCube {
        let mut out = DataCube::new_blank(nx, ny, nz).expect("shape already validated upstream");
        for z in 0..nz {
            let iz = nearest_index(&self.gz, z);
            for y in 0..ny {
                let iy = nearest_index(&self.gy, y);
                for x in 0..nx {
                    let ix = nearest_index(&self.gx, x);
                    out.set(x, y, z, self.get(ix, iy, iz));
                }
            }
        }
        out
    }

    /// Trilinear interpolation of the lattice onto a dense cube of shape
    /// `(nx, ny, nz)`.
    fn project_trilinear(&self, nx: usize, ny: usize, nz: usize) -> DataCube {
        let mut out = DataCube::new_blank(nx, ny, nz).expect("shape already validated upstream");
        for z in 0..nz {
            let (z0, z1, tz) = Self::bracket(&self.gz, z);
            for y in 0..ny {
                let (y0, y1, ty) = Self::bracket(&self.gy, y);
                for x in 0..nx {
                    let (x0, x1, tx) = Self::bracket(&self.gx, x);

                    let c000 = self.get(x0, y0, z0) as f64;
                    let c100 = self.get(x1, y0, z0) as f64;
                    let c010 = self.get(x0, y1, z0) as f64;
                    let c110 = self.get(x1, y1, z0) as f64;
                    let c001 = self.get(x0, y0, z1) as f64;
                    let c101 = self.get(x1, y0, z1) as f64;
                    let c011 = self.get(x0, y1, z1) as f64;
                    let c111 = self.get(x1, y1, z1) as f64;

                    let c00 = c000 * (1.0 - tx) + c100 * tx;
                    let c10 = c010 * (1.0 - tx) + c110 * tx;
                    let c01 = c001 * (1.0 - tx) + c101 * tx;
                    let c11 = c011 * (1.0 - tx) + c111 * tx;

                    let c0 = c00 * (1.0 - ty) + c10 * ty;
                    let c1 = c01 * (1.0 - ty) + c11 * ty;

                    let v = c0 * (1.0 - tz) + c1 * tz;
                    out.set(x, y, z, v as f32);
                }
            }
        }
        out
    }
}

fn nearest_index(axis: &[usize], x: usize) -> usize {
    let mut best = 0usize;
    let mut best_dist = usize::MAX;
    for (i, &p) in axis.iter().enumerate() {
        let dist = p.abs_diff(x);
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

/// Tiles `cube` into boxes of size `(window_xy, window_xy, window_z)` on
/// a grid spaced `(grid_xy, grid_z)` apart, estimates the noise in each
/// tile, projects the result to a dense noise cube, and divides `cube`
/// by it in place.
///
/// Returns the dense noise cube so the caller can optionally write it
/// out. A tile whose statistic is non-finite or zero is filled from its
/// nearest valid grid node before projection.
///
/// # Errors
/// Returns [`NoiseError::NonPositiveParameter`] if any window/grid
/// parameter is zero, or [`NoiseError::GridExceedsWindow`] if a grid
/// spacing exceeds its matching window size.
pub fn scale_noise_local(
    cube: &mut DataCube,
    statistic: NoiseStatistic,
    range: FluxRange,
    window_xy: usize,
    window_z: usize,
    grid_xy: usize,
    grid_z: usize,
    interpolate: bool,
) -> Result<DataCube> {
    if window_xy == 0 || window_z == 0 || grid_xy == 0 || grid_z == 0 {
        return Err(NoiseError::NonPositiveParameter {
            window_xy,
            window_z,
            grid_xy,
            grid_z,
        });
    }
    if grid_xy > window_xy || grid_z > window_z {
        return Err(NoiseError::GridExceedsWindow {
            grid_xy,
            grid_z,
            window_xy,
            window_z,
        });
    }

    let (nx, ny, nz) = cube.shape();
    let gx = grid_positions(nx, grid_xy);
    let gy = grid_positions(ny, grid_xy);
    let gz = grid_positions(nz, grid_z);

    let half_xy = window_xy / 2;
    let half_z = window_z / 2;

    let node_coords: Vec<(usize, usize, usize)> = (0..gz.len())
        .flat_map(|iz| {
            (0..gy.len()).flat_map(move |iy| (0..gx.len()).map(move |ix| (ix, iy, iz)))
        })
        .collect();

    let values: Vec<f32> = node_coords
        .par_iter()
        .map(|&(ix, iy, iz)| {
            let (cx, cy, cz) = (gx[ix], gy[iy], gz[iz]);
            let x_lo = cx.saturating_sub(half_xy);
            let x_hi = (cx + half_xy).min(nx - 1);
            let y_lo = cy.saturating_sub(half_xy);
            let y_hi = (cy + half_xy).min(ny - 1);
            let z_lo = cz.saturating_sub(half_z);
            let z_hi = (cz + half_z).min(nz - 1);

            let mut window: Vec<f32> = Vec::with_capacity(
                (x_hi - x_lo + 1) * (y_hi - y_lo + 1) * (z_hi - z_lo + 1),
            );
            for z in z_lo..=z_hi {
                for y in y_lo..=y_hi {
                    for x in x_lo..=x_hi {
                        window.push(cube.get(x, y, z));
                    }
                }
            }

            let sigma = statistic.estimate(&window, 1, range);
            if sigma.is_finite() && sigma != 0.0 {
                sigma
            } else {
                f32::NAN
            }
        })
        .collect();

    let mut lattice = NoiseLattice { gx, gy, gz, values };
    lattice.fill_invalid_from_nearest();

    let noise_cube = if interpolate {
        lattice.project_trilinear(nx, ny, nz)
    } else {
        lattice.project_nearest(nx, ny, nz)
    };

    cube.divide(&noise_cube)?;
    Ok(noise_cube)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_positions_includes_endpoints() {
        assert_eq!(grid_positions(10, 4), vec![0, 4, 8, 9]);
        assert_eq!(grid_positions(1, 4), vec![0]);
        assert_eq!(grid_positions(5, 5), vec![0, 4]);
    }

    #[test]
    fn test_scale_noise_local_rejects_grid_exceeding_window() {
        let mut cube = DataCube::new_blank(8, 8, 8).unwrap();
        let err = scale_noise_local(&mut cube, NoiseStatistic::Std, FluxRange::Full, 4, 4, 8, 2, false);
        assert!(err.is_err());
    }

    #[test]
    fn test_scale_noise_local_normalises_uniform_noise() {
        let mut cube = DataCube::new_blank(16, 16, 4).unwrap();
        // deterministic +/-2 checkerboard so every tile has std exactly 2.
        for z in 0..4 {
            for y in 0..16 {
                for x in 0..16 {
                    let v = if (x + y + z) % 2 == 0 { 2.0 } else { -2.0 };
                    cube.set(x, y, z, v);
                }
            }
        }
        let noise = scale_noise_local(&mut cube, NoiseStatistic::Std, FluxRange::Full, 8, 4, 4, 2, false).unwrap();
        assert_eq!(noise.shape(), (16, 16, 4));
        for &v in cube.as_slice() {
            assert!((v.abs() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_scale_noise_local_trilinear_matches_nearest_on_constant_field() {
        let mut cube_nn = DataCube::new_blank(12, 12, 3).unwrap();
        let mut cube_tri = DataCube::new_blank(12, 12, 3).unwrap();
        for c in [&mut cube_nn, &mut cube_tri] {
            for z in 0..3 {
                for y in 0..12 {
                    for x in 0..12 {
                        let v = if (x + y) % 2 == 0 { 1.0 } else { -1.0 };
                        c.set(x, y, z, v);
                    }
                }
            }
        }
        scale_noise_local(&mut cube_nn, NoiseStatistic::Std, FluxRange::Full, 6, 3, 3, 3, false).unwrap();
        scale_noise_local(&mut cube_tri, NoiseStatistic::Std, FluxRange::Full, 6, 3, 3, 3, true).unwrap();
        for (a, b) in cube_nn.as_slice().iter().zip(cube_tri.as_slice().iter()) {
            assert!((a - b).abs() < 1e-3);
        }
    }
}
