use vf_cube::{CubeError, DataCube, MaskCube};

use crate::error::Result;
use crate::object::ObjectAccumulator;
pub use crate::object::ObjectParams;
use crate::stack::VoxelStack;

/// Chebyshev merging radii and bounding-box size limits for the linker.
#[derive(Debug, Clone, Copy)]
pub struct LinkerParams {
    pub radius_x: usize,
    pub radius_y: usize,
    pub radius_z: usize,
    pub min_size_x: usize,
    pub min_size_y: usize,
    pub min_size_z: usize,
    /// `0` means unbounded.
    pub max_size_x: usize,
    /// `0` means unbounded.
    pub max_size_y: usize,
    /// `0` means unbounded.
    pub max_size_z: usize,
    /// When `true`, objects with `f_sum < 0` are kept rather than
    /// discarded (the pipeline controller rejects this combined with
    /// reliability filtering per spec.md's user-input error policy, but
    /// the linker itself stays agnostic to that cross-stage rule).
    pub keep_negative: bool,
}

impl Default for LinkerParams {
    fn default() -> Self {
        LinkerParams {
            radius_x: 1,
            radius_y: 1,
            radius_z: 1,
            min_size_x: 1,
            min_size_y: 1,
            min_size_z: 1,
            max_size_x: 0,
            max_size_y: 0,
            max_size_z: 0,
            keep_negative: false,
        }
    }
}

#[inline]
fn within_size(extent: usize, min: usize, max: usize) -> bool {
    extent >= min && (max == 0 || extent <= max)
}

#[inline]
fn unindex(idx: usize, nx: usize, ny: usize) -> (usize, usize, usize) {
    let x = idx % nx;
    let y = (idx / nx) % ny;
    let z = idx / (nx * ny);
    (x, y, z)
}

fn check_shapes(data: &DataCube, mask8: &MaskCube<i8>, label32: &MaskCube<i32>) -> Result<()> {
    if data.shape() != mask8.shape() || data.shape() != label32.shape() {
        let (nx1, ny1, nz1) = data.shape();
        let (nx2, ny2, nz2) = mask8.shape();
        return Err(CubeError::ShapeMismatch {
            nx1,
            ny1,
            nz1,
            nx2,
            ny2,
            nz2,
        }
        .into());
    }
    Ok(())
}

/// Labels every connected component of `mask8` (8-bit detection mask,
/// value `1` = detected) via a raster-order LIFO flood fill, merging
/// voxels within `(radius_x, radius_y, radius_z)` Chebyshev distance.
///
/// Seeds `label32` from `mask8` via
/// [`vf_cube::MaskCube::copy_mask_8_to_32`] before linking. Objects
/// failing the size limits or (unless `keep_negative`) with negative
/// total flux are discarded: their `label32` voxels revert to `0` and no
/// parameter record is kept, though their `mask8` voxels remain visited
/// (`-1`) rather than being reopened for re-linking.
///
/// Returns the accepted objects' parameter records, each with `f_min`,
/// `f_max`, and `f_sum` normalised by the cube's global RMS.
///
/// # Errors
/// Returns [`vf_cube::CubeError::ShapeMismatch`] if `data`, `mask8`, and
/// `label32` do not share a shape.
pub fn run_linker(
    data: &DataCube,
    mask8: &mut MaskCube<i8>,
    label32: &mut MaskCube<i32>,
    params: &LinkerParams,
) -> Result<Vec<ObjectParams>> {
    check_shapes(data, mask8, label32)?;
    let (nx, ny, nz) = data.shape();

    mask8.copy_mask_8_to_32(label32)?;

    let mut table = Vec::new();
    let mut stack = VoxelStack::with_capacity(1024);
    let mut members: Vec<usize> = Vec::new();
    let mut next_label: u32 = 1;

    let rx = params.radius_x as isize;
    let ry = params.radius_y as isize;
    let rz = params.radius_z as isize;

    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                let seed = data.index(x, y, z);
                if mask8.as_slice()[seed] != 1 {
                    continue;
                }

                stack.reset();
                members.clear();
                stack.push(seed);
                let mut acc = ObjectAccumulator::empty();

                while let Some(cur) = stack.pop() {
                    if mask8.as_slice()[cur] != 1 {
                        continue;
                    }
                    mask8.as_mut_slice()[cur] = -1;
                    label32.as_mut_slice()[cur] = next_label as i32;
                    members.push(cur);

                    let (cx, cy, cz) = unindex(cur, nx, ny);
                    acc.accumulate(cx, cy, cz, data.as_slice()[cur]);

                    for dz in -rz..=rz {
                        let zc = cz as isize + dz;
                        if zc < 0 || zc >= nz as isize {
                            continue;
                        }
                        for dy in -ry..=ry {
                            let yc = cy as isize + dy;
                            if yc < 0 || yc >= ny as isize {
                                continue;
                            }
                            for dx in -rx..=rx {
                                if dx == 0 && dy == 0 && dz == 0 {
                                    continue;
                                }
                                let xc = cx as isize + dx;
                                if xc < 0 || xc >= nx as isize {
                                    continue;
                                }
                                let nidx = data.index(xc as usize, yc as usize, zc as usize);
                                if mask8.as_slice()[nidx] == 1 {
                                    stack.push(nidx);
                                }
                            }
                        }
                    }
                }

                let size_ok = within_size(acc.x_max - acc.x_min + 1, params.min_size_x, params.max_size_x)
                    && within_size(acc.y_max - acc.y_min + 1, params.min_size_y, params.max_size_y)
                    && within_size(acc.z_max - acc.z_min + 1, params.min_size_z, params.max_size_z);
                let sign_ok = params.keep_negative || acc.f_sum >= 0.0;

                if size_ok && sign_ok {
                    table.push(acc.into_params(next_label, nx, ny, nz));
                    next_label += 1;
                } else {
                    for &m in &members {
                        label32.as_mut_slice()[m] = 0;
                    }
                }
            }
        }
    }

    let rms = data.rms();
    if rms.is_finite() && rms != 0.0 {
        for obj in table.iter_mut() {
            obj.f_min /= rms;
            obj.f_max /= rms;
            obj.f_sum /= rms;
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_mask(nx: usize, ny: usize, nz: usize, on: &[(usize, usize, usize)]) -> MaskCube<i8> {
        let mut m = MaskCube::<i8>::new_blank(nx, ny, nz).unwrap();
        for &(x, y, z) in on {
            m.set(x, y, z, 1);
        }
        m
    }

    #[test]
    fn test_single_voxel_source() {
        let mut data = DataCube::new_blank(8, 8, 8).unwrap();
        data.set(4, 4, 4, 100.0);
        let mut mask8 = seeded_mask(8, 8, 8, &[(4, 4, 4)]);
        let mut label32 = MaskCube::<i32>::new_blank(8, 8, 8).unwrap();

        let table = run_linker(&data, &mut mask8, &mut label32, &LinkerParams::default()).unwrap();

        assert_eq!(table.len(), 1);
        let obj = &table[0];
        assert_eq!(obj.label, 1);
        assert_eq!(obj.n_pix, 1);
        assert_eq!((obj.x_min, obj.x_max), (4, 4));
        assert_eq!((obj.z_min, obj.z_max), (4, 4));
        assert_eq!(label32.get(4, 4, 4), 1);
    }

    #[test]
    fn test_size_filter_discards_object() {
        let mut data = DataCube::new_blank(8, 8, 8).unwrap();
        data.set(4, 4, 4, 100.0);
        data.set(4, 4, 5, 100.0);
        let mut mask8 = seeded_mask(8, 8, 8, &[(4, 4, 4), (4, 4, 5)]);
        let mut label32 = MaskCube::<i32>::new_blank(8, 8, 8).unwrap();

        let params = LinkerParams {
            min_size_z: 3,
            ..Default::default()
        };
        let table = run_linker(&data, &mut mask8, &mut label32, &params).unwrap();

        assert!(table.is_empty());
        assert_eq!(label32.get(4, 4, 4), 0);
        assert_eq!(label32.get(4, 4, 5), 0);
    }

    #[test]
    fn test_merging_under_dilation_radius() {
        let mut data = DataCube::new_blank(8, 8, 8).unwrap();
        data.set(4, 4, 4, 100.0);
        data.set(4, 4, 6, 100.0);
        let mut mask8 = seeded_mask(8, 8, 8, &[(4, 4, 4), (4, 4, 6)]);
        let mut label32 = MaskCube::<i32>::new_blank(8, 8, 8).unwrap();

        let params = LinkerParams {
            radius_z: 2,
            ..Default::default()
        };
        let table = run_linker(&data, &mut mask8, &mut label32, &params).unwrap();

        assert_eq!(table.len(), 1);
        let obj = &table[0];
        assert_eq!(obj.n_pix, 2);
        assert_eq!((obj.z_min, obj.z_max), (4, 6));
    }

    #[test]
    fn test_positivity_discards_negative_sum() {
        let mut data = DataCube::new_blank(4, 4, 4).unwrap();
        data.set(1, 1, 1, -50.0);
        let mut mask8 = seeded_mask(4, 4, 4, &[(1, 1, 1)]);
        let mut label32 = MaskCube::<i32>::new_blank(4, 4, 4).unwrap();

        let table = run_linker(&data, &mut mask8, &mut label32, &LinkerParams::default()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_keep_negative_retains_negative_sum() {
        let mut data = DataCube::new_blank(4, 4, 4).unwrap();
        data.set(1, 1, 1, -50.0);
        let mut mask8 = seeded_mask(4, 4, 4, &[(1, 1, 1)]);
        let mut label32 = MaskCube::<i32>::new_blank(4, 4, 4).unwrap();

        let params = LinkerParams {
            keep_negative: true,
            ..Default::default()
        };
        let table = run_linker(&data, &mut mask8, &mut label32, &params).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table[0].f_sum < 0.0);
    }

    #[test]
    fn test_edge_flags() {
        let mut data = DataCube::new_blank(4, 4, 4).unwrap();
        data.set(0, 2, 0, 10.0);
        let mut mask8 = seeded_mask(4, 4, 4, &[(0, 2, 0)]);
        let mut label32 = MaskCube::<i32>::new_blank(4, 4, 4).unwrap();

        let table = run_linker(&data, &mut mask8, &mut label32, &LinkerParams::default()).unwrap();
        let obj = &table[0];
        assert!(obj.touches_spatial_edge(4, 4));
        assert!(obj.touches_spectral_edge(4));
    }

    #[test]
    fn test_distinct_objects_get_distinct_labels() {
        let mut data = DataCube::new_blank(8, 8, 8).unwrap();
        data.set(1, 1, 1, 10.0);
        data.set(6, 6, 6, 10.0);
        let mut mask8 = seeded_mask(8, 8, 8, &[(1, 1, 1), (6, 6, 6)]);
        let mut label32 = MaskCube::<i32>::new_blank(8, 8, 8).unwrap();

        let table = run_linker(&data, &mut mask8, &mut label32, &LinkerParams::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_ne!(table[0].label, table[1].label);
    }
}
