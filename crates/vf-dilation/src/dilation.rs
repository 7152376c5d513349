use std::collections::{HashMap, HashSet};

use vf_cube::{CubeError, DataCube, MaskCube};
use vf_linker::ObjectParams;

use crate::error::{DilationError, Result};

/// Mask-dilation configuration: iteration caps for the z- and xy-phases
/// and the fractional-flux stopping threshold `tau` shared by both.
#[derive(Debug, Clone, Copy)]
pub struct DilationParams {
    pub iterations_z: usize,
    pub iterations_xy: usize,
    /// Growth stops once a pass's new flux shell is no greater than
    /// `tau` times the object's current total flux.
    pub tau: f64,
}

impl Default for DilationParams {
    fn default() -> Self {
        DilationParams {
            iterations_z: 5,
            iterations_xy: 5,
            tau: 0.05,
        }
    }
}

const Z_OFFSETS: [(isize, isize, isize); 2] = [(0, 0, -1), (0, 0, 1)];
const XY_OFFSETS: [(isize, isize, isize); 8] = [
    (-1, -1, 0),
    (0, -1, 0),
    (1, -1, 0),
    (-1, 0, 0),
    (1, 0, 0),
    (-1, 1, 0),
    (0, 1, 0),
    (1, 1, 0),
];

/// Mutable per-object growth state threaded through a dilation phase.
struct DilationState {
    table_idx: usize,
    label: u32,
    x_min: usize,
    x_max: usize,
    y_min: usize,
    y_max: usize,
    z_min: usize,
    z_max: usize,
    f_sum: f64,
    f_min: f32,
    f_max: f32,
    n_pix: u64,
    frontier: Vec<(usize, usize, usize)>,
}

fn collect_members(
    label32: &MaskCube<i32>,
    label: u32,
    (x_min, x_max, y_min, y_max, z_min, z_max): (usize, usize, usize, usize, usize, usize),
) -> Vec<(usize, usize, usize)> {
    let mut out = Vec::new();
    for z in z_min..=z_max {
        for y in y_min..=y_max {
            for x in x_min..=x_max {
                if label32.get(x, y, z) == label as i32 {
                    out.push((x, y, z));
                }
            }
        }
    }
    out
}

fn offset_neighbor(
    (x, y, z): (usize, usize, usize),
    (dx, dy, dz): (isize, isize, isize),
    nx: usize,
    ny: usize,
    nz: usize,
) -> Option<(usize, usize, usize)> {
    let nx_i = x as isize + dx;
    let ny_i = y as isize + dy;
    let nz_i = z as isize + dz;
    if nx_i < 0 || ny_i < 0 || nz_i < 0 {
        return None;
    }
    let (nx_u, ny_u, nz_u) = (nx_i as usize, ny_i as usize, nz_i as usize);
    if nx_u >= nx || ny_u >= ny || nz_u >= nz {
        return None;
    }
    Some((nx_u, ny_u, nz_u))
}

/// Runs one growth phase (z-only or 8-connected xy, per `offsets`) to
/// convergence or `max_iterations`, mutating `states` and `label32` in
/// place.
fn run_phase(
    data: &DataCube,
    label32: &mut MaskCube<i32>,
    states: &mut [DilationState],
    offsets: &[(isize, isize, isize)],
    max_iterations: usize,
    tau: f64,
) {
    let (nx, ny, nz) = data.shape();
    let mut active: Vec<usize> = (0..states.len()).filter(|&i| !states[i].frontier.is_empty()).collect();

    for _ in 0..max_iterations {
        if active.is_empty() {
            break;
        }

        let mut claims: HashMap<usize, u32> = HashMap::new();
        let mut proposals: Vec<(usize, Vec<(usize, usize, usize)>, f64)> = Vec::new();

        for &si in &active {
            let state = &states[si];
            let mut seen = HashSet::new();
            let mut candidates = Vec::new();
            let mut delta_f = 0.0f64;
            for &voxel in &state.frontier {
                for &off in offsets {
                    if let Some(n) = offset_neighbor(voxel, off, nx, ny, nz) {
                        if label32.get(n.0, n.1, n.2) != 0 {
                            continue;
                        }
                        let flux = data.get(n.0, n.1, n.2);
                        if !flux.is_finite() {
                            continue;
                        }
                        if seen.insert(n) {
                            delta_f += flux as f64;
                            candidates.push(n);
                        }
                    }
                }
            }

            if delta_f > tau * state.f_sum {
                let cube_idx = |v: (usize, usize, usize)| v.0 + nx * (v.1 + ny * v.2);
                for &c in &candidates {
                    let idx = cube_idx(c);
                    claims
                        .entry(idx)
                        .and_modify(|winner| {
                            if state.label < *winner {
                                *winner = state.label;
                            }
                        })
                        .or_insert(state.label);
                }
                proposals.push((si, candidates, delta_f));
            }
        }

        active.clear();

        for (si, candidates, _delta) in proposals {
            let mut committed = Vec::new();
            for c in candidates {
                let flat = c.0 + nx * (c.1 + ny * c.2);
                if claims.get(&flat).copied() == Some(states[si].label) {
                    committed.push(c);
                }
            }

            if committed.is_empty() {
                states[si].frontier.clear();
                continue;
            }

            for &(x, y, z) in &committed {
                label32.set(x, y, z, states[si].label as i32);
                let flux = data.get(x, y, z);
                let s = &mut states[si];
                s.n_pix += 1;
                s.f_sum += flux as f64;
                s.f_min = s.f_min.min(flux);
                s.f_max = s.f_max.max(flux);
                s.x_min = s.x_min.min(x);
                s.x_max = s.x_max.max(x);
                s.y_min = s.y_min.min(y);
                s.y_max = s.y_max.max(y);
                s.z_min = s.z_min.min(z);
                s.z_max = s.z_max.max(z);
            }
            states[si].frontier = committed;
            active.push(si);
        }
    }

    for state in states.iter_mut() {
        state.frontier.clear();
    }
}

/// Grows every object in `table` first along z, then in the 8-connected
/// xy footprint, stopping each phase per-object once the new flux shell
/// no longer exceeds `params.tau` times the object's running total flux.
///
/// Voxels simultaneously claimed by two objects in the same pass are
/// assigned to the numerically smaller label; the losing object simply
/// does not grow into that voxel this pass.
///
/// # Errors
/// Returns [`DilationError::Cube`] if `data` and `label32` have
/// mismatched shapes, or [`DilationError::UnknownLabel`] if a table
/// entry's label is not present anywhere in `label32`.
pub fn run_dilation(
    data: &DataCube,
    label32: &mut MaskCube<i32>,
    table: &mut [ObjectParams],
    params: &DilationParams,
) -> Result<()> {
    if data.shape() != label32.shape() {
        let (nx1, ny1, nz1) = data.shape();
        let (nx2, ny2, nz2) = label32.shape();
        return Err(DilationError::Cube(CubeError::ShapeMismatch {
            nx1,
            ny1,
            nz1,
            nx2,
            ny2,
            nz2,
        }));
    }

    let mut states: Vec<DilationState> = Vec::with_capacity(table.len());
    for (idx, obj) in table.iter().enumerate() {
        let bbox = (obj.x_min, obj.x_max, obj.y_min, obj.y_max, obj.z_min, obj.z_max);
        let frontier = collect_members(label32, obj.label, bbox);
        if frontier.is_empty() {
            return Err(DilationError::UnknownLabel { label: obj.label });
        }
        states.push(DilationState {
            table_idx: idx,
            label: obj.label,
            x_min: obj.x_min,
            x_max: obj.x_max,
            y_min: obj.y_min,
            y_max: obj.y_max,
            z_min: obj.z_min,
            z_max: obj.z_max,
            f_sum: obj.f_sum as f64,
            f_min: obj.f_min,
            f_max: obj.f_max,
            n_pix: obj.n_pix,
            frontier,
        });
    }

    run_phase(data, label32, &mut states, &Z_OFFSETS, params.iterations_z, params.tau);

    for state in states.iter_mut() {
        let bbox = (state.x_min, state.x_max, state.y_min, state.y_max, state.z_min, state.z_max);
        state.frontier = collect_members(label32, state.label, bbox);
    }

    run_phase(data, label32, &mut states, &XY_OFFSETS, params.iterations_xy, params.tau);

    for state in states {
        let obj = &mut table[state.table_idx];
        obj.x_min = state.x_min;
        obj.x_max = state.x_max;
        obj.y_min = state.y_min;
        obj.y_max = state.y_max;
        obj.z_min = state.z_min;
        obj.z_max = state.z_max;
        obj.f_sum = state.f_sum as f32;
        obj.f_min = state.f_min;
        obj.f_max = state.f_max;
        obj.n_pix = state.n_pix;
    }

    Ok(())
}
