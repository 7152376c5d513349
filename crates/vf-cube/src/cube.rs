use crate::error::{CubeError, Result};
use crate::header::Header;
use crate::region::Region;

/// A three-axis contiguous buffer of single-precision voxel intensities,
/// indexed `buf[x + nx*(y + ny*z)]` (x fastest), plus its FITS-style
/// header.
///
/// A non-finite voxel is the cube's "missing" representation: statistics
/// skip it, and filtering treats it as zero. There is no separate
/// blanking flag.
#[derive(Debug, Clone)]
pub struct DataCube {
    buf: Vec<f32>,
    nx: usize,
    ny: usize,
    nz: usize,
    header: Header,
}

impl DataCube {
    /// Constructs a zero-filled cube of the given shape.
    ///
    /// # Errors
    /// Returns [`CubeError::InvalidAxisSizes`] if any axis is zero.
    pub fn new_blank(nx: usize, ny: usize, nz: usize) -> Result<Self> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(CubeError::InvalidAxisSizes { nx, ny, nz });
        }
        Ok(DataCube {
            buf: vec![0.0; nx * ny * nz],
            nx,
            ny,
            nz,
            header: Header::new(),
        })
    }

    /// Constructs a cube from a pre-allocated buffer (memory-mode
    /// ingestion), converting from the caller's double precision.
    ///
    /// # Errors
    /// Returns [`CubeError::InvalidAxisSizes`] if any axis is zero, or
    /// [`CubeError::BufferSizeMismatch`] if `buf.len() != nx*ny*nz`.
    pub fn from_raw_f64(buf: &[f64], nx: usize, ny: usize, nz: usize) -> Result<Self> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(CubeError::InvalidAxisSizes { nx, ny, nz });
        }
        let expected = nx * ny * nz;
        if buf.len() != expected {
            return Err(CubeError::BufferSizeMismatch {
                len: buf.len(),
                nx,
                ny,
                nz,
                expected,
            });
        }
        Ok(DataCube {
            buf: buf.iter().map(|&v| v as f32).collect(),
            nx,
            ny,
            nz,
            header: Header::new(),
        })
    }

    /// Constructs a cube from an already-single-precision buffer plus a
    /// header (FITS-mode ingestion).
    pub fn from_raw_f32(buf: Vec<f32>, nx: usize, ny: usize, nz: usize, header: Header) -> Result<Self> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(CubeError::InvalidAxisSizes { nx, ny, nz });
        }
        let expected = nx * ny * nz;
        if buf.len() != expected {
            return Err(CubeError::BufferSizeMismatch {
                len: buf.len(),
                nx,
                ny,
                nz,
                expected,
            });
        }
        Ok(DataCube { buf, nx, ny, nz, header })
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.buf
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.buf
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.nx * (y + self.ny * z)
    }

    #[inline]
    fn check_bounds(&self, x: usize, y: usize, z: usize) -> Result<()> {
        if x >= self.nx || y >= self.ny || z >= self.nz {
            return Err(CubeError::OutOfBounds {
                x,
                y,
                z,
                nx: self.nx,
                ny: self.ny,
                nz: self.nz,
            });
        }
        Ok(())
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
        self.buf[self.index(x, y, z)]
    }

    pub fn try_get(&self, x: usize, y: usize, z: usize) -> Result<f32> {
        self.check_bounds(x, y, z)?;
        Ok(self.get(x, y, z))
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, v: f32) {
        let idx = self.index(x, y, z);
        self.buf[idx] = v;
    }

    pub fn try_set(&mut self, x: usize, y: usize, z: usize, v: f32) -> Result<()> {
        self.check_bounds(x, y, z)?;
        self.set(x, y, z, v);
        Ok(())
    }

    pub fn z_plane(&self, z: usize) -> &[f32] {
        let start = self.index(0, 0, z);
        &self.buf[start..start + self.nx * self.ny]
    }

    pub fn z_plane_mut(&mut self, z: usize) -> &mut [f32] {
        let start = self.index(0, 0, z);
        &mut self.buf[start..start + self.nx * self.ny]
    }

    pub fn z_planes_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.buf.chunks_mut(self.nx * self.ny)
    }

    /// Fills every voxel with `v`.
    pub fn fill(&mut self, v: f32) {
        self.buf.iter_mut().for_each(|x| *x = v);
    }

    /// Adds `other` into `self` element-wise.
    ///
    /// # Errors
    /// Returns [`CubeError::ShapeMismatch`] if the shapes differ.
    pub fn add(&mut self, other: &DataCube) -> Result<()> {
        self.check_same_shape(other)?;
        for (a, &b) in self.buf.iter_mut().zip(other.buf.iter()) {
            *a += b;
        }
        Ok(())
    }

    /// Divides `self` by `other` element-wise; a zero or non-finite
    /// divisor leaves the dividend as a non-finite sentinel.
    ///
    /// # Errors
    /// Returns [`CubeError::ShapeMismatch`] if the shapes differ.
    pub fn divide(&mut self, other: &DataCube) -> Result<()> {
        self.check_same_shape(other)?;
        for (a, &b) in self.buf.iter_mut().zip(other.buf.iter()) {
            *a = if b.is_finite() && b != 0.0 {
                *a / b
            } else {
                f32::NAN
            };
        }
        Ok(())
    }

    /// Multiplies every voxel by the scalar `c`.
    pub fn multiply_by_scalar(&mut self, c: f32) {
        self.buf.iter_mut().for_each(|x| *x *= c);
    }

    /// Multiplies every voxel by `sqrt(w)` from the matching voxel of
    /// `weights`.
    ///
    /// A non-finite or negative weight leaves the voxel untouched and is
    /// counted in the returned warning tally rather than treated as a
    /// fatal error.
    ///
    /// # Errors
    /// Returns [`CubeError::ShapeMismatch`] if the shapes differ.
    pub fn apply_weights(&mut self, weights: &DataCube) -> Result<usize> {
        self.check_same_shape(weights)?;
        let mut warnings = 0usize;
        for (a, &w) in self.buf.iter_mut().zip(weights.buf.iter()) {
            if w.is_finite() && w >= 0.0 {
                *a *= w.sqrt();
            } else {
                warnings += 1;
            }
        }
        Ok(warnings)
    }

    fn check_same_shape(&self, other: &DataCube) -> Result<()> {
        if (self.nx, self.ny, self.nz) != (other.nx, other.ny, other.nz) {
            return Err(CubeError::ShapeMismatch {
                nx1: self.nx,
                ny1: self.ny,
                nz1: self.nz,
                nx2: other.nx,
                ny2: other.ny,
                nz2: other.nz,
            });
        }
        Ok(())
    }

    /// Sets every voxel within each region to non-finite (`NAN`).
    ///
    /// Regions exceeding the cube are clipped silently; regions lying
    /// entirely outside the cube are ignored. Idempotent: flagging the
    /// same regions twice yields the same result as flagging them once.
    pub fn flag_regions(&mut self, regions: &[Region]) {
        for region in regions {
            if let Some(r) = region.clip(self.nx, self.ny, self.nz) {
                for z in r.z_min..=r.z_max {
                    for y in r.y_min..=r.y_max {
                        for x in r.x_min..=r.x_max {
                            self.set(x, y, z, f32::NAN);
                        }
                    }
                }
            }
        }
    }

    /// Replaces every `+-inf` voxel with `NAN`, returning one coalesced
    /// [`Region`] per contiguous run of z-planes that contained at least
    /// one infinity.
    pub fn flag_infinity(&mut self) -> Vec<Region> {
        let mut flagged_planes = Vec::new();
        for z in 0..self.nz {
            let mut any = false;
            for v in self.z_plane_mut(z) {
                if v.is_infinite() {
                    *v = f32::NAN;
                    any = true;
                }
            }
            if any {
                flagged_planes.push(z);
            }
        }

        let mut regions = Vec::new();
        let mut iter = flagged_planes.into_iter().peekable();
        while let Some(start) = iter.next() {
            let mut end = start;
            while iter.peek() == Some(&(end + 1)) {
                end = iter.next().unwrap();
            }
            regions.push(Region::new(0, self.nx - 1, 0, self.ny - 1, start, end));
        }
        regions
    }

    /// Extracts the sub-cube described by `region`, rewriting `NAXISn`
    /// and `CRPIXn` in the returned cube's header.
    ///
    /// # Errors
    /// Returns [`CubeError::InvalidRegion`] if the region is malformed or
    /// lies entirely outside the cube.
    pub fn cutout(&self, region: Region) -> Result<DataCube> {
        let clipped = region.clip(self.nx, self.ny, self.nz).ok_or(CubeError::InvalidRegion {
            x_min: region.x_min,
            x_max: region.x_max,
            y_min: region.y_min,
            y_max: region.y_max,
            z_min: region.z_min,
            z_max: region.z_max,
        })?;
        if !clipped.is_valid() {
            return Err(CubeError::InvalidRegion {
                x_min: clipped.x_min,
                x_max: clipped.x_max,
                y_min: clipped.y_min,
                y_max: clipped.y_max,
                z_min: clipped.z_min,
                z_max: clipped.z_max,
            });
        }

        let nx = clipped.x_max - clipped.x_min + 1;
        let ny = clipped.y_max - clipped.y_min + 1;
        let nz = clipped.z_max - clipped.z_min + 1;
        let mut buf = Vec::with_capacity(nx * ny * nz);
        for z in clipped.z_min..=clipped.z_max {
            for y in clipped.y_min..=clipped.y_max {
                for x in clipped.x_min..=clipped.x_max {
                    buf.push(self.get(x, y, z));
                }
            }
        }

        let mut header = self.header.clone();
        header.update_for_cutout(&clipped);
        DataCube::from_raw_f32(buf, nx, ny, nz, header)
    }

    /// Global root-mean-square of every finite voxel.
    pub fn rms(&self) -> f32 {
        let mut sum_sq = 0.0f64;
        let mut count = 0usize;
        for &v in &self.buf {
            if v.is_finite() {
                sum_sq += (v as f64) * (v as f64);
                count += 1;
            }
        }
        if count == 0 {
            f32::NAN
        } else {
            (sum_sq / count as f64).sqrt() as f32
        }
    }
}
