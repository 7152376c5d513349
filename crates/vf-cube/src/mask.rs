use crate::error::{CubeError, Result};
use crate::label_map::LabelMap;
use crate::region::Region;

/// An element type usable as a mask cube voxel: either the transient
/// 8-bit detection code or the 32-bit label code.
///
/// Kept as two concrete instantiations of one generic `MaskCube<T>`
/// (rather than a tagged-variant cube) to keep the hot linker/S+C loops
/// monomorphic.
pub trait MaskElement: Copy + PartialEq + Eq + Default + std::fmt::Debug + Send + Sync {
    const ZERO: Self;
    const NEGATIVE_ONE: Self;

    fn is_positive(self) -> bool;
    fn is_negative(self) -> bool;
    fn as_i64(self) -> i64;
    fn from_i64(v: i64) -> Self;
}

impl MaskElement for i8 {
    const ZERO: Self = 0;
    const NEGATIVE_ONE: Self = -1;

    #[inline]
    fn is_positive(self) -> bool {
        self > 0
    }

    #[inline]
    fn is_negative(self) -> bool {
        self < 0
    }

    #[inline]
    fn as_i64(self) -> i64 {
        self as i64
    }

    #[inline]
    fn from_i64(v: i64) -> Self {
        v as i8
    }
}

impl MaskElement for i32 {
    const ZERO: Self = 0;
    const NEGATIVE_ONE: Self = -1;

    #[inline]
    fn is_positive(self) -> bool {
        self > 0
    }

    #[inline]
    fn is_negative(self) -> bool {
        self < 0
    }

    #[inline]
    fn as_i64(self) -> i64 {
        self as i64
    }

    #[inline]
    fn from_i64(v: i64) -> Self {
        v as i32
    }
}

/// A three-axis mask cube parameterised over its element kind: `i8` for
/// the transient S+C/threshold detection mask, `i32` for the linker's
/// label mask.
#[derive(Debug, Clone)]
pub struct MaskCube<T: MaskElement> {
    buf: Vec<T>,
    nx: usize,
    ny: usize,
    nz: usize,
}

impl<T: MaskElement> MaskCube<T> {
    pub fn new_blank(nx: usize, ny: usize, nz: usize) -> Result<Self> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(CubeError::InvalidAxisSizes { nx, ny, nz });
        }
        Ok(MaskCube {
            buf: vec![T::ZERO; nx * ny * nz],
            nx,
            ny,
            nz,
        })
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.buf
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.buf
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.nx * (y + self.ny * z)
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> T {
        self.buf[self.index(x, y, z)]
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, v: T) {
        let idx = self.index(x, y, z);
        self.buf[idx] = v;
    }

    pub fn fill(&mut self, v: T) {
        self.buf.iter_mut().for_each(|x| *x = v);
    }

    /// Sets every voxel within each region to the zero/"blank" code.
    /// Regions exceeding the cube are clipped silently.
    pub fn flag_regions(&mut self, regions: &[Region]) {
        for region in regions {
            if let Some(r) = region.clip(self.nx, self.ny, self.nz) {
                for z in r.z_min..=r.z_max {
                    for y in r.y_min..=r.y_max {
                        for x in r.x_min..=r.x_max {
                            self.set(x, y, z, T::ZERO);
                        }
                    }
                }
            }
        }
    }
}

impl MaskCube<i8> {
    /// Writes `-1` into every position of `dst` where `self` is nonzero,
    /// unless `dst` already carries a negative label there.
    ///
    /// Returns the number of voxels newly marked.
    ///
    /// # Errors
    /// Returns [`CubeError::ShapeMismatch`] if the shapes differ.
    pub fn copy_mask_8_to_32(&self, dst: &mut MaskCube<i32>) -> Result<usize> {
        if self.shape() != dst.shape() {
            let (nx1, ny1, nz1) = self.shape();
            let (nx2, ny2, nz2) = dst.shape();
            return Err(CubeError::ShapeMismatch {
                nx1,
                ny1,
                nz1,
                nx2,
                ny2,
                nz2,
            });
        }
        let mut count = 0usize;
        for (src, dst) in self.buf.iter().zip(dst.buf.iter_mut()) {
            if *src != 0 && !dst.is_negative() {
                *dst = -1;
                count += 1;
            }
        }
        Ok(count)
    }
}

impl MaskCube<i32> {
    /// Relabels `self` in place per `label_map`: a voxel whose current
    /// positive label is a key becomes the mapped value; every other
    /// positive label becomes `0`. Non-positive voxels are untouched.
    pub fn filter_mask_32(&mut self, label_map: &LabelMap) {
        for v in self.buf.iter_mut() {
            if v.is_positive() {
                *v = label_map.get(*v as u32).map(|new| new as i32).unwrap_or(0);
            }
        }
    }

    /// Produces a `(nx, ny, 1)` cube whose value at `(x, y)` is the
    /// maximum of `|mask[x, y, z]|` over every z.
    pub fn two_dim_mask(&self) -> MaskCube<i32> {
        let mut out = MaskCube::new_blank(self.nx, self.ny, 1).expect("shape already validated");
        for y in 0..self.ny {
            for x in 0..self.nx {
                let mut best = 0i32;
                for z in 0..self.nz {
                    let v = self.get(x, y, z).abs();
                    if v > best {
                        best = v;
                    }
                }
                out.set(x, y, 0, best);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask8_flag_regions() {
        let mut m = MaskCube::<i8>::new_blank(4, 4, 1).unwrap();
        m.fill(1);
        m.flag_regions(&[Region::new(0, 1, 0, 3, 0, 0)]);
        assert_eq!(m.get(0, 0, 0), 0);
        assert_eq!(m.get(2, 0, 0), 1);
    }

    #[test]
    fn test_copy_mask_8_to_32_preserves_existing_negative() {
        let mut src = MaskCube::<i8>::new_blank(2, 1, 1).unwrap();
        src.set(0, 0, 0, 1);
        src.set(1, 0, 0, 1);
        let mut dst = MaskCube::<i32>::new_blank(2, 1, 1).unwrap();
        dst.set(0, 0, 0, -7);
        let count = src.copy_mask_8_to_32(&mut dst).unwrap();
        assert_eq!(count, 1);
        assert_eq!(dst.get(0, 0, 0), -7);
        assert_eq!(dst.get(1, 0, 0), -1);
    }

    #[test]
    fn test_filter_mask_32() {
        let mut m = MaskCube::<i32>::new_blank(3, 1, 1).unwrap();
        m.set(0, 0, 0, 1);
        m.set(1, 0, 0, 2);
        m.set(2, 0, 0, 3);
        let mut map = LabelMap::new();
        map.insert(1, 1);
        map.insert(3, 2);
        m.filter_mask_32(&map);
        assert_eq!(m.get(0, 0, 0), 1);
        assert_eq!(m.get(1, 0, 0), 0);
        assert_eq!(m.get(2, 0, 0), 2);
    }

    #[test]
    fn test_two_dim_mask_max_abs_over_z() {
        let mut m = MaskCube::<i32>::new_blank(2, 1, 3).unwrap();
        m.set(0, 0, 0, 1);
        m.set(0, 0, 1, -5);
        m.set(0, 0, 2, 2);
        let flat = m.two_dim_mask();
        assert_eq!(flat.shape(), (2, 1, 1));
        assert_eq!(flat.get(0, 0, 0), 5);
        assert_eq!(flat.get(1, 0, 0), 0);
    }
}
