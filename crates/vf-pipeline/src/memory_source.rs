use vf_cube::{DataCube, Header, MaskCube, Region};

use crate::error::Result;
use crate::traits::CubeSource;

/// Memory-mode [`CubeSource`]: wraps a caller-supplied double-precision
/// voxel buffer and axis sizes.
///
/// This is the "memory-mode ingestion" collaborator spec.md §6
/// describes, and doubles as the test double integration tests drive
/// the pipeline through in place of a real FITS reader.
pub struct MemoryCubeSource {
    buf: Vec<f64>,
    nx: usize,
    ny: usize,
    nz: usize,
    header: Header,
}

impl MemoryCubeSource {
    pub fn new(buf: Vec<f64>, nx: usize, ny: usize, nz: usize) -> Self {
        MemoryCubeSource {
            buf,
            nx,
            ny,
            nz,
            header: Header::new(),
        }
    }

    pub fn with_header(mut self, header: Header) -> Self {
        self.header = header;
        self
    }
}

impl CubeSource for MemoryCubeSource {
    fn load(&self, region: Option<Region>) -> Result<(DataCube, Option<MaskCube<i32>>)> {
        let mut cube = DataCube::from_raw_f64(&self.buf, self.nx, self.ny, self.nz)?;
        *cube.header_mut() = self.header.clone();
        let cube = match region {
            Some(r) => cube.cutout(r)?,
            None => cube,
        };
        Ok((cube, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_loads_full_cube() {
        let src = MemoryCubeSource::new(vec![0.0; 24], 2, 3, 4);
        let (cube, mask) = src.load(None).unwrap();
        assert_eq!(cube.shape(), (2, 3, 4));
        assert!(mask.is_none());
    }

    #[test]
    fn test_memory_source_applies_region() {
        let src = MemoryCubeSource::new(vec![0.0; 24], 2, 3, 4);
        let (cube, _) = src.load(Some(Region::new(0, 1, 0, 1, 0, 1))).unwrap();
        assert_eq!(cube.shape(), (2, 2, 2));
    }
}
