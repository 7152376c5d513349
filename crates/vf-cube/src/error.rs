use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CubeError {
    #[error("axis sizes must all be >= 1, got ({nx}, {ny}, {nz})")]
    InvalidAxisSizes { nx: usize, ny: usize, nz: usize },
    #[error("buffer length {len} does not match axis sizes ({nx}, {ny}, {nz}) = {expected}")]
    BufferSizeMismatch {
        len: usize,
        nx: usize,
        ny: usize,
        nz: usize,
        expected: usize,
    },
    #[error("coordinate ({x}, {y}, {z}) out of bounds for cube of shape ({nx}, {ny}, {nz})")]
    OutOfBounds {
        x: usize,
        y: usize,
        z: usize,
        nx: usize,
        ny: usize,
        nz: usize,
    },
    #[error("region ({x_min}..={x_max}, {y_min}..={y_max}, {z_min}..={z_max}) has min > max on some axis")]
    InvalidRegion {
        x_min: usize,
        x_max: usize,
        y_min: usize,
        y_max: usize,
        z_min: usize,
        z_max: usize,
    },
    #[error("cubes have mismatched shapes: ({nx1}, {ny1}, {nz1}) vs ({nx2}, {ny2}, {nz2})")]
    ShapeMismatch {
        nx1: usize,
        ny1: usize,
        nz1: usize,
        nx2: usize,
        ny2: usize,
        nz2: usize,
    },
}

pub type Result<T> = std::result::Result<T, CubeError>;
