use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoiseError {
    #[error("grid spacing ({grid_xy}, {grid_z}) must not exceed window size ({window_xy}, {window_z})")]
    GridExceedsWindow {
        grid_xy: usize,
        grid_z: usize,
        window_xy: usize,
        window_z: usize,
    },
    #[error("window/grid parameters must be >= 1, got window=({window_xy},{window_z}) grid=({grid_xy},{grid_z})")]
    NonPositiveParameter {
        window_xy: usize,
        window_z: usize,
        grid_xy: usize,
        grid_z: usize,
    },
    #[error(transparent)]
    Cube(#[from] vf_cube::CubeError),
}

pub type Result<T> = std::result::Result<T, NoiseError>;
