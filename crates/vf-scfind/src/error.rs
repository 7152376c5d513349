use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScfindError {
    #[error("spatial sigma {sigma} must be finite and non-negative")]
    InvalidSigma { sigma: f64 },
    #[error("spatial sigma {sigma} must be strictly less than min(nx, ny) = {limit}")]
    SigmaTooLarge { sigma: f64, limit: usize },
    #[error("threshold {0} must be finite")]
    InvalidThreshold(f64),
    #[error("replacement value {0} must be finite")]
    InvalidReplacement(f64),
    #[error(transparent)]
    Cube(#[from] vf_cube::CubeError),
    #[error(transparent)]
    Filter(#[from] vf_filter::FilterError),
    #[error(transparent)]
    Noise(#[from] vf_noise::NoiseError),
}

pub type Result<T> = std::result::Result<T, ScfindError>;
