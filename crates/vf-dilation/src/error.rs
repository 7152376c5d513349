use thiserror::Error;

#[derive(Error, Debug)]
pub enum DilationError {
    #[error(transparent)]
    Cube(#[from] vf_cube::CubeError),
    #[error("label {label} referenced by the parameter table is not present in the mask")]
    UnknownLabel { label: u32 },
}

pub type Result<T> = std::result::Result<T, DilationError>;
