use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkerError {
    #[error(transparent)]
    Cube(#[from] vf_cube::CubeError),
}

pub type Result<T> = std::result::Result<T, LinkerError>;
