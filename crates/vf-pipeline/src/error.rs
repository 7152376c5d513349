use thiserror::Error;

/// The error-kind taxonomy the top-level wrapper maps to a process exit
/// code. Every variant of [`PipelineError`] reports one of these via
/// [`PipelineError::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UserInput,
    FileAccess,
    Allocation,
    IndexRange,
    NoSource,
    Warning,
    Generic,
}

/// The pipeline's aggregate error type. Every stage crate's error
/// converts into this via `#[from]` so the controller can propagate with
/// `?` throughout.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("parameter error: {0}")]
    Parameter(String),
    #[error("reliability filtering is enabled together with linker.keepNegative, which is not a valid combination")]
    ReliabilityWithKeepNegative,
    #[error("output path already exists and output.overwrite is false: {0}")]
    OutputExists(String),
    #[error(transparent)]
    Cube(#[from] vf_cube::CubeError),
    #[error(transparent)]
    Filter(#[from] vf_filter::FilterError),
    #[error(transparent)]
    Noise(#[from] vf_noise::NoiseError),
    #[error(transparent)]
    Scfind(#[from] vf_scfind::ScfindError),
    #[error(transparent)]
    Linker(#[from] vf_linker::LinkerError),
    #[error(transparent)]
    Reliability(#[from] vf_reliability::ReliabilityError),
    #[error(transparent)]
    Dilation(#[from] vf_dilation::DilationError),
    #[error("no source found above the detection threshold")]
    NoSourceFound,
    #[error("collaborator I/O error: {0}")]
    Collaborator(String),
}

impl PipelineError {
    /// Classifies this error into the §7 taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Parameter(_) | PipelineError::ReliabilityWithKeepNegative => ErrorKind::UserInput,
            PipelineError::OutputExists(_) => ErrorKind::FileAccess,
            PipelineError::Cube(e) => match e {
                vf_cube::CubeError::InvalidAxisSizes { .. } => ErrorKind::UserInput,
                vf_cube::CubeError::InvalidRegion { .. } => ErrorKind::UserInput,
                vf_cube::CubeError::BufferSizeMismatch { .. } => ErrorKind::IndexRange,
                vf_cube::CubeError::ShapeMismatch { .. } => ErrorKind::IndexRange,
                vf_cube::CubeError::OutOfBounds { .. } => ErrorKind::IndexRange,
            },
            PipelineError::Filter(_) => ErrorKind::UserInput,
            PipelineError::Noise(_) => ErrorKind::UserInput,
            PipelineError::Scfind(_) => ErrorKind::UserInput,
            PipelineError::Linker(_) => ErrorKind::Generic,
            PipelineError::Reliability(_) => ErrorKind::UserInput,
            PipelineError::Dilation(_) => ErrorKind::Generic,
            PipelineError::NoSourceFound => ErrorKind::NoSource,
            PipelineError::Collaborator(_) => ErrorKind::FileAccess,
        }
    }

    /// The process exit code the top-level wrapper should return for
    /// this error, per spec.md §6.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Generic => 1,
            ErrorKind::Allocation => 3,
            ErrorKind::IndexRange => 4,
            ErrorKind::FileAccess => 5,
            ErrorKind::UserInput => 7,
            ErrorKind::NoSource => 8,
            ErrorKind::Warning => 0,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
