use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReliabilityError {
    #[error("negative population has only {count} usable object(s); at least {min} are needed to fit a 3x3 covariance")]
    NotEnoughNegatives { count: usize, min: usize },
    #[error("negative population's covariance matrix is singular or near-singular (|det| < {eps})")]
    SingularCovariance { eps: f64 },
}

pub type Result<T> = std::result::Result<T, ReliabilityError>;
