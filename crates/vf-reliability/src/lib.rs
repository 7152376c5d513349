//! Multivariate kernel-density reliability estimator.
//!
//! Scores every positive [`vf_linker::ObjectParams`] against the negative
//! population's feature distribution, then collapses accepted objects
//! into a dense [`vf_cube::LabelMap`] for mask relabelling.

mod error;
mod features;
mod filter;
mod kernel;
mod reliability;

pub use error::{ReliabilityError, Result};
pub use filter::reliability_filter;
pub use reliability::{run_reliability, ReliabilityParams};
