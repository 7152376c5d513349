//! `vf-scfind` - Smooth-and-Clip and simple threshold detection finders
//! for vf-pipeline.

mod error;
mod kernels;
mod scfind;
mod threshold;

pub use error::{Result, ScfindError};
pub use kernels::prepare_kernels;
pub use scfind::run_scfind;
pub use threshold::{run_threshold, ThresholdMode};

pub use vf_noise::NoiseStatistic;
