//! Iterative fractional-flux mask dilation.
//!
//! Grows each labelled object first along z, then in its 8-connected xy
//! footprint, stopping a phase for an object once its newest flux shell
//! no longer clears a fraction of its running total flux.

mod dilation;
mod error;

pub use dilation::{run_dilation, DilationParams};
pub use error::{DilationError, Result};
