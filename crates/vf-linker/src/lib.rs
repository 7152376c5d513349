//! `vf-linker` - Connected-component labelling for vf-pipeline.
//!
//! Flood-fills the 8-bit detection mask under a Chebyshev adjacency
//! rule, writing a densely labelled 32-bit mask and an
//! [`ObjectParams`] table (pixel count, bounding box, flux extrema and
//! sum, edge/merge flags) per retained object.

mod error;
mod linker;
mod object;
mod stack;

pub use error::{LinkerError, Result};
pub use linker::{run_linker, LinkerParams};
pub use object::{ObjectParams, FLAG_EDGE_SPATIAL, FLAG_EDGE_SPECTRAL, FLAG_MERGED, FLAG_NONFINITE};
