//! `vf-pipeline` - pipeline controller, parameter store, and
//! collaborator traits for the 3-D spectral-line source-finding core.
//!
//! Sequences ingestion, optional continuum subtraction and noise
//! scaling, the S+C/threshold finder, the linker, the reliability
//! filter, and mask dilation, threading a single [`Context`] and
//! [`ParameterSet`] through every stage. Binary cube I/O, WCS
//! conversion, and catalogue serialisation are collaborator concerns
//! modelled as traits in [`traits`].

mod context;
mod error;
mod memory_source;
mod params;
mod pipeline;
mod traits;

pub use context::{Context, Verbosity};
pub use error::{ErrorKind, PipelineError, Result};
pub use memory_source::MemoryCubeSource;
pub use params::ParameterSet;
pub use pipeline::{run_pipeline, PipelineOutput};
pub use traits::{CatalogColumn, CatalogSink, CatalogValue, CubeSource, MaskSink, WcsConverter};
