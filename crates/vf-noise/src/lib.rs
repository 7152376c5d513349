//! `vf-noise` - Spectral and local noise-scaling for vf-pipeline.
//!
//! Normalises a cube so its noise has unit standard deviation everywhere,
//! either plane-by-plane ([`scale_noise_spec`]) or via a spatially- and
//! spectrally-tiled local estimate ([`scale_noise_local`]).

mod error;
mod local;
mod spectral;
mod statistic;

pub use error::{NoiseError, Result};
pub use local::scale_noise_local;
pub use spectral::scale_noise_spec;
pub use statistic::NoiseStatistic;
