//! `vf-stats` - Robust statistics kernel for vf-pipeline.
//!
//! This crate provides:
//! - Min/max, sum, mean and standard-deviation-about-a-value over a strided,
//!   flux-range-restricted subsample of a voxel buffer
//! - Median and arbitrary order-statistic selection via quickselect
//! - Median absolute deviation and a robust single-sided noise estimator
//! - A histogram-based Gaussian fit used to estimate the noise of a cube
//!
//! Every function here is NaN-aware: non-finite samples are skipped rather
//! than propagated, and a sentinel `f32::NAN` is returned when no
//! admissible sample exists. Callers must test for this themselves; no
//! function in this crate returns a `Result`.

mod gauss_fit;
mod moments;
mod range;
mod robust;
mod selection;

pub use gauss_fit::gauss_fit;
pub use moments::{mean, mean_admitted, min_max, std_dev_about, sum};
pub use range::FluxRange;
pub use robust::{mad, mad_about_value, mad_admitted, robust_noise_neg, MAD_TO_STD};
pub use selection::{median, nth_element, MedianMode};
