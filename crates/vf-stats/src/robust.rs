use crate::range::{admitted, FluxRange};
use crate::selection::{median, MedianMode};

/// Conversion factor from the median absolute deviation to the standard
/// deviation of an underlying normal distribution.
pub const MAD_TO_STD: f32 = 1.482_602_2;

/// Median absolute deviation of `buf` from `value`, admitting only every
/// `stride`-th sample that satisfies `range`.
///
/// `median(|x - value|)` over the admitted subsample. Returns `NAN` if no
/// sample is admitted. Does not modify `buf`.
pub fn mad_about_value(buf: &[f32], value: f32, stride: usize, range: FluxRange) -> f32 {
    assert!(stride >= 1, "mad_about_value: stride must be >= 1");
    let mut scratch: Vec<f32> = buf
        .iter()
        .enumerate()
        .filter(|&(i, &v)| admitted(v, i, stride, range))
        .map(|(_, &v)| (v - value).abs())
        .collect();

    if scratch.is_empty() {
        f32::NAN
    } else {
        median(&mut scratch, MedianMode::Exact)
    }
}

/// Median absolute deviation of `buf` about its own median.
///
/// `median(|x - median(x)|)`. Under Gaussian noise the standard deviation
/// about the mean can be recovered by scaling the result with
/// [`MAD_TO_STD`]. Returns `NAN` if `buf` is empty or every sample is
/// non-finite. Does not modify `buf`.
pub fn mad(buf: &[f32]) -> f32 {
    let mut scratch: Vec<f32> = buf.iter().copied().filter(|v| v.is_finite()).collect();
    if scratch.is_empty() {
        return f32::NAN;
    }
    let centre = median(&mut scratch, MedianMode::Exact);
    mad_about_value(buf, centre, 1, FluxRange::Full)
}

/// Median absolute deviation of `buf`, converted to a Gaussian-equivalent
/// standard deviation, admitting only every `stride`-th sample that
/// satisfies `range`.
///
/// Unlike [`mad`], which always centres on the full-sample median, this
/// computes the median of the admitted subsample first and then its MAD
/// about that value; used by the noise-scaling stages to restrict the
/// noise estimate to e.g. the negative half of a tile or plane.
///
/// Returns `NAN` if no sample is admitted.
pub fn mad_admitted(buf: &[f32], stride: usize, range: FluxRange) -> f32 {
    assert!(stride >= 1, "mad_admitted: stride must be >= 1");
    let mut scratch: Vec<f32> = buf
        .iter()
        .enumerate()
        .filter(|&(i, &v)| admitted(v, i, stride, range))
        .map(|(_, &v)| v)
        .collect();

    if scratch.is_empty() {
        return f32::NAN;
    }
    let centre = median(&mut scratch, MedianMode::Exact);
    MAD_TO_STD * mad_about_value(buf, centre, stride, range)
}

/// Robust estimate of the Gaussian noise standard deviation assuming the
/// distribution is centred on zero and only the negative half is trusted.
///
/// Computed as `-MAD_TO_STD * median(negative values)`, using the fast
/// (lower-element) median convention. Returns `NAN` if `buf` contains no
/// negative, finite samples.
pub fn robust_noise_neg(buf: &[f32]) -> f32 {
    let mut negatives: Vec<f32> = buf.iter().copied().filter(|v| *v < 0.0).collect();
    if negatives.is_empty() {
        f32::NAN
    } else {
        -MAD_TO_STD * median(&mut negatives, MedianMode::Fast)
    }
}
