use vf_linker::ObjectParams;

/// A reliability feature vector: `(log10|extreme flux|, log10|f_sum|,
/// log10|f_sum / n_pix|)`, with `extreme flux` being `f_max` for a
/// positive source and `f_min` for a negative one.
///
/// `original_source` uses base-10 logarithms throughout the reliability
/// stage, including the `fmin` gate; spec.md's "log" is read as `log10`
/// accordingly.
pub type Feature = [f64; 3];

/// Builds the feature vector for `obj`, or `None` if `f_sum == 0` (such
/// objects are excluded from both the positive and negative populations,
/// per spec.md §4.7).
pub fn feature_vector(obj: &ObjectParams) -> Option<Feature> {
    if obj.f_sum == 0.0 {
        return None;
    }
    let extreme = if obj.f_sum > 0.0 { obj.f_max } else { obj.f_min };
    let mean_flux = obj.f_sum as f64 / obj.n_pix.max(1) as f64;
    Some([
        (extreme as f64).abs().ln() / std::f64::consts::LN_10,
        (obj.f_sum as f64).abs().ln() / std::f64::consts::LN_10,
        mean_flux.abs().ln() / std::f64::consts::LN_10,
    ])
}
