use indexmap::IndexMap;

use crate::region::Region;

/// A single FITS-style header value.
///
/// The core never interprets these beyond the handful of geometric
/// keywords it rewrites after a cut-out (`CRPIXn`, `NAXISn`); everything
/// else is opaque payload carried through so a collaborator writer can
/// reproduce the original header semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl HeaderValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(v) => Some(*v),
            HeaderValue::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            HeaderValue::Int(v) => Some(*v as f64),
            HeaderValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HeaderValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// An insertion-order-preserving FITS-style keyword map.
///
/// Order only matters when a collaborator re-serialises the header; the
/// core itself only ever does keyed lookups and a handful of rewrites
/// after a sub-cube cut-out.
#[derive(Debug, Clone, Default)]
pub struct Header(IndexMap<String, HeaderValue>);

impl Header {
    pub fn new() -> Self {
        Header(IndexMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: HeaderValue) {
        self.0.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &HeaderValue)> {
        self.0.iter()
    }

    /// Rewrites `CRPIXn` and `NAXISn` to reflect a cut-out to `region`.
    ///
    /// `NAXIS1..3` become the region's extent on each axis; `CRPIXn` is
    /// shifted by the region's lower corner so the reference pixel keeps
    /// pointing at the same sky/frequency location in the new, smaller
    /// cube. Keywords absent from the header are left absent.
    pub fn update_for_cutout(&mut self, region: &Region) {
        let extents = [
            region.x_max - region.x_min + 1,
            region.y_max - region.y_min + 1,
            region.z_max - region.z_min + 1,
        ];
        let lower = [region.x_min, region.y_min, region.z_min];

        for axis in 0..3 {
            let naxis_key = format!("NAXIS{}", axis + 1);
            if self.contains(&naxis_key) {
                self.set(naxis_key, HeaderValue::Int(extents[axis] as i64));
            }
            let crpix_key = format!("CRPIX{}", axis + 1);
            if let Some(v) = self.get(&crpix_key).and_then(HeaderValue::as_float) {
                self.set(crpix_key, HeaderValue::Float(v - lower[axis] as f64));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_roundtrip() {
        let mut h = Header::new();
        h.set("OBJECT", HeaderValue::Str("NGC1234".into()));
        h.set("NAXIS1", HeaderValue::Int(64));
        assert_eq!(h.get("OBJECT").unwrap().as_str(), Some("NGC1234"));
        assert_eq!(h.get("NAXIS1").unwrap().as_int(), Some(64));
        assert!(h.get("MISSING").is_none());
    }

    #[test]
    fn test_update_for_cutout_shifts_and_resizes() {
        let mut h = Header::new();
        h.set("NAXIS1", HeaderValue::Int(100));
        h.set("NAXIS2", HeaderValue::Int(100));
        h.set("NAXIS3", HeaderValue::Int(50));
        h.set("CRPIX1", HeaderValue::Float(50.0));
        h.set("CRPIX2", HeaderValue::Float(50.0));
        h.set("CRPIX3", HeaderValue::Float(1.0));

        let region = Region::new(10, 29, 10, 29, 0, 9);
        h.update_for_cutout(&region);

        assert_eq!(h.get("NAXIS1").unwrap().as_int(), Some(20));
        assert_eq!(h.get("NAXIS3").unwrap().as_int(), Some(10));
        assert_eq!(h.get("CRPIX1").unwrap().as_float(), Some(40.0));
        assert_eq!(h.get("CRPIX3").unwrap().as_float(), Some(1.0));
    }

    #[test]
    fn test_update_for_cutout_ignores_absent_keywords() {
        let mut h = Header::new();
        h.set("OBJECT", HeaderValue::Str("blank".into()));
        h.update_for_cutout(&Region::new(0, 9, 0, 9, 0, 9));
        assert!(!h.contains("NAXIS1"));
    }
}
