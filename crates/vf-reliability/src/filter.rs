use vf_cube::LabelMap;
use vf_linker::ObjectParams;

/// Builds the dense-to-final [`LabelMap`] that keeps only positive
/// sources (`f_sum > 0`) whose reliability meets or exceeds `threshold`.
///
/// Mirrors [`vf_linker::ObjectParams::label`] lookups into the original
/// mask labels, preserving catalogue order (and so insertion order) of
/// `table`.
pub fn reliability_filter(table: &[ObjectParams], threshold: f32) -> LabelMap {
    let mut map = LabelMap::new();
    let mut next = 1u32;
    for obj in table {
        if obj.f_sum > 0.0 && obj.rel >= threshold {
            map.insert(obj.label, next);
            next += 1;
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(label: u32, f_sum: f32, rel: f32) -> ObjectParams {
        ObjectParams {
            label,
            n_pix: 1,
            x_min: 0,
            x_max: 0,
            y_min: 0,
            y_max: 0,
            z_min: 0,
            z_max: 0,
            f_min: 0.0,
            f_max: 0.0,
            f_sum,
            rel,
            flags: 0,
        }
    }

    #[test]
    fn test_filter_keeps_only_reliable_positives() {
        let table = vec![
            object(1, 10.0, 0.9),
            object(2, 10.0, 0.2),
            object(3, -10.0, 0.9),
            object(4, 10.0, 0.5),
        ];
        let map = reliability_filter(&table, 0.5);
        assert_eq!(map.len(), 2);
        assert!(map.contains(1));
        assert!(map.contains(4));
        assert!(!map.contains(2));
        assert!(!map.contains(3));
    }

    #[test]
    fn test_filter_preserves_order() {
        let table = vec![object(5, 10.0, 0.9), object(2, 10.0, 0.9)];
        let map = reliability_filter(&table, 0.5);
        let order: Vec<u32> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec![5, 2]);
    }
}
