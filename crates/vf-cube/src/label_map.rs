use indexmap::IndexMap;

/// A dense renumbering from pre-filter label to post-filter label,
/// preserving the order labels were inserted in.
///
/// Produced by the reliability stage (only positive objects clearing the
/// threshold are kept, renumbered `1..=n`) and consumed by
/// [`crate::mask::MaskCube::filter_mask_32`] to relabel the 32-bit mask
/// cube densely afterwards.
#[derive(Debug, Clone, Default)]
pub struct LabelMap(IndexMap<u32, u32>);

impl LabelMap {
    pub fn new() -> Self {
        LabelMap(IndexMap::new())
    }

    pub fn insert(&mut self, old_label: u32, new_label: u32) {
        self.0.insert(old_label, new_label);
    }

    pub fn get(&self, old_label: u32) -> Option<u32> {
        self.0.get(&old_label).copied()
    }

    pub fn contains(&self, old_label: u32) -> bool {
        self.0.contains_key(&old_label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }
}
