/// A reusable LIFO buffer of flat voxel indices, sized once to the cube
/// and reset (not reallocated) between objects; grows by doubling if an
/// unusually large object ever needs more room than its initial capacity.
#[derive(Debug)]
pub(crate) struct VoxelStack {
    buf: Vec<usize>,
}

impl VoxelStack {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        VoxelStack {
            buf: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, idx: usize) {
        self.buf.push(idx);
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<usize> {
        self.buf.pop()
    }

    /// Clears the stack for reuse on the next object without shrinking
    /// its backing allocation.
    pub(crate) fn reset(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_lifo_order() {
        let mut s = VoxelStack::with_capacity(4);
        s.push(1);
        s.push(2);
        s.push(3);
        assert_eq!(s.pop(), Some(3));
        assert_eq!(s.pop(), Some(2));
        s.reset();
        assert_eq!(s.pop(), None);
    }

    #[test]
    fn test_reset_preserves_capacity() {
        let mut s = VoxelStack::with_capacity(2);
        for i in 0..10 {
            s.push(i);
        }
        let cap_before = s.buf.capacity();
        s.reset();
        assert!(s.buf.capacity() >= cap_before);
        assert_eq!(s.buf.len(), 0);
    }
}
