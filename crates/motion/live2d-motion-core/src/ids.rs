//! Identifiers and the handle allocator for queue entries.

use serde::{Deserialize, Serialize};

/// Index of a parameter slot in a [`ParameterStore`](crate::ParameterStore).
/// Indices at or past the real parameter count address phantom slots.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ParameterIndex(pub usize);

/// Index of a part slot; phantom rules match [`ParameterIndex`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PartIndex(pub usize);

/// Handle of one in-flight queue entry. Handles are never reused within a manager.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MotionHandle(pub u64);

/// Monotonic allocator for [`MotionHandle`].
#[derive(Default, Debug)]
pub struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&mut self) -> MotionHandle {
        let handle = MotionHandle(self.next);
        self.next += 1;
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = HandleAllocator::new();
        assert_eq!(alloc.alloc(), MotionHandle(0));
        assert_eq!(alloc.alloc(), MotionHandle(1));
        assert_eq!(alloc.alloc(), MotionHandle(2));
    }
}
