//! Identifiers and a simple allocator for engine entities.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ContainerId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ItemKey(pub u32);

/// Monotonic allocator for ContainerId and ItemKey.
/// Ids are never reused, so a callback carrying a key of a torn-down item
/// can never address a newer item by accident.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_container: u32,
    next_item: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_container(&mut self) -> ContainerId {
        let id = ContainerId(self.next_container);
        self.next_container = self.next_container.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_item(&mut self) -> ItemKey {
        let id = ItemKey(self.next_item);
        self.next_item = self.next_item.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_container(), ContainerId(0));
        assert_eq!(alloc.alloc_container(), ContainerId(1));
        assert_eq!(alloc.alloc_item(), ItemKey(0));
        assert_eq!(alloc.alloc_item(), ItemKey(1));
        assert_eq!(alloc.alloc_container(), ContainerId(2));
    }
}
