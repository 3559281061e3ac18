//! Specialized collection types

/// Reusable buffer for deferred mutation.
///
/// Systems that find removal candidates while scanning a query snapshot push
/// them here during the read pass and drain them afterwards. The backing
/// allocation survives `drain`/`clear`, so a steady-state tick allocates nothing.
#[derive(Debug)]
pub struct ScratchList<T> {
    items: Vec<T>,
}

impl<T> ScratchList<T> {
    /// Create an empty scratch list
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create a scratch list with room for `capacity` items
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Queue an item
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Allocated capacity
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Iterate over queued items without removing them
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Remove and yield every queued item, keeping the allocation
    pub fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.items.drain(..)
    }

    /// Drop every queued item, keeping the allocation
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> Default for ScratchList<T> {
    fn default() -> Self {
        Self::new()
    }
}
