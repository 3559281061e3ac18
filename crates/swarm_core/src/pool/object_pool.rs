//! Generic object pool
//!
//! Instances are constructed by a factory, lent out through [`PoolHandle`]s
//! and returned with [`ObjectPool::release`]. The pool never constructs more
//! than `max_size` instances between two `clear` calls.
//!
//! Storage is a generational slot map: a handle from another pool, or one
//! that outlived a `clear`, no longer resolves and is ignored.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Slot key inside a single pool
    pub struct PoolKey;
}

static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(0);

/// Handle to an instance owned by an [`ObjectPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    pool: u32,
    key: PoolKey,
}

/// Lifetime counters of a pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances built by the factory
    pub constructed: usize,
    /// Successful acquisitions
    pub acquisitions: u64,
    /// Successful releases (including `release_all`)
    pub releases: u64,
    /// Acquisitions refused because the pool was at capacity
    pub exhausted: u64,
    /// Highest number of simultaneously active instances
    pub peak_active: usize,
}

struct PoolEntry<T> {
    value: T,
    /// Position in the active list, `None` while free
    active_index: Option<usize>,
}

type Factory<T> = Box<dyn FnMut() -> T>;
type ResetHook<T, A> = Box<dyn FnMut(&mut T, A)>;

/// Bounded pool of reusable instances.
///
/// `A` is the argument type handed to the reset hook.
pub struct ObjectPool<T, A = ()> {
    id: u32,
    slots: SlotMap<PoolKey, PoolEntry<T>>,
    free: Vec<PoolKey>,
    active: Vec<PoolKey>,
    factory: Factory<T>,
    reset_hook: Option<ResetHook<T, A>>,
    initial_size: usize,
    max_size: usize,
    stats: PoolStats,
}

impl<T> ObjectPool<T> {
    /// Create a pool without a reset hook and pre-build `initial_size` instances
    pub fn new<F>(factory: F, initial_size: usize, max_size: usize) -> Self
    where
        F: FnMut() -> T + 'static,
    {
        Self::build(Box::new(factory), None, initial_size, max_size)
    }
}

impl<T, A> ObjectPool<T, A> {
    /// Create a pool whose [`reset`](Self::reset) runs `reset_hook`
    pub fn with_reset<F, R>(factory: F, reset_hook: R, initial_size: usize, max_size: usize) -> Self
    where
        F: FnMut() -> T + 'static,
        R: FnMut(&mut T, A) + 'static,
    {
        Self::build(Box::new(factory), Some(Box::new(reset_hook)), initial_size, max_size)
    }

    fn build(factory: Factory<T>, reset_hook: Option<ResetHook<T, A>>, initial_size: usize, max_size: usize) -> Self {
        let initial_size = if initial_size > max_size {
            log::warn!(
                "Pool initial size {} exceeds max size {}, clamping",
                initial_size,
                max_size
            );
            max_size
        } else {
            initial_size
        };

        let mut pool = Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            slots: SlotMap::with_capacity_and_key(max_size.min(1024)),
            free: Vec::with_capacity(initial_size),
            active: Vec::with_capacity(initial_size),
            factory,
            reset_hook,
            initial_size,
            max_size,
            stats: PoolStats::default(),
        };
        pool.prewarm(initial_size);
        log::debug!("Created pool {} with {}/{} instances", pool.id, initial_size, max_size);
        pool
    }

    fn construct(&mut self) -> PoolKey {
        let value = (self.factory)();
        self.stats.constructed += 1;
        self.slots.insert(PoolEntry {
            value,
            active_index: None,
        })
    }

    /// Build free instances until the pool holds `target` (capped at `max_size`).
    ///
    /// Returns how many instances were constructed.
    pub fn prewarm(&mut self, target: usize) -> usize {
        let target = target.min(self.max_size);
        let mut built = 0;
        while self.slots.len() < target {
            let key = self.construct();
            self.free.push(key);
            built += 1;
        }
        built
    }

    /// Take an instance: a free one if available, otherwise a new one while
    /// under `max_size`. Returns `None` when the pool is exhausted.
    pub fn acquire(&mut self) -> Option<PoolHandle> {
        let key = match self.free.pop() {
            Some(key) => key,
            None if self.slots.len() < self.max_size => self.construct(),
            None => {
                self.stats.exhausted += 1;
                log::warn!(
                    "Pool {} exhausted: {}/{} instances active",
                    self.id,
                    self.active.len(),
                    self.max_size
                );
                return None;
            }
        };

        if let Some(entry) = self.slots.get_mut(key) {
            entry.active_index = Some(self.active.len());
        }
        self.active.push(key);
        self.stats.acquisitions += 1;
        self.stats.peak_active = self.stats.peak_active.max(self.active.len());
        Some(PoolHandle { pool: self.id, key })
    }

    /// Like [`acquire`](Self::acquire), also borrowing the instance
    pub fn acquire_mut(&mut self) -> Option<(PoolHandle, &mut T)> {
        let handle = self.acquire()?;
        self.slots
            .get_mut(handle.key)
            .map(|entry| (handle, &mut entry.value))
    }

    fn entry(&self, handle: PoolHandle) -> Option<&PoolEntry<T>> {
        if handle.pool == self.id {
            self.slots.get(handle.key)
        } else {
            None
        }
    }

    fn entry_mut(&mut self, handle: PoolHandle) -> Option<&mut PoolEntry<T>> {
        if handle.pool == self.id {
            self.slots.get_mut(handle.key)
        } else {
            None
        }
    }

    /// Return an active instance to the free list.
    ///
    /// Releasing a free instance again, or a handle this pool does not own,
    /// changes nothing and returns false.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        let Some(entry) = self.entry_mut(handle) else {
            log::warn!("Ignoring release of a handle not owned by pool {}", self.id);
            return false;
        };
        let Some(index) = entry.active_index.take() else {
            log::warn!("Ignoring double release in pool {}", self.id);
            return false;
        };

        self.active.swap_remove(index);
        if let Some(&moved) = self.active.get(index) {
            if let Some(moved_entry) = self.slots.get_mut(moved) {
                moved_entry.active_index = Some(index);
            }
        }
        self.free.push(handle.key);
        self.stats.releases += 1;
        true
    }

    /// Run the reset hook on an instance; membership is untouched.
    ///
    /// Returns false for handles this pool does not own. Without a reset hook
    /// this is a no-op that returns true.
    pub fn reset(&mut self, handle: PoolHandle, args: A) -> bool {
        if handle.pool != self.id {
            return false;
        }
        let Some(entry) = self.slots.get_mut(handle.key) else {
            return false;
        };
        if let Some(hook) = self.reset_hook.as_mut() {
            hook(&mut entry.value, args);
        }
        true
    }

    /// Move every active instance to the free list in one pass
    pub fn release_all(&mut self) -> usize {
        let count = self.active.len();
        for key in self.active.drain(..) {
            if let Some(entry) = self.slots.get_mut(key) {
                entry.active_index = None;
            }
            self.free.push(key);
        }
        self.stats.releases += count as u64;
        count
    }

    /// Drop every instance, free and active, without any teardown.
    ///
    /// Outstanding handles become stale. The pool can grow again up to `max_size`.
    pub fn clear(&mut self) {
        let dropped = self.slots.len();
        self.slots.clear();
        self.free.clear();
        self.active.clear();
        log::debug!("Cleared pool {} ({} instances dropped)", self.id, dropped);
    }

    /// Borrow an instance, active or free
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.entry(handle).map(|entry| &entry.value)
    }

    /// Mutably borrow an instance, active or free
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.entry_mut(handle).map(|entry| &mut entry.value)
    }

    /// Whether the handle refers to an instance currently on loan
    pub fn is_active(&self, handle: PoolHandle) -> bool {
        self.entry(handle).is_some_and(|entry| entry.active_index.is_some())
    }

    /// Iterate over active instances
    pub fn active_objects(&self) -> impl Iterator<Item = &T> + '_ {
        self.active
            .iter()
            .filter_map(move |key| self.slots.get(*key).map(|entry| &entry.value))
    }

    /// Call `visit` on every active instance
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&T),
    {
        for value in self.active_objects() {
            visit(value);
        }
    }

    /// Instances on loan
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Instances waiting in the free list
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Instances currently owned by the pool
    pub fn total_count(&self) -> usize {
        self.slots.len()
    }

    /// Size pre-built at construction
    pub fn initial_size(&self) -> usize {
        self.initial_size
    }

    /// Hard cap on constructed instances
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Lifetime counters
    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl<T, A> fmt::Debug for ObjectPool<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("id", &self.id)
            .field("active", &self.active.len())
            .field("free", &self.free.len())
            .field("max_size", &self.max_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_pool(initial: usize, max: usize) -> (ObjectPool<u32>, Rc<Cell<u32>>) {
        let built = Rc::new(Cell::new(0));
        let counter = Rc::clone(&built);
        let pool = ObjectPool::new(
            move || {
                counter.set(counter.get() + 1);
                counter.get()
            },
            initial,
            max,
        );
        (pool, built)
    }

    #[test]
    fn test_capacity_limit() {
        let (mut pool, built) = counting_pool(2, 3);
        assert_eq!(built.get(), 2);
        assert_eq!(pool.free_count(), 2);

        let a = pool.acquire().expect("prebuilt");
        let b = pool.acquire().expect("prebuilt");
        assert_eq!((pool.active_count(), pool.free_count()), (2, 0));
        assert_eq!(built.get(), 2);

        let c = pool.acquire().expect("constructed");
        assert_eq!((pool.active_count(), pool.free_count()), (3, 0));
        assert_eq!(built.get(), 3);

        assert!(pool.acquire().is_none());
        assert_eq!(pool.active_count(), 3);
        assert_eq!(pool.stats().exhausted, 1);

        for handle in [a, b, c] {
            assert!(pool.is_active(handle));
        }
    }

    #[test]
    fn test_double_release_is_idempotent() {
        let (mut pool, _) = counting_pool(1, 2);
        let handle = pool.acquire().expect("instance");

        assert!(pool.release(handle));
        let counts = (pool.active_count(), pool.free_count());
        assert!(!pool.release(handle));
        assert_eq!((pool.active_count(), pool.free_count()), counts);
        assert_eq!(pool.free.iter().filter(|&&key| key == handle.key).count(), 1);
    }

    #[test]
    fn test_foreign_and_stale_handles_are_ignored() {
        let (mut first, _) = counting_pool(1, 1);
        let (mut second, _) = counting_pool(1, 1);
        let foreign = second.acquire().expect("instance");

        assert!(!first.release(foreign));
        assert!(first.get(foreign).is_none());

        let handle = first.acquire().expect("instance");
        first.clear();
        assert!(!first.release(handle));
        assert!(!first.is_active(handle));
        assert_eq!(first.total_count(), 0);

        // Cleared pools grow again on demand
        assert!(first.acquire().is_some());
    }

    #[test]
    fn test_release_keeps_active_indices_consistent() {
        let (mut pool, _) = counting_pool(0, 4);
        let handles: Vec<_> = (0..4).filter_map(|_| pool.acquire()).collect();

        assert!(pool.release(handles[0]));
        assert!(pool.release(handles[3]));
        assert!(pool.is_active(handles[1]));
        assert!(pool.is_active(handles[2]));
        assert!(pool.release(handles[2]));
        assert!(pool.release(handles[1]));
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.free_count(), 4);
    }

    #[test]
    fn test_reset_hook_receives_arguments() {
        let mut pool: ObjectPool<(f32, f32), (f32, f32)> =
            ObjectPool::with_reset(|| (0.0, 0.0), |value, args| *value = args, 1, 1);
        let handle = pool.acquire().expect("instance");

        assert!(pool.reset(handle, (10.0, 20.0)));
        assert_eq!(pool.get(handle), Some(&(10.0, 20.0)));
        assert!(pool.is_active(handle));
    }

    #[test]
    fn test_release_all_and_traversal() {
        let (mut pool, _) = counting_pool(3, 3);
        pool.acquire();
        pool.acquire();

        let mut seen = Vec::new();
        pool.for_each(|value| seen.push(*value));
        assert_eq!(seen.len(), 2);
        assert_eq!(pool.active_objects().count(), 2);

        assert_eq!(pool.release_all(), 2);
        assert_eq!(pool.active_objects().count(), 0);
        assert_eq!(pool.free_count(), 3);
    }

    #[test]
    fn test_initial_size_is_clamped() {
        let (pool, built) = counting_pool(10, 4);
        assert_eq!(built.get(), 4);
        assert_eq!(pool.initial_size(), 4);
    }
}
