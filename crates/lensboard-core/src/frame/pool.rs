use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Pool-unique identifier of a frame handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandleId(u64);

impl fmt::Display for FrameHandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame:{}", self.0)
    }
}

/// Counters describing the pool's handle traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Handles acquired and not yet released.
    pub outstanding: usize,
    /// Handles ever acquired.
    pub acquired: u64,
    /// Handles ever released, explicitly or on drop.
    pub released: u64,
    /// Subset of `released` that happened because a handle was dropped
    /// without an explicit `release()`.
    pub released_on_drop: u64,
}

#[derive(Default)]
struct PoolInner {
    next_id: AtomicU64,
    frames: Mutex<HashMap<u64, Bytes>>,
    acquired: AtomicU64,
    released: AtomicU64,
    released_on_drop: AtomicU64,
}

impl PoolInner {
    fn frames(&self) -> MutexGuard<'_, HashMap<u64, Bytes>> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, id: u64) -> bool {
        let removed = self.frames().remove(&id).is_some();
        if removed {
            self.released.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }
}

/// Registry of live frame payloads.
///
/// Cloning a pool yields another reference to the same registry.
#[derive(Clone, Default)]
pub struct FramePool {
    inner: Arc<PoolInner>,
}

impl FramePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a payload and returns the only handle to it.
    pub fn acquire(&self, payload: Bytes) -> FrameHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner.frames().insert(id, payload);
        self.inner.acquired.fetch_add(1, Ordering::Relaxed);

        FrameHandle {
            id,
            pool: Arc::clone(&self.inner),
            released: false,
        }
    }

    /// Looks up a payload by id. Returns `None` once the handle is released.
    pub fn resolve(&self, id: FrameHandleId) -> Option<Bytes> {
        self.inner.frames().get(&id.0).cloned()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            outstanding: self.inner.frames().len(),
            acquired: self.inner.acquired.load(Ordering::Relaxed),
            released: self.inner.released.load(Ordering::Relaxed),
            released_on_drop: self.inner.released_on_drop.load(Ordering::Relaxed),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.inner.frames().len()
    }
}

impl fmt::Debug for FramePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramePool").field("stats", &self.stats()).finish()
    }
}

/// Exclusive reference to one registered frame payload.
///
/// Not `Clone`: there is exactly one owner, and `release` consumes it, so a
/// released handle cannot be read. Dropping an unreleased handle releases it.
pub struct FrameHandle {
    id: u64,
    pool: Arc<PoolInner>,
    released: bool,
}

impl FrameHandle {
    pub fn id(&self) -> FrameHandleId {
        FrameHandleId(self.id)
    }

    /// The registered payload.
    pub fn bytes(&self) -> Bytes {
        self.pool.frames().get(&self.id).cloned().unwrap_or_default()
    }

    /// Releases the handle, removing its payload from the pool.
    pub fn release(mut self) {
        self.released = true;
        self.pool.release(self.id);
    }
}

impl Drop for FrameHandle {
    fn drop(&mut self) {
        if !self.released && self.pool.release(self.id) {
            self.pool.released_on_drop.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl fmt::Debug for FrameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameHandle")
            .field("id", &self.id())
            .finish_non_exhaustive()
    }
}
