//! Frame counter driven by the engine's tick callback.

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use parking_lot::{Mutex, MutexGuard};

use crate::cache::SyncCache;

/// Tick bookkeeping shared by one session's frame and poll callbacks.
///
/// Each session owns its own instance, so concurrent sessions (tests, the
/// headless driver) never observe each other's ticks.
#[derive(Debug, Default)]
pub struct SyncState {
    frame: AtomicU32,
    cache: Mutex<SyncCache>,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to frame 0 with an empty cache; done at every session start.
    pub fn reset(&self) {
        self.frame.store(0, Ordering::Release);
        self.cache.lock().reset();
    }

    pub fn current_tick(&self) -> u32 {
        self.frame.load(Ordering::Acquire)
    }

    /// Copy of the cache. Blocks while a poll holds it across an exchange.
    pub fn cache(&self) -> SyncCache {
        *self.cache.lock()
    }

    pub(crate) fn lock_cache(&self) -> MutexGuard<'_, SyncCache> {
        self.cache.lock()
    }
}

/// Installed as the engine's per-tick callback.
#[derive(Debug, Clone)]
pub struct FrameClock {
    state: Arc<SyncState>,
}

impl FrameClock {
    pub fn new(state: Arc<SyncState>) -> Self {
        Self { state }
    }

    /// Records the engine's tick number and opens a new synchronization window.
    ///
    /// This is the only place the per-tick sync flag is cleared.
    pub fn on_tick(&self, frame: u32) {
        let prev = self.state.frame.swap(frame, Ordering::AcqRel);
        if frame < prev {
            tracing::debug!(prev, frame, "engine frame counter moved backwards");
        }
        self.state.lock_cache().begin_tick();
    }

    pub fn current_tick(&self) -> u32 {
        self.state.current_tick()
    }

    pub fn into_callback(self) -> impl FnMut(u32) + Send + 'static {
        move |frame| self.on_tick(frame)
    }
}
