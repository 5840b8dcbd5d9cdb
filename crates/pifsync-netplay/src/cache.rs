//! Per-tick synchronization cache.

use pifsync_joybus::constants::MAX_PLAYERS;

/// Result of the most recent rendezvous, replayed on every poll.
///
/// `synced_this_tick` is cleared once per tick by the frame clock. `values`
/// and `received_count` outlive the tick and are only ever replaced as a
/// whole: by a successful exchange or by [`SyncCache::degrade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncCache {
    synced_this_tick: bool,
    received_count: usize,
    values: [u32; MAX_PLAYERS],
}

impl SyncCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn synced_this_tick(&self) -> bool {
        self.synced_this_tick
    }

    pub fn received_count(&self) -> usize {
        self.received_count
    }

    pub fn values(&self) -> &[u32; MAX_PLAYERS] {
        &self.values
    }

    /// Values actually received in the last exchange.
    pub fn received(&self) -> &[u32] {
        &self.values[..self.received_count]
    }

    pub(crate) fn begin_tick(&mut self) {
        self.synced_this_tick = false;
    }

    pub(crate) fn mark_synced(&mut self) {
        self.synced_this_tick = true;
    }

    /// Replaces the cache with an exchange result, keeping at most
    /// [`MAX_PLAYERS`] values. Returns how many were dropped.
    pub(crate) fn record(&mut self, received: &[u32]) -> usize {
        let kept = received.len().min(MAX_PLAYERS);
        let mut values = [0; MAX_PLAYERS];
        values[..kept].copy_from_slice(&received[..kept]);
        self.values = values;
        self.received_count = kept;
        received.len() - kept
    }

    pub(crate) fn degrade(&mut self) {
        self.received_count = 0;
        self.values = [0; MAX_PLAYERS];
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
