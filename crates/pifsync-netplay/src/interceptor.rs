//! Poll callback that keeps peers in lockstep.
//!
//! The engine calls [`JoybusInterceptor::poll`] for every PIF poll. The first
//! CONTROLLER_READ on channel 0 in a tick is the synchronization trigger: the
//! local reply already sitting in channel 0 is exchanged with all peers, and
//! the agreed words are cached. Every poll, trigger or not, then rewrites the
//! first `received_count` channels from that cache, so repeated polls within
//! one tick always produce identical replies.
//!
//! Channel 0 is assumed to be the local player's channel.

use std::sync::Arc;

use pifsync_joybus::{
    JoybusChannel, JoybusChannels, JoybusCommand, JoybusError, constants::MAX_PLAYERS, reply,
};
use tracing::{debug, trace, warn};

use crate::{cache::SyncCache, client::NetSyncClient, clock::SyncState, peer::PeerLink};

/// What a single poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollOutcome {
    /// An exchange was issued during this poll.
    pub exchanged: bool,
    /// Channels whose reply was overwritten from the cache.
    pub rewritten: usize,
}

pub struct JoybusInterceptor {
    state: Arc<SyncState>,
    link: Arc<PeerLink>,
    client: Box<dyn NetSyncClient>,
}

impl JoybusInterceptor {
    pub fn new(state: Arc<SyncState>, link: Arc<PeerLink>, client: Box<dyn NetSyncClient>) -> Self {
        Self {
            state,
            link,
            client,
        }
    }

    pub fn poll(&mut self, channels: &mut JoybusChannels) -> PollOutcome {
        if !self.link.is_active() || self.link.player().is_none() {
            return PollOutcome::default();
        }

        // Held for the whole read-modify-write so replays never see a
        // half-written cache.
        let state = Arc::clone(&self.state);
        let mut cache = state.lock_cache();

        let mut outcome = PollOutcome::default();
        if let Some(local) = trigger_value(&channels[0], &cache) {
            cache.mark_synced();
            outcome.exchanged = true;
            self.exchange(&mut cache, local);
        }

        for (index, channel) in channels
            .iter_mut()
            .take(cache.received_count())
            .enumerate()
        {
            if rewrite_channel(index, channel, cache.values()[index]) {
                outcome.rewritten += 1;
            }
        }
        outcome
    }

    pub fn into_callback(mut self) -> impl FnMut(&mut JoybusChannels) + Send + 'static {
        move |channels| {
            self.poll(channels);
        }
    }

    fn exchange(&mut self, cache: &mut SyncCache, local: u32) {
        let frame = self.state.current_tick();
        match self.client.exchange(local) {
            Ok(values) if !values.is_empty() => {
                let dropped = cache.record(&values);
                if dropped > 0 {
                    warn!(
                        frame,
                        received = values.len(),
                        max = MAX_PLAYERS,
                        "exchange returned more participants than supported; extra values ignored"
                    );
                }
                self.link.set_received_count(cache.received_count());
                trace!(frame, local, received = cache.received_count(), "exchanged inputs");
            }
            Ok(_) => self.degrade(cache, frame, "peer returned no inputs"),
            Err(e) => self.degrade(cache, frame, &e.to_string()),
        }
    }

    /// Local play continues with nothing rewritten; the engine is never stopped.
    fn degrade(&mut self, cache: &mut SyncCache, frame: u32, reason: &str) {
        cache.degrade();
        if self.link.mark_inactive() {
            warn!(frame, reason, "peer session ended; continuing without synchronization");
        } else {
            debug!(frame, reason, "exchange failed on inactive peer session");
        }
    }
}

/// Local input word if this poll is the tick's synchronization trigger.
///
/// Only a CONTROLLER_READ on channel 0 with a usable receive buffer counts;
/// housekeeping commands must never send a zero "input" to peers.
fn trigger_value(channel: &JoybusChannel, cache: &SyncCache) -> Option<u32> {
    if cache.synced_this_tick() || channel.command() != Some(JoybusCommand::ControllerRead) {
        return None;
    }
    let rx = channel.rx()?;
    match reply::read_controller(rx) {
        Ok(word) => Some(word),
        Err(e) => {
            trace!(%e, "channel 0 controller reply unusable; not a sync trigger");
            None
        }
    }
}

fn rewrite_channel(index: usize, channel: &mut JoybusChannel, value: u32) -> bool {
    if !channel.is_addressable() {
        return false;
    }
    channel.clear_error_flags();

    let Some(command) = channel.command() else {
        return false;
    };
    let Some(rx) = channel.rx_mut() else {
        return false;
    };
    let result: Result<bool, JoybusError> = match command {
        command if command.is_identify() => reply::write_identify(rx, command).map(|()| true),
        JoybusCommand::ControllerRead => reply::write_controller(rx, value).map(|()| true),
        JoybusCommand::PakRead => reply::write_pak_read_absent(rx).map(|()| true),
        JoybusCommand::PakWrite => reply::write_pak_write_absent(rx).map(|()| true),
        _ => Ok(false),
    };
    result.unwrap_or_else(|e| {
        trace!(channel = index, %e, "reply left untouched");
        false
    })
}
