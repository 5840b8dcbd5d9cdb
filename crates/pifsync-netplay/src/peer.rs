//! Netplay modes, peer link status and the connector contract.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

use crate::{client::NetSyncClient, error::NetplayError, player::PlayerNumber};

/// Address the frontend passes when the session rides on an already
/// established out-of-band rendezvous instead of a direct connection.
pub const RENDEZVOUS_ADDRESS: &str = "KAILLERA";

/// How a session talks to its peers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NetplayMode {
    #[default]
    Local,
    /// Long-lived rendezvous session established before start and kept alive
    /// after the run. Inputs are exchanged by the poll interceptor.
    Rendezvous { player: PlayerNumber },
    /// The engine's built-in netplay: connected at start, shut down at teardown.
    Direct {
        address: String,
        port: u16,
        player: PlayerNumber,
    },
}

impl NetplayMode {
    /// Maps the frontend convention (empty address = local play) and
    /// validates the player number for networked modes.
    pub fn from_parts(address: &str, port: u16, player: i64) -> Result<Self, NetplayError> {
        if address.is_empty() {
            return Ok(Self::Local);
        }
        let player = PlayerNumber::new(player)?;
        if address == RENDEZVOUS_ADDRESS {
            Ok(Self::Rendezvous { player })
        } else {
            Ok(Self::Direct {
                address: address.to_string(),
                port,
                player,
            })
        }
    }

    pub fn is_networked(&self) -> bool {
        !matches!(self, Self::Local)
    }

    pub fn player(&self) -> Option<PlayerNumber> {
        match self {
            Self::Local => None,
            Self::Rendezvous { player } | Self::Direct { player, .. } => Some(*player),
        }
    }

    /// Whether peers must run bit-identical timing settings.
    pub fn forces_determinism(&self) -> bool {
        matches!(self, Self::Rendezvous { .. })
    }
}

/// Peer session status visible to both the interceptor and the UI.
#[derive(Debug, Default)]
pub struct PeerLink {
    active: AtomicBool,
    player: AtomicU8,
    received: AtomicUsize,
}

impl PeerLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engage(&self, player: PlayerNumber) {
        self.player.store(player.get(), Ordering::Release);
        self.received.store(0, Ordering::Release);
        self.active.store(true, Ordering::Release);
    }

    /// Returns true if this call flipped the link from active to inactive.
    pub fn mark_inactive(&self) -> bool {
        self.received.store(0, Ordering::Release);
        self.active.swap(false, Ordering::AcqRel)
    }

    pub fn clear(&self) {
        self.mark_inactive();
        self.player.store(0, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn player(&self) -> Option<PlayerNumber> {
        match self.player.load(Ordering::Acquire) {
            0 => None,
            n => PlayerNumber::new(i64::from(n)).ok(),
        }
    }

    /// Participant count of the last successful exchange.
    pub fn received_count(&self) -> usize {
        self.received.load(Ordering::Acquire)
    }

    pub(crate) fn set_received_count(&self, count: usize) {
        self.received.store(count, Ordering::Release);
    }
}

/// Netplay transport as seen by the session layer.
pub trait PeerConnector: Send + Sync {
    /// Whether the out-of-band rendezvous session is already up.
    fn rendezvous_established(&self) -> bool;

    /// Exchange endpoint of the established rendezvous session.
    fn sync_client(&self) -> Option<Box<dyn NetSyncClient>>;

    /// Publishes the local player number to the transport (`None` clears it).
    fn set_player_number(&self, player: Option<PlayerNumber>);

    /// Brings up the engine's built-in netplay connection.
    fn connect(&self, address: &str, port: u16, player: PlayerNumber) -> Result<(), NetplayError>;

    /// Shuts down the built-in netplay connection.
    fn disconnect(&self);
}
