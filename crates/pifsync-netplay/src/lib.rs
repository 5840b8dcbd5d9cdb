//! Lockstep input synchronization over the Joybus polling path.
//!
//! The engine owns timing. It reports tick boundaries through a frame
//! callback and polls controllers through a poll callback any number of
//! times per tick. This crate turns that traffic into exactly one blocking
//! input exchange per tick and replays the agreed inputs on every poll.
//!
//! # Architecture
//!
//! - [`clock`]: frame counter and the per-session [`SyncState`]
//! - [`cache`]: per-tick synchronization cache
//! - [`client`]: the blocking exchange contract toward the transport
//! - [`interceptor`]: the poll callback that drives the exchange
//! - [`peer`]: netplay modes, peer link status and the connector contract
//! - [`loopback`]: in-process rendezvous hub for tests and local soak runs
//! - [`error`]: Error types

pub mod cache;
pub mod client;
pub mod clock;
pub mod error;
pub mod interceptor;
pub mod loopback;
pub mod peer;
pub mod player;

pub use cache::SyncCache;
pub use client::NetSyncClient;
pub use clock::{FrameClock, SyncState};
pub use error::NetplayError;
pub use interceptor::{JoybusInterceptor, PollOutcome};
pub use loopback::{LoopbackClient, LoopbackConnector, loopback};
pub use peer::{NetplayMode, PeerConnector, PeerLink, RENDEZVOUS_ADDRESS};
pub use player::PlayerNumber;
