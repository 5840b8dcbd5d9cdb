//! Netplay error types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetplayError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("peer disconnected")]
    PeerDisconnected,

    #[error("peer session terminated")]
    SessionTerminated,

    #[error("protocol desync: {0}")]
    Desync(String),

    #[error("invalid player number {0} (expected 1..=8)")]
    InvalidPlayer(i64),

    #[error("invalid participant count {0} (expected 1..=8)")]
    InvalidParticipants(usize),

    #[error("rendezvous session is not established")]
    NoRendezvous,
}
