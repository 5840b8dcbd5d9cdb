use pifsync_netplay::{NetplayError, PlayerNumber};
use pifsync_runtime::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum HeadlessError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Netplay(#[from] NetplayError),
    #[error("{player} session failed: {source}")]
    Session {
        player: PlayerNumber,
        source: SessionError,
    },
    #[error("{player} stopped with its peer link down")]
    PeerLost { player: PlayerNumber },
    #[error("{player} worker thread panicked")]
    WorkerPanicked { player: PlayerNumber },
    #[error("{player} observed {actual} frames, expected {expected}")]
    FrameCount {
        player: PlayerNumber,
        actual: usize,
        expected: usize,
    },
    #[error("{player} diverged from P1 at frame {frame}")]
    Diverged { player: PlayerNumber, frame: usize },
}
