use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupportError {
    #[error("adapter disconnected")]
    DeviceLost,

    #[error("adapter transfer failed: {0}")]
    Transfer(String),

    #[error("failed to start adapter poller: {0}")]
    Spawn(String),

    #[error("adapter did not report within {0:?}")]
    PollTimeout(Duration),

    #[error("adapter poller stopped before the first report")]
    PollerStopped,
}
