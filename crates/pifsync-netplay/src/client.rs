//! Blocking exchange contract toward the netplay transport.

use crate::error::NetplayError;

/// One rendezvous per tick: submit the local input word, receive every
/// participant's word for the same tick.
///
/// The call blocks the engine's polling context until all peers answered;
/// that wait is what keeps the participants in lockstep. There is no
/// cancellation and no timeout here; both belong to the transport. Any
/// error, or an empty result, ends synchronization for the session.
pub trait NetSyncClient: Send {
    fn exchange(&mut self, local: u32) -> Result<Vec<u32>, NetplayError>;
}

impl<F> NetSyncClient for F
where
    F: FnMut(u32) -> Result<Vec<u32>, NetplayError> + Send,
{
    fn exchange(&mut self, local: u32) -> Result<Vec<u32>, NetplayError> {
        self(local)
    }
}
