//! In-process rendezvous hub.
//!
//! Every participant submits one word per round; the hub answers each of them
//! with all words ordered by player number once the round is complete. A
//! participant leaving closes the hub for everyone, which is how a peer
//! disconnect looks to the others.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use pifsync_joybus::constants::MAX_PLAYERS;
use tracing::{debug, warn};

use crate::{
    client::NetSyncClient,
    error::NetplayError,
    peer::PeerConnector,
    player::PlayerNumber,
};

enum HubMessage {
    Submit { slot: usize, value: u32 },
    Leave { slot: usize },
}

enum HubReply {
    Round(Vec<u32>),
    Closed,
}

/// Starts a hub for `participants` players and returns their clients in
/// player order.
pub fn loopback(participants: usize) -> Result<Vec<LoopbackClient>, NetplayError> {
    if participants == 0 || participants > MAX_PLAYERS {
        return Err(NetplayError::InvalidParticipants(participants));
    }

    let (submit_tx, submit_rx) = unbounded::<HubMessage>();
    let mut replies = Vec::with_capacity(participants);
    let mut clients = Vec::with_capacity(participants);
    for slot in 0..participants {
        let (reply_tx, reply_rx) = unbounded::<HubReply>();
        replies.push(reply_tx);
        clients.push(LoopbackClient {
            player: PlayerNumber::new(slot as i64 + 1)?,
            submit: submit_tx.clone(),
            replies: reply_rx,
        });
    }
    drop(submit_tx);

    thread::Builder::new()
        .name("pifsync-loopback".to_string())
        .spawn(move || run_hub(&submit_rx, &replies))
        .map_err(|e| NetplayError::ConnectionFailed(e.to_string()))?;

    Ok(clients)
}

fn run_hub(rx: &Receiver<HubMessage>, replies: &[Sender<HubReply>]) {
    let mut pending: Vec<Option<u32>> = vec![None; replies.len()];
    let mut round: u64 = 0;

    while let Ok(msg) = rx.recv() {
        match msg {
            HubMessage::Submit { slot, value } => {
                if pending[slot].replace(value).is_some() {
                    warn!(slot, round, "participant submitted twice in one round");
                    break;
                }
                if pending.iter().all(Option::is_some) {
                    let values: Vec<u32> = pending
                        .iter_mut()
                        .map(|v| v.take().unwrap_or_default())
                        .collect();
                    for reply in replies {
                        let _ = reply.send(HubReply::Round(values.clone()));
                    }
                    round += 1;
                }
            }
            HubMessage::Leave { slot } => {
                debug!(slot, round, "participant left; closing hub");
                break;
            }
        }
    }

    for reply in replies {
        let _ = reply.send(HubReply::Closed);
    }
}

/// One participant's end of a [`loopback`] hub.
pub struct LoopbackClient {
    player: PlayerNumber,
    submit: Sender<HubMessage>,
    replies: Receiver<HubReply>,
}

impl LoopbackClient {
    pub fn player(&self) -> PlayerNumber {
        self.player
    }
}

impl NetSyncClient for LoopbackClient {
    fn exchange(&mut self, local: u32) -> Result<Vec<u32>, NetplayError> {
        self.submit
            .send(HubMessage::Submit {
                slot: self.player.index(),
                value: local,
            })
            .map_err(|_| NetplayError::PeerDisconnected)?;
        match self.replies.recv() {
            Ok(HubReply::Round(values)) => Ok(values),
            Ok(HubReply::Closed) | Err(_) => Err(NetplayError::PeerDisconnected),
        }
    }
}

impl Drop for LoopbackClient {
    fn drop(&mut self) {
        let _ = self.submit.send(HubMessage::Leave {
            slot: self.player.index(),
        });
    }
}

/// Rendezvous-only connector around a hub client.
///
/// The client stays alive as long as the connector does, so consecutive
/// sessions reuse the same rendezvous.
pub struct LoopbackConnector {
    client: Arc<Mutex<LoopbackClient>>,
    published: Mutex<Option<PlayerNumber>>,
}

impl LoopbackConnector {
    pub fn new(client: LoopbackClient) -> Self {
        Self {
            client: Arc::new(Mutex::new(client)),
            published: Mutex::new(None),
        }
    }

    pub fn player(&self) -> PlayerNumber {
        self.client.lock().player()
    }

    /// Player number last published by the session layer.
    pub fn published_player(&self) -> Option<PlayerNumber> {
        *self.published.lock()
    }
}

struct SharedClient(Arc<Mutex<LoopbackClient>>);

impl NetSyncClient for SharedClient {
    fn exchange(&mut self, local: u32) -> Result<Vec<u32>, NetplayError> {
        self.0.lock().exchange(local)
    }
}

impl PeerConnector for LoopbackConnector {
    fn rendezvous_established(&self) -> bool {
        true
    }

    fn sync_client(&self) -> Option<Box<dyn NetSyncClient>> {
        Some(Box::new(SharedClient(Arc::clone(&self.client))))
    }

    fn set_player_number(&self, player: Option<PlayerNumber>) {
        *self.published.lock() = player;
    }

    fn connect(&self, address: &str, port: u16, _player: PlayerNumber) -> Result<(), NetplayError> {
        Err(NetplayError::ConnectionFailed(format!(
            "loopback hub cannot dial {address}:{port}"
        )))
    }

    fn disconnect(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_bounds() {
        assert!(matches!(
            loopback(0),
            Err(NetplayError::InvalidParticipants(0))
        ));
        assert!(loopback(9).is_err());
        assert_eq!(loopback(8).unwrap().len(), 8);
    }

    #[test]
    fn single_player_round_trips() {
        let mut clients = loopback(1).unwrap();
        let mut only = clients.remove(0);
        assert_eq!(only.exchange(7).unwrap(), vec![7]);
        assert_eq!(only.exchange(8).unwrap(), vec![8]);
    }

    #[test]
    fn connector_refuses_direct_connections() {
        let mut clients = loopback(1).unwrap();
        let connector = LoopbackConnector::new(clients.remove(0));
        let player = connector.player();
        assert!(connector.connect("127.0.0.1", 1, player).is_err());
        assert!(connector.rendezvous_established());
        connector.set_player_number(Some(player));
        assert_eq!(connector.published_player(), Some(player));
    }
}
