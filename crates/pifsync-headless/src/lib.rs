//! Headless lockstep soak runs.
//!
//! Every participant gets its own session controller, scripted engine and
//! in-memory hosts, joined through the loopback rendezvous hub. After the run
//! all participants must have seen the same controller words on every frame.

pub mod config;
pub mod error;
pub mod hosts;
pub mod scripted;

use std::{sync::Arc, thread};

use pifsync_netplay::{LoopbackClient, LoopbackConnector, NetplayMode, PeerConnector, loopback};
use pifsync_runtime::{CoreSettings, Engine, SessionController, StartRequest};
use tracing::{info, warn};

pub use config::SoakConfig;
pub use error::HeadlessError;
pub use hosts::MemoryHosts;
pub use scripted::{ScriptedEngine, ScriptedPad};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoakReport {
    pub players: usize,
    pub frames: usize,
    /// Per-frame controller words, identical for every participant.
    pub inputs: Vec<Vec<u32>>,
}

pub fn run_soak(config: &SoakConfig) -> Result<SoakReport, HeadlessError> {
    config.validate()?;
    info!(
        players = config.players,
        frames = config.frames,
        polls_per_frame = config.polls_per_frame,
        seed = config.seed,
        "starting soak run"
    );

    let workers: Vec<_> = loopback(config.players)?
        .into_iter()
        .map(|client| {
            let player = client.player();
            let config = config.clone();
            (player, thread::spawn(move || run_participant(client, &config)))
        })
        .collect();

    let mut streams = Vec::with_capacity(workers.len());
    for (player, worker) in workers {
        let stream = worker
            .join()
            .map_err(|_| HeadlessError::WorkerPanicked { player })??;
        streams.push((player, stream));
    }

    let expected = config.frames as usize;
    if let Some((player, stream)) = streams.iter().find(|(_, stream)| stream.len() != expected) {
        return Err(HeadlessError::FrameCount {
            player: *player,
            actual: stream.len(),
            expected,
        });
    }

    let mut streams = streams.into_iter();
    let Some((_, reference)) = streams.next() else {
        return Err(HeadlessError::InvalidConfig("no participants".into()));
    };
    for (player, stream) in streams {
        if let Some(frame) = reference.iter().zip(&stream).position(|(a, b)| a != b) {
            warn!(%player, frame, "input streams diverged");
            return Err(HeadlessError::Diverged { player, frame });
        }
    }

    info!(frames = reference.len(), "all participants agree");
    Ok(SoakReport {
        players: config.players,
        frames: reference.len(),
        inputs: reference,
    })
}

fn run_participant(
    client: LoopbackClient,
    config: &SoakConfig,
) -> Result<Vec<Vec<u32>>, HeadlessError> {
    let player = client.player();
    let seed = config.seed ^ u64::from(player.get()).rotate_left(32);
    let connector = Arc::new(LoopbackConnector::new(client));
    let engine = Arc::new(ScriptedEngine::new(
        config.frames,
        config.polls_per_frame,
        config.players,
        seed,
        Arc::new(ScriptedPad::new(seed)),
    ));
    let hosts = Arc::new(MemoryHosts::new(CoreSettings::default(), None));
    let session = SessionController::new(
        Arc::clone(&engine) as Arc<dyn Engine>,
        hosts.bundle(Arc::clone(&connector) as Arc<dyn PeerConnector>),
    );

    let request =
        StartRequest::local("headless.z64").with_netplay(NetplayMode::Rendezvous { player });
    session
        .start(request)
        .map_err(|source| HeadlessError::Session { player, source })?;

    if let Some(error) = session.last_error() {
        warn!(%player, %error, "session reported an error");
    }
    if hosts.holds_resources() {
        warn!(%player, "session left resources acquired");
    }
    // A degraded link zeroes the cache and keeps it that way.
    if session.sync_state().cache().received_count() != config.players {
        return Err(HeadlessError::PeerLost { player });
    }
    Ok(engine.observed())
}
