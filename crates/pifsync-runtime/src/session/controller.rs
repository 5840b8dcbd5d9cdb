use std::sync::{Arc, atomic::Ordering};

use parking_lot::Mutex;
use pifsync_netplay::{
    FrameClock, JoybusInterceptor, NetSyncClient, NetplayError, NetplayMode, PeerLink, SyncState,
};
use tracing::{debug, error, info, warn};

use crate::{
    engine::{Engine, EngineCommand},
    host::{RomType, SessionHosts},
    overlay,
    pif::{self, PifOutcome},
    session::{SessionError, SessionState, StartRequest, state::SessionShared},
    undo::UndoStack,
};

const CLOSE_ROM: &str = "close ROM";
const RESTORE_PLUGIN_SETTINGS: &str = "restore plugin settings";
const RESTORE_SETTINGS: &str = "restore settings";
const RESET_MEDIA: &str = "reset media loader";

/// What a successful acquisition hands to the run phase.
struct Acquired {
    sync_client: Option<Box<dyn NetSyncClient>>,
}

/// Owns the start/teardown sequence of one emulation session at a time.
///
/// `start` blocks the calling thread for the whole run. The other lifecycle
/// operations are meant to be called from a different thread while it does;
/// they fail with [`SessionError::Busy`] instead of waiting when another
/// lifecycle operation holds the session.
pub struct SessionController {
    engine: Arc<dyn Engine>,
    hosts: SessionHosts,
    sync: Arc<SyncState>,
    link: Arc<PeerLink>,
    shared: SessionShared,
    lifecycle: Mutex<()>,
    poll_hook: bool,
}

impl SessionController {
    pub fn new(engine: Arc<dyn Engine>, hosts: SessionHosts) -> Self {
        let poll_hook = engine.poll_hook().is_some();
        if !poll_hook {
            debug!("engine has no poll hook; rendezvous inputs cannot be intercepted");
        }
        Self {
            engine,
            hosts,
            sync: Arc::new(SyncState::new()),
            link: Arc::new(PeerLink::new()),
            shared: SessionShared::new(),
            lifecycle: Mutex::new(()),
            poll_hook,
        }
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn current_frame(&self) -> u32 {
        self.sync.current_tick()
    }

    pub fn peer_active(&self) -> bool {
        self.link.is_active()
    }

    pub fn peer_link(&self) -> Arc<PeerLink> {
        Arc::clone(&self.link)
    }

    pub fn sync_state(&self) -> Arc<SyncState> {
        Arc::clone(&self.sync)
    }

    pub fn is_networked(&self) -> bool {
        self.shared.is_networked()
    }

    pub fn supports_poll_hook(&self) -> bool {
        self.poll_hook
    }

    /// Message of the most relevant failure of the last session or command.
    pub fn last_error(&self) -> Option<String> {
        self.shared.last_error()
    }

    /// Acquires everything the run needs, runs the engine to completion and
    /// releases the acquisitions.
    ///
    /// A failed acquisition releases the earlier steps in reverse order. Once
    /// the settings overlay is applied, teardown disconnects the peers, clears
    /// cheats, detaches plugins and closes the ROM, then reverts plugin and
    /// core settings and finally resets the media loader.
    pub fn start(&self, request: StartRequest) -> Result<(), SessionError> {
        let mut guard = self.lifecycle.try_lock().ok_or(SessionError::Busy)?;
        let state = self.shared.state();
        if state != SessionState::Stopped {
            return Err(SessionError::InvalidState { op: "start", state });
        }
        if request.netplay.forces_determinism() && !self.hosts.peers.rendezvous_established() {
            let err = SessionError::RendezvousNotEstablished;
            self.shared.record_error(err.to_string());
            return Err(err);
        }

        self.shared.clear_error();
        self.shared.set_state(SessionState::Starting);
        info!(rom = %request.rom.display(), netplay = ?request.netplay, "starting session");

        let mut undo = UndoStack::new();
        let run = match self.acquire(&request, &mut undo) {
            Ok(acquired) => {
                drop(guard);
                let run = self.run(acquired);
                guard = self.lifecycle.lock();
                run
            }
            Err(err) => {
                warn!(error = %err, "session start aborted");
                Err(err)
            }
        };

        self.shared.set_state(SessionState::Stopping);
        let teardown = undo.unwind();
        self.link.clear();
        self.shared.networked.store(false, Ordering::Release);
        self.shared.set_state(SessionState::Stopped);
        drop(guard);

        match (&run, teardown) {
            (Err(err), _) => self.shared.record_error(err.to_string()),
            (Ok(()), Some(failure)) => self.shared.record_error(failure.to_string()),
            (Ok(()), None) => {}
        }
        info!(frames = self.sync.current_tick(), "session ended");
        run
    }

    pub fn stop(&self) -> Result<(), SessionError> {
        let _guard = self.lifecycle.try_lock().ok_or(SessionError::Busy)?;
        let state = self.shared.state();
        if !matches!(state, SessionState::Running | SessionState::Paused) {
            return Err(self.reject(SessionError::InvalidState { op: "stop", state }));
        }
        self.issue(EngineCommand::Stop)?;
        self.shared.set_state(SessionState::Stopping);
        if self.shared.is_networked() {
            // Polls until the engine exits pass through without exchanging.
            self.link.clear();
            self.hosts.peers.set_player_number(None);
        }
        Ok(())
    }

    pub fn pause(&self) -> Result<(), SessionError> {
        self.transition("pause", SessionState::Running, EngineCommand::Pause, SessionState::Paused)
    }

    pub fn resume(&self) -> Result<(), SessionError> {
        self.transition("resume", SessionState::Paused, EngineCommand::Resume, SessionState::Running)
    }

    pub fn reset(&self, hard: bool) -> Result<(), SessionError> {
        let _guard = self.lifecycle.try_lock().ok_or(SessionError::Busy)?;
        let state = self.shared.state();
        if state != SessionState::Running {
            return Err(self.reject(SessionError::InvalidState { op: "reset", state }));
        }
        self.issue(EngineCommand::Reset { hard })
    }

    fn transition(
        &self,
        op: &'static str,
        from: SessionState,
        command: EngineCommand,
        to: SessionState,
    ) -> Result<(), SessionError> {
        let _guard = self.lifecycle.try_lock().ok_or(SessionError::Busy)?;
        if self.shared.is_networked() {
            return Err(self.reject(SessionError::NetplayActive { op }));
        }
        let state = self.shared.state();
        if state != from {
            return Err(self.reject(SessionError::InvalidState { op, state }));
        }
        self.issue(command)?;
        self.shared.set_state(to);
        Ok(())
    }

    /// Records a refused lifecycle command as the last error.
    fn reject(&self, err: SessionError) -> SessionError {
        debug!(error = %err, "lifecycle command refused");
        self.shared.record_error(err.to_string());
        err
    }

    fn issue(&self, command: EngineCommand) -> Result<(), SessionError> {
        debug!(%command, "engine command");
        self.engine.command(command).map_err(|source| {
            let err = SessionError::Engine { command, source };
            warn!(error = %err, "engine command failed");
            self.shared.record_error(err.to_string());
            err
        })
    }

    fn acquire(
        &self,
        request: &StartRequest,
        undo: &mut UndoStack,
    ) -> Result<Acquired, SessionError> {
        let hosts = &self.hosts;
        let deterministic = request.netplay.forces_determinism();
        let snapshot = hosts.settings.current();
        let mut settings_guarded = false;

        // The engine samples the CPU mode while opening the ROM.
        if deterministic {
            let mut forced = snapshot.clone();
            forced.force_deterministic();
            self.guard_settings(undo, &snapshot, &mut settings_guarded);
            hosts.settings.apply(&forced).map_err(SessionError::Settings)?;
            debug!("deterministic settings applied ahead of ROM open");
        }

        hosts.rom.open_rom(&request.rom).map_err(SessionError::RomOpen)?;
        let rom = Arc::clone(&hosts.rom);
        undo.push(CLOSE_ROM, move || rom.close_rom());

        let plugins = Arc::clone(&hosts.plugins);
        undo.push(RESTORE_PLUGIN_SETTINGS, move || plugins.restore_plugin_settings());
        hosts
            .plugins
            .apply_rom_plugin_settings()
            .map_err(SessionError::PluginSettings)?;
        if !hosts.plugins.plugins_ready() {
            return Err(SessionError::PluginsNotReady);
        }
        hosts.plugins.attach().map_err(SessionError::PluginAttach)?;
        let plugins = Arc::clone(&hosts.plugins);
        undo.push("detach plugins", move || plugins.detach());

        let cheats = if request.netplay.is_networked() {
            hosts.cheats.apply_netplay()
        } else {
            hosts.cheats.apply_local()
        };
        cheats.map_err(SessionError::Cheats)?;
        let cheat_host = Arc::clone(&hosts.cheats);
        undo.push("clear cheats", move || cheat_host.clear());

        let rom_type = hosts.rom.rom_type().map_err(SessionError::RomType)?;
        let media = Arc::clone(&hosts.media);
        undo.push(RESET_MEDIA, move || media.reset());
        if rom_type == RomType::Cartridge {
            hosts
                .media
                .set_disk_file(request.disk.as_deref())
                .map_err(SessionError::Media)?;
        }

        let header = match hosts.rom.rom_header() {
            Ok(header) => Some(header),
            Err(err) => {
                debug!(error = %err, "ROM header unavailable; per-game overrides skipped");
                None
            }
        };
        let game = header
            .as_ref()
            .and_then(|header| hosts.settings.game_overrides(&header.md5));
        let effective = overlay::resolve(&hosts.settings.global(), game.as_ref(), deterministic);
        self.guard_settings(undo, &snapshot, &mut settings_guarded);
        hosts
            .settings
            .apply(effective.settings())
            .map_err(SessionError::Settings)?;

        // From here on teardown closes the ROM before reverting settings and
        // resets the media loader last.
        for label in [RESTORE_PLUGIN_SETTINGS, RESTORE_SETTINGS, RESET_MEDIA] {
            undo.postpone(label);
        }

        let system = header.as_ref().map(|header| header.system);
        match pif::load_boot_image(self.engine.as_ref(), effective.settings(), system) {
            Ok(PifOutcome::Loaded { .. }) => {}
            Ok(PifOutcome::Skipped(reason)) => info!(?reason, "PIF boot skipped"),
            Err(err) => {
                warn!(error = %err, "continuing without PIF boot image");
                // Kept after a clean run; a run or teardown failure replaces it.
                self.shared.record_error(err.to_string());
            }
        }

        let sync_client = self.connect_peers(&request.netplay, undo)?;
        Ok(Acquired { sync_client })
    }

    /// Pushes the settings restore once, ahead of the first apply.
    fn guard_settings(
        &self,
        undo: &mut UndoStack,
        snapshot: &overlay::CoreSettings,
        guarded: &mut bool,
    ) {
        if *guarded {
            return;
        }
        let settings = Arc::clone(&self.hosts.settings);
        let snapshot = snapshot.clone();
        undo.push(RESTORE_SETTINGS, move || settings.apply(&snapshot));
        *guarded = true;
    }

    fn connect_peers(
        &self,
        mode: &NetplayMode,
        undo: &mut UndoStack,
    ) -> Result<Option<Box<dyn NetSyncClient>>, SessionError> {
        let peers = &self.hosts.peers;
        match mode {
            NetplayMode::Local => Ok(None),
            NetplayMode::Rendezvous { player } => {
                let client = peers.sync_client().ok_or(NetplayError::NoRendezvous)?;
                peers.set_player_number(Some(*player));
                self.link.engage(*player);
                self.shared.networked.store(true, Ordering::Release);

                let (peers, link) = (Arc::clone(peers), Arc::clone(&self.link));
                undo.push("release rendezvous slot", move || {
                    link.clear();
                    peers.set_player_number(None);
                    Ok(())
                });
                info!(%player, "joined rendezvous session");
                Ok(Some(client))
            }
            NetplayMode::Direct {
                address,
                port,
                player,
            } => {
                peers.connect(address, *port, *player)?;
                self.shared.networked.store(true, Ordering::Release);

                let peers = Arc::clone(peers);
                undo.push("disconnect netplay", move || {
                    peers.disconnect();
                    Ok(())
                });
                info!(%address, port, %player, "connected to netplay server");
                Ok(None)
            }
        }
    }

    fn run(&self, acquired: Acquired) -> Result<(), SessionError> {
        self.sync.reset();
        let clock = FrameClock::new(Arc::clone(&self.sync));
        self.engine.set_frame_callback(Box::new(clock.into_callback()));

        if let Some(client) = acquired.sync_client {
            match self.engine.poll_hook() {
                Some(hook) => {
                    let interceptor =
                        JoybusInterceptor::new(Arc::clone(&self.sync), Arc::clone(&self.link), client);
                    hook.set_poll_callback(Box::new(interceptor.into_callback()));
                }
                None => warn!("engine has no poll hook; inputs will not be synchronized"),
            }
        }

        self.shared.set_state(SessionState::Running);
        let result = self.engine.execute().map_err(SessionError::Execute);
        match &result {
            Ok(()) => debug!(frames = self.sync.current_tick(), "engine returned"),
            Err(err) => error!(error = %err, "engine run failed"),
        }
        result
    }
}
