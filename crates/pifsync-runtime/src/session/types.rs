use std::path::PathBuf;

use pifsync_netplay::{NetplayError, NetplayMode};

use crate::{
    engine::{EngineCommand, EngineError},
    host::HostError,
    session::SessionState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub rom: PathBuf,
    /// Disk image paired with a cartridge ROM.
    pub disk: Option<PathBuf>,
    pub netplay: NetplayMode,
}

impl StartRequest {
    pub fn local(rom: impl Into<PathBuf>) -> Self {
        Self {
            rom: rom.into(),
            disk: None,
            netplay: NetplayMode::Local,
        }
    }

    /// Builds a request from frontend-style netplay arguments: an empty
    /// address means local play, the rendezvous marker selects the
    /// out-of-band session, anything else is a direct peer address.
    pub fn from_frontend(
        rom: impl Into<PathBuf>,
        disk: Option<PathBuf>,
        address: &str,
        port: u16,
        player: i64,
    ) -> Result<Self, SessionError> {
        let netplay = NetplayMode::from_parts(address, port, player)?;
        Ok(Self {
            rom: rom.into(),
            disk,
            netplay,
        })
    }

    pub fn with_disk(mut self, disk: impl Into<PathBuf>) -> Self {
        self.disk = Some(disk.into());
        self
    }

    pub fn with_netplay(mut self, netplay: NetplayMode) -> Self {
        self.netplay = netplay;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("another lifecycle operation is in progress")]
    Busy,
    #[error("cannot {op} while the session is {state}")]
    InvalidState {
        op: &'static str,
        state: SessionState,
    },
    #[error("cannot {op} during a netplay session")]
    NetplayActive { op: &'static str },
    #[error("rendezvous session is not established")]
    RendezvousNotEstablished,
    #[error("failed to open ROM: {0}")]
    RomOpen(HostError),
    #[error("failed to apply ROM plugin settings: {0}")]
    PluginSettings(HostError),
    #[error("plugins are not ready")]
    PluginsNotReady,
    #[error("failed to attach plugins: {0}")]
    PluginAttach(HostError),
    #[error("failed to apply cheats: {0}")]
    Cheats(HostError),
    #[error("failed to determine ROM type: {0}")]
    RomType(HostError),
    #[error("failed to register disk image: {0}")]
    Media(HostError),
    #[error("failed to apply settings: {0}")]
    Settings(HostError),
    #[error("netplay: {0}")]
    Netplay(#[from] NetplayError),
    #[error("{command} failed: {source}")]
    Engine {
        command: EngineCommand,
        source: EngineError,
    },
    #[error("emulation failed: {0}")]
    Execute(EngineError),
}
