//! Collaborators the session drives during start and teardown.
//!
//! Every host reports failures as a [`HostError`]; the session maps them to
//! the start step that failed.

use std::{path::Path, sync::Arc};

use pifsync_netplay::PeerConnector;

use crate::overlay::{CoreSettings, GameOverrides};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{subsystem}: {message}")]
pub struct HostError {
    pub subsystem: &'static str,
    pub message: String,
}

impl HostError {
    pub fn new(subsystem: &'static str, message: impl Into<String>) -> Self {
        Self {
            subsystem,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum RomType {
    Cartridge,
    Disk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SystemType {
    #[strum(serialize = "NTSC")]
    Ntsc,
    #[strum(serialize = "PAL")]
    Pal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomHeader {
    pub name: String,
    pub md5: String,
    pub system: SystemType,
}

pub trait RomHost: Send + Sync {
    fn open_rom(&self, path: &Path) -> Result<(), HostError>;
    fn close_rom(&self) -> Result<(), HostError>;
    fn rom_type(&self) -> Result<RomType, HostError>;
    fn rom_header(&self) -> Result<RomHeader, HostError>;
}

pub trait PluginHost: Send + Sync {
    /// Applies per-ROM plugin selections. May partially succeed.
    fn apply_rom_plugin_settings(&self) -> Result<(), HostError>;
    fn restore_plugin_settings(&self) -> Result<(), HostError>;
    fn plugins_ready(&self) -> bool;
    fn attach(&self) -> Result<(), HostError>;
    fn detach(&self) -> Result<(), HostError>;
}

pub trait CheatHost: Send + Sync {
    fn apply_local(&self) -> Result<(), HostError>;
    /// Applies the cheat set agreed with peers.
    fn apply_netplay(&self) -> Result<(), HostError>;
    fn clear(&self) -> Result<(), HostError>;
}

pub trait MediaHost: Send + Sync {
    /// Associates a disk image with a cartridge; `None` clears it.
    fn set_disk_file(&self, path: Option<&Path>) -> Result<(), HostError>;
    fn reset(&self) -> Result<(), HostError>;
}

pub trait SettingsHost: Send + Sync {
    /// User-level core settings.
    fn global(&self) -> CoreSettings;
    /// Per-game overrides keyed by the ROM's MD5, if any were saved.
    fn game_overrides(&self, md5: &str) -> Option<GameOverrides>;
    /// Values the engine will read right now.
    fn current(&self) -> CoreSettings;
    fn apply(&self, settings: &CoreSettings) -> Result<(), HostError>;
}

#[derive(Clone)]
pub struct SessionHosts {
    pub rom: Arc<dyn RomHost>,
    pub plugins: Arc<dyn PluginHost>,
    pub cheats: Arc<dyn CheatHost>,
    pub media: Arc<dyn MediaHost>,
    pub settings: Arc<dyn SettingsHost>,
    pub peers: Arc<dyn PeerConnector>,
}
