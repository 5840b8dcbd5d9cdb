//! In-memory collaborators for headless sessions.

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::Mutex;
use pifsync_netplay::PeerConnector;
use pifsync_runtime::{
    CheatHost, CoreSettings, GameOverrides, HostError, MediaHost, PluginHost, RomHeader, RomHost,
    RomType, SessionHosts, SettingsHost, SystemType,
};
use tracing::debug;

/// Tracks every acquisition so a second acquire or an unmatched release
/// fails the way a real frontend would.
#[derive(Default)]
pub struct MemoryHosts {
    rom: Mutex<Option<PathBuf>>,
    plugin_settings: AtomicBool,
    plugins_attached: AtomicBool,
    cheats_applied: AtomicBool,
    disk: Mutex<Option<PathBuf>>,
    global: CoreSettings,
    game: Option<GameOverrides>,
    current: Mutex<CoreSettings>,
}

impl MemoryHosts {
    pub fn new(global: CoreSettings, game: Option<GameOverrides>) -> Self {
        Self {
            current: Mutex::new(global.clone()),
            global,
            game,
            ..Self::default()
        }
    }

    /// Bundles these hosts with `peers` for a session controller.
    pub fn bundle(self: &Arc<Self>, peers: Arc<dyn PeerConnector>) -> SessionHosts {
        SessionHosts {
            rom: Arc::clone(self) as Arc<dyn RomHost>,
            plugins: Arc::clone(self) as Arc<dyn PluginHost>,
            cheats: Arc::clone(self) as Arc<dyn CheatHost>,
            media: Arc::clone(self) as Arc<dyn MediaHost>,
            settings: Arc::clone(self) as Arc<dyn SettingsHost>,
            peers,
        }
    }

    /// Whether anything acquired during a session is still held.
    pub fn holds_resources(&self) -> bool {
        self.rom.lock().is_some()
            || self.plugin_settings.load(Ordering::Acquire)
            || self.plugins_attached.load(Ordering::Acquire)
            || self.cheats_applied.load(Ordering::Acquire)
            || self.disk.lock().is_some()
    }

    pub fn current_settings(&self) -> CoreSettings {
        self.current.lock().clone()
    }

    fn acquire(flag: &AtomicBool, subsystem: &'static str) -> Result<(), HostError> {
        if flag.swap(true, Ordering::AcqRel) {
            return Err(HostError::new(subsystem, "already acquired"));
        }
        debug!(subsystem, "acquired");
        Ok(())
    }

    fn release(flag: &AtomicBool, subsystem: &'static str) -> Result<(), HostError> {
        if !flag.swap(false, Ordering::AcqRel) {
            return Err(HostError::new(subsystem, "not held"));
        }
        debug!(subsystem, "released");
        Ok(())
    }
}

impl RomHost for MemoryHosts {
    fn open_rom(&self, path: &Path) -> Result<(), HostError> {
        let mut rom = self.rom.lock();
        if rom.is_some() {
            return Err(HostError::new("rom", "a ROM is already open"));
        }
        *rom = Some(path.to_path_buf());
        Ok(())
    }

    fn close_rom(&self) -> Result<(), HostError> {
        self.rom
            .lock()
            .take()
            .map(drop)
            .ok_or_else(|| HostError::new("rom", "no ROM is open"))
    }

    fn rom_type(&self) -> Result<RomType, HostError> {
        let rom = self.rom.lock();
        let path = rom
            .as_ref()
            .ok_or_else(|| HostError::new("rom", "no ROM is open"))?;
        let disk = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ndd"));
        Ok(if disk { RomType::Disk } else { RomType::Cartridge })
    }

    fn rom_header(&self) -> Result<RomHeader, HostError> {
        let rom = self.rom.lock();
        let path = rom
            .as_ref()
            .ok_or_else(|| HostError::new("rom", "no ROM is open"))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Headless runs carry one set of overrides for every ROM.
        Ok(RomHeader {
            md5: String::new(),
            name,
            system: SystemType::Ntsc,
        })
    }
}

impl PluginHost for MemoryHosts {
    fn apply_rom_plugin_settings(&self) -> Result<(), HostError> {
        Self::acquire(&self.plugin_settings, "plugin settings")
    }

    fn restore_plugin_settings(&self) -> Result<(), HostError> {
        Self::release(&self.plugin_settings, "plugin settings")
    }

    fn plugins_ready(&self) -> bool {
        true
    }

    fn attach(&self) -> Result<(), HostError> {
        Self::acquire(&self.plugins_attached, "plugins")
    }

    fn detach(&self) -> Result<(), HostError> {
        Self::release(&self.plugins_attached, "plugins")
    }
}

impl CheatHost for MemoryHosts {
    fn apply_local(&self) -> Result<(), HostError> {
        Self::acquire(&self.cheats_applied, "cheats")
    }

    fn apply_netplay(&self) -> Result<(), HostError> {
        Self::acquire(&self.cheats_applied, "cheats")
    }

    fn clear(&self) -> Result<(), HostError> {
        Self::release(&self.cheats_applied, "cheats")
    }
}

impl MediaHost for MemoryHosts {
    fn set_disk_file(&self, path: Option<&Path>) -> Result<(), HostError> {
        *self.disk.lock() = path.map(Path::to_path_buf);
        Ok(())
    }

    fn reset(&self) -> Result<(), HostError> {
        *self.disk.lock() = None;
        Ok(())
    }
}

impl SettingsHost for MemoryHosts {
    fn global(&self) -> CoreSettings {
        self.global.clone()
    }

    fn game_overrides(&self, _md5: &str) -> Option<GameOverrides> {
        self.game.clone()
    }

    fn current(&self) -> CoreSettings {
        self.current.lock().clone()
    }

    fn apply(&self, settings: &CoreSettings) -> Result<(), HostError> {
        debug!(cpu = %settings.cpu_emulator, "settings applied");
        *self.current.lock() = settings.clone();
        Ok(())
    }
}
