pub mod engine;
pub mod host;
pub mod overlay;
pub mod pif;
pub mod session;
pub mod undo;

pub use engine::{Engine, EngineCommand, EngineError, FrameCallback, PollCallback, PollHook};
pub use host::{
    CheatHost, HostError, MediaHost, PluginHost, RomHeader, RomHost, RomType, SessionHosts,
    SettingsHost, SystemType,
};
pub use overlay::{CoreSettings, CpuEmulator, EffectiveConfig, GameOverrides, OverlayLayer};
pub use session::{SessionController, SessionError, SessionState, StartRequest};
pub use undo::UndoStack;
