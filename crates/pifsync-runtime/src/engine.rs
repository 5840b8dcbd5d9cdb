//! Contract toward the simulation engine.
//!
//! The engine owns the run loop and timing. It is driven through commands
//! and reports back through two injected callbacks: one per tick, and one per
//! controller poll (the latter only if the engine exposes a [`PollHook`]).

use pifsync_joybus::JoybusChannels;

pub type FrameCallback = Box<dyn FnMut(u32) + Send>;
pub type PollCallback = Box<dyn FnMut(&mut JoybusChannels) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr, strum::Display)]
pub enum EngineCommand {
    #[strum(serialize = "stop")]
    Stop,
    #[strum(serialize = "pause")]
    Pause,
    #[strum(serialize = "resume")]
    Resume,
    #[strum(serialize = "reset")]
    Reset { hard: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("engine is not attached")]
    NotAttached,
    #[error("engine rejected the request: {0}")]
    Rejected(String),
    #[error("engine failure: {0}")]
    Failed(String),
}

pub trait Engine: Send + Sync {
    /// Runs the simulation on the calling thread until it stops.
    fn execute(&self) -> Result<(), EngineError>;

    /// Issues a control command; safe to call while [`Engine::execute`] runs
    /// on another thread.
    fn command(&self, command: EngineCommand) -> Result<(), EngineError>;

    /// Installs the per-tick callback for the next run.
    fn set_frame_callback(&self, callback: FrameCallback);

    /// Hands a PIF boot image to the engine.
    fn open_pif(&self, image: &[u8]) -> Result<(), EngineError>;

    /// Capability to intercept controller polls. Engines without it simply
    /// return `None`.
    fn poll_hook(&self) -> Option<&dyn PollHook> {
        None
    }
}

pub trait PollHook: Send + Sync {
    /// Installs the poll callback for the next run. Not removable mid-run.
    fn set_poll_callback(&self, callback: PollCallback);
}
