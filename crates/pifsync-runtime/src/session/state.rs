use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use parking_lot::Mutex;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::FromRepr, strum::IntoStaticStr,
)]
#[repr(u8)]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    #[default]
    Stopped = 0,
    Starting = 1,
    Running = 2,
    Paused = 3,
    Stopping = 4,
}

/// Lifecycle fields readable from any thread while a run blocks in `start`.
pub(crate) struct SessionShared {
    state: AtomicU8,
    pub(crate) networked: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl SessionShared {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(SessionState::Stopped as u8),
            networked: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        SessionState::from_repr(self.state.load(Ordering::Acquire)).unwrap_or_default()
    }

    pub(crate) fn set_state(&self, state: SessionState) {
        let previous = self.state.swap(state as u8, Ordering::AcqRel);
        if previous != state as u8 {
            tracing::debug!(from = ?SessionState::from_repr(previous), to = %state, "session state");
        }
    }

    pub(crate) fn is_networked(&self) -> bool {
        self.networked.load(Ordering::Acquire)
    }

    pub(crate) fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub(crate) fn record_error(&self, message: String) {
        *self.last_error.lock() = Some(message);
    }

    pub(crate) fn clear_error(&self) {
        *self.last_error.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_through_the_atomic() {
        let shared = SessionShared::new();
        assert_eq!(shared.state(), SessionState::Stopped);
        shared.set_state(SessionState::Paused);
        assert_eq!(shared.state(), SessionState::Paused);
        assert_eq!(SessionState::Paused.to_string(), "paused");
    }

    #[test]
    fn last_error_is_replaced_not_appended() {
        let shared = SessionShared::new();
        shared.record_error("first".into());
        shared.record_error("second".into());
        assert_eq!(shared.last_error().as_deref(), Some("second"));
        shared.clear_error();
        assert_eq!(shared.last_error(), None);
    }
}
