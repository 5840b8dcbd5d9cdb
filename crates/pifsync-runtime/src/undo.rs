//! Reverse-order release of acquired resources.

use tracing::{debug, warn};

use crate::host::HostError;

type UndoFn = Box<dyn FnOnce() -> Result<(), HostError> + Send>;

/// Labelled release actions, run last-in first-out.
///
/// Steps moved out with [`UndoStack::postpone`] run after the stacked ones, in
/// the order they were postponed. Anything still pending when the stack is
/// dropped gets released then.
#[derive(Default)]
pub struct UndoStack {
    steps: Vec<(&'static str, UndoFn)>,
    postponed: Vec<(&'static str, UndoFn)>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<F>(&mut self, label: &'static str, undo: F)
    where
        F: FnOnce() -> Result<(), HostError> + Send + 'static,
    {
        self.steps.push((label, Box::new(undo)));
    }

    /// Moves the most recently pushed step named `label` behind every stacked
    /// step. Returns false when no such step is pending.
    pub fn postpone(&mut self, label: &'static str) -> bool {
        match self.steps.iter().rposition(|(pending, _)| *pending == label) {
            Some(index) => {
                let step = self.steps.remove(index);
                self.postponed.push(step);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len() + self.postponed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.postponed.is_empty()
    }

    /// Labels in release order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .rev()
            .chain(&self.postponed)
            .map(|(label, _)| *label)
            .collect()
    }

    /// Runs every pending release. All steps run even if some fail; the last
    /// failure is returned.
    pub fn unwind(&mut self) -> Option<HostError> {
        let mut last_failure = None;
        let stacked = std::mem::take(&mut self.steps).into_iter().rev();
        let postponed = std::mem::take(&mut self.postponed);
        for (label, undo) in stacked.chain(postponed) {
            debug!(step = label, "releasing");
            if let Err(err) = undo() {
                warn!(step = label, error = %err, "teardown step failed");
                last_failure = Some(err);
            }
        }
        last_failure
    }
}

impl Drop for UndoStack {
    fn drop(&mut self) {
        if !self.is_empty() {
            let _ = self.unwind();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> UndoFn) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |label: &'static str| -> UndoFn {
            let sink = Arc::clone(&sink);
            Box::new(move || {
                sink.lock().push(label);
                Ok(())
            })
        };
        (log, make)
    }

    #[test]
    fn unwinds_in_reverse_push_order() {
        let (log, make) = recorder();
        let mut stack = UndoStack::new();
        stack.push("close rom", make("close rom"));
        stack.push("detach", make("detach"));
        stack.push("clear cheats", make("clear cheats"));
        assert_eq!(stack.labels(), vec!["clear cheats", "detach", "close rom"]);

        assert_eq!(stack.unwind(), None);
        assert_eq!(*log.lock(), vec!["clear cheats", "detach", "close rom"]);
        assert!(stack.is_empty());
    }

    #[test]
    fn failures_do_not_stop_the_unwind_and_the_last_one_wins() {
        let (log, make) = recorder();
        let mut stack = UndoStack::new();
        stack.push("close rom", || Err(HostError::new("rom", "already closed")));
        stack.push("detach", make("detach"));
        stack.push("clear cheats", || Err(HostError::new("cheats", "busy")));

        let failure = stack.unwind().expect("failure reported");
        assert_eq!(failure.subsystem, "rom");
        assert_eq!(*log.lock(), vec!["detach"]);
    }

    #[test]
    fn postponed_steps_run_after_the_stack_in_postpone_order() {
        let (log, make) = recorder();
        let mut stack = UndoStack::new();
        stack.push("restore settings", make("restore settings"));
        stack.push("close rom", make("close rom"));
        stack.push("restore plugin settings", make("restore plugin settings"));
        stack.push("detach", make("detach"));
        stack.push("reset media", make("reset media"));

        assert!(stack.postpone("restore plugin settings"));
        assert!(stack.postpone("restore settings"));
        assert!(stack.postpone("reset media"));
        assert!(!stack.postpone("reset media"));
        stack.push("clear cheats", make("clear cheats"));

        let order = vec![
            "clear cheats",
            "detach",
            "close rom",
            "restore plugin settings",
            "restore settings",
            "reset media",
        ];
        assert_eq!(stack.labels(), order);
        assert_eq!(stack.len(), 6);
        assert_eq!(stack.unwind(), None);
        assert_eq!(*log.lock(), order);
        assert!(stack.is_empty());
    }

    #[test]
    fn drop_releases_pending_steps() {
        let (log, make) = recorder();
        {
            let mut stack = UndoStack::new();
            stack.push("a", make("a"));
            stack.push("b", make("b"));
            stack.push("c", make("c"));
            stack.postpone("a");
        }
        assert_eq!(*log.lock(), vec!["c", "b", "a"]);
    }
}
