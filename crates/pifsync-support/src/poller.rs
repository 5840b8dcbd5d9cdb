//! Background adapter polling.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    adapter::{PORT_COUNT, PortState, REPORT_LEN, parse_report},
    error::SupportError,
};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Source of raw adapter reports. The USB side lives behind this trait.
pub trait AdapterTransport: Send + 'static {
    /// Blocks until a report arrives, returning the number of bytes read.
    /// [`SupportError::DeviceLost`] ends polling.
    fn read_report(&mut self, buf: &mut [u8; REPORT_LEN]) -> Result<usize, SupportError>;
}

struct PollerShared {
    ports: Mutex<[PortState; PORT_COUNT]>,
    polled: AtomicBool,
    running: AtomicBool,
}

impl PollerShared {
    /// Flags the first report, waking anyone in `wait_for_first_poll`.
    fn mark_polled(&self, first_poll: &Sender<()>) {
        if !self.polled.swap(true, Ordering::AcqRel) {
            let _ = first_poll.try_send(());
        }
    }
}

/// Reads adapter reports on a dedicated thread and keeps the latest port
/// states available to readers on other threads.
pub struct AdapterPoller {
    shared: Arc<PollerShared>,
    stop_tx: Option<Sender<()>>,
    first_poll: Receiver<()>,
    thread: Option<JoinHandle<()>>,
}

impl AdapterPoller {
    pub fn spawn<T: AdapterTransport>(transport: T) -> Result<Self, SupportError> {
        let shared = Arc::new(PollerShared {
            ports: Mutex::new([PortState::default(); PORT_COUNT]),
            polled: AtomicBool::new(false),
            running: AtomicBool::new(true),
        });
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let (first_tx, first_rx) = bounded::<()>(1);

        let thread_shared = Arc::clone(&shared);
        let thread = thread::Builder::new()
            .name("pifsync-gca-poll".into())
            .spawn(move || poll_loop(transport, &thread_shared, &stop_rx, &first_tx))
            .map_err(|err| SupportError::Spawn(err.to_string()))?;

        Ok(Self {
            shared,
            stop_tx: Some(stop_tx),
            first_poll: first_rx,
            thread: Some(thread),
        })
    }

    /// Blocks until the first report was published or the device went away.
    pub fn wait_for_first_poll(&self, timeout: Duration) -> Result<(), SupportError> {
        if self.shared.polled.load(Ordering::Acquire) {
            return Ok(());
        }
        match self.first_poll.recv_timeout(timeout) {
            Ok(()) => Ok(()),
            Err(RecvTimeoutError::Timeout) => Err(SupportError::PollTimeout(timeout)),
            Err(RecvTimeoutError::Disconnected) if self.shared.polled.load(Ordering::Acquire) => {
                Ok(())
            }
            Err(RecvTimeoutError::Disconnected) => Err(SupportError::PollerStopped),
        }
    }

    pub fn snapshot(&self) -> [PortState; PORT_COUNT] {
        *self.shared.ports.lock()
    }

    pub fn port(&self, index: usize) -> Option<PortState> {
        self.shared.ports.lock().get(index).copied()
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Stops the polling thread and waits for it to exit.
    pub fn stop(&mut self) {
        // Dropping the sender wakes the thread out of its interval wait.
        drop(self.stop_tx.take());
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("adapter poll thread panicked");
        }
    }
}

impl Drop for AdapterPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_loop<T: AdapterTransport>(
    mut transport: T,
    shared: &PollerShared,
    stop_rx: &Receiver<()>,
    first_poll: &Sender<()>,
) {
    let mut buf = [0u8; REPORT_LEN];
    info!("adapter polling started");
    loop {
        match transport.read_report(&mut buf) {
            Ok(REPORT_LEN) => {
                *shared.ports.lock() = parse_report(&buf);
                shared.mark_polled(first_poll);
            }
            Ok(len) => debug!(len, "short adapter report"),
            Err(SupportError::DeviceLost) => {
                warn!("adapter disconnected, stopping polling");
                *shared.ports.lock() = [PortState::default(); PORT_COUNT];
                shared.mark_polled(first_poll);
                break;
            }
            Err(err) => warn!(error = %err, "failed to read adapter report"),
        }

        match stop_rx.recv_timeout(POLL_INTERVAL) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    shared.running.store(false, Ordering::Release);
    debug!("adapter polling stopped");
}
