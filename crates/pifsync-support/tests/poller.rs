use std::{
    collections::VecDeque,
    thread,
    time::{Duration, Instant},
};

use pifsync_support::{AdapterPoller, AdapterTransport, PortState, REPORT_LEN, SupportError};

/// Plays back scripted reads, then repeats the last good report.
struct Scripted {
    reads: VecDeque<Result<Vec<u8>, SupportError>>,
    last: [u8; REPORT_LEN],
}

impl Scripted {
    fn new(reads: Vec<Result<Vec<u8>, SupportError>>) -> Self {
        Self {
            reads: reads.into(),
            last: [0; REPORT_LEN],
        }
    }
}

impl AdapterTransport for Scripted {
    fn read_report(&mut self, buf: &mut [u8; REPORT_LEN]) -> Result<usize, SupportError> {
        match self.reads.pop_front() {
            Some(Ok(bytes)) => {
                let len = bytes.len().min(REPORT_LEN);
                buf[..len].copy_from_slice(&bytes[..len]);
                if len == REPORT_LEN {
                    self.last = *buf;
                }
                Ok(len)
            }
            Some(Err(err)) => Err(err),
            None => {
                *buf = self.last;
                Ok(REPORT_LEN)
            }
        }
    }
}

/// Transport that never produces a report.
struct Failing;

impl AdapterTransport for Failing {
    fn read_report(&mut self, _buf: &mut [u8; REPORT_LEN]) -> Result<usize, SupportError> {
        thread::sleep(Duration::from_millis(1));
        Err(SupportError::Transfer("pipe error".into()))
    }
}

fn pad_report(port: usize, status: u8) -> Vec<u8> {
    let mut report = vec![0u8; REPORT_LEN];
    report[1 + port * 9] = status;
    report
}

fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn first_report_is_published() {
    let poller = AdapterPoller::spawn(Scripted::new(vec![Ok(pad_report(2, 0x10))])).unwrap();
    poller.wait_for_first_poll(Duration::from_secs(5)).unwrap();

    let ports = poller.snapshot();
    assert!(ports[2].is_connected());
    assert!(!ports[0].is_connected());
    assert_eq!(poller.port(2).map(|p| p.status), Some(0x10));
    assert_eq!(poller.port(4), None);
    assert!(poller.is_running());
}

#[test]
fn short_reads_and_transfer_errors_are_skipped() {
    let poller = AdapterPoller::spawn(Scripted::new(vec![
        Ok(vec![0x21; 12]),
        Err(SupportError::Transfer("timeout".into())),
        Ok(pad_report(0, 0x10)),
    ]))
    .unwrap();
    poller.wait_for_first_poll(Duration::from_secs(5)).unwrap();
    assert!(poller.snapshot()[0].is_connected());
}

#[test]
fn device_loss_resets_state_and_stops() {
    let poller = AdapterPoller::spawn(Scripted::new(vec![
        Ok(pad_report(1, 0x10)),
        Err(SupportError::DeviceLost),
    ]))
    .unwrap();
    poller.wait_for_first_poll(Duration::from_secs(5)).unwrap();
    wait_until(|| !poller.is_running());
    assert_eq!(poller.snapshot(), [PortState::default(); 4]);
}

#[test]
fn device_loss_before_any_report_unblocks_waiters() {
    let poller = AdapterPoller::spawn(Scripted::new(vec![Err(SupportError::DeviceLost)])).unwrap();
    poller.wait_for_first_poll(Duration::from_secs(5)).unwrap();
    wait_until(|| !poller.is_running());
}

#[test]
fn wait_times_out_without_reports() {
    let poller = AdapterPoller::spawn(Failing).unwrap();
    let timeout = Duration::from_millis(20);
    assert_eq!(
        poller.wait_for_first_poll(timeout),
        Err(SupportError::PollTimeout(timeout))
    );
}

#[test]
fn stop_joins_the_thread() {
    let mut poller = AdapterPoller::spawn(Scripted::new(vec![Ok(pad_report(0, 0x10))])).unwrap();
    poller.wait_for_first_poll(Duration::from_secs(5)).unwrap();
    poller.stop();
    assert!(!poller.is_running());
    // Second stop is a no-op.
    poller.stop();
}
