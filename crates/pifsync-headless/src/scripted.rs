//! Engine stand-in that drives ticks and controller polls from a seeded script.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use parking_lot::Mutex;
use pifsync_joybus::{
    JoybusChannel, JoybusChannels, JoybusCommand, RxStatus,
    constants::{
        CONTROLLER_REPLY_LEN, PAK_READ_SENTINEL_OFFSET, PAK_WRITE_SENTINEL_OFFSET, STATUS_REPLY_LEN,
    },
    idle_channels, reply,
};
use pifsync_runtime::{Engine, EngineCommand, EngineError, FrameCallback, PollCallback, PollHook};
use pifsync_support::LocalInputSource;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, trace};

const PAK_READ_REPLY_LEN: usize = PAK_READ_SENTINEL_OFFSET + 1;
const PAK_WRITE_REPLY_LEN: usize = PAK_WRITE_SENTINEL_OFFSET + 1;

/// Runs a fixed number of ticks. Each tick opens with a controller read on
/// every port, followed by a random mix of status, controller and pak polls.
pub struct ScriptedEngine {
    frames: u32,
    polls_per_frame: u32,
    ports: usize,
    rng: Mutex<StdRng>,
    input: Arc<dyn LocalInputSource>,
    frame_cb: Mutex<Option<FrameCallback>>,
    poll_cb: Mutex<Option<PollCallback>>,
    stop: AtomicBool,
    paused: AtomicBool,
    reset: AtomicBool,
    pif_loaded: AtomicBool,
    observed: Mutex<Vec<Vec<u32>>>,
}

impl ScriptedEngine {
    pub fn new(
        frames: u32,
        polls_per_frame: u32,
        ports: usize,
        seed: u64,
        input: Arc<dyn LocalInputSource>,
    ) -> Self {
        Self {
            frames,
            polls_per_frame: polls_per_frame.max(1),
            ports: ports.clamp(1, pifsync_joybus::constants::CHANNEL_COUNT),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            input,
            frame_cb: Mutex::new(None),
            poll_cb: Mutex::new(None),
            stop: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            reset: AtomicBool::new(false),
            pif_loaded: AtomicBool::new(false),
            observed: Mutex::new(Vec::new()),
        }
    }

    /// Controller words each port held after the tick's last controller read.
    pub fn observed(&self) -> Vec<Vec<u32>> {
        self.observed.lock().clone()
    }

    pub fn pif_loaded(&self) -> bool {
        self.pif_loaded.load(Ordering::Acquire)
    }

    fn run_frame(&self, frame: u32) -> Vec<u32> {
        if let Some(tick) = self.frame_cb.lock().as_mut() {
            tick(frame);
        }

        let extra = self.rng.lock().random_range(0..self.polls_per_frame);
        let mut words = self.poll(JoybusCommand::ControllerRead);
        for _ in 0..extra {
            let command = match self.rng.lock().random_range(0..4u8) {
                0 => JoybusCommand::Status,
                1 => JoybusCommand::PakRead,
                2 => JoybusCommand::PakWrite,
                _ => JoybusCommand::ControllerRead,
            };
            let seen = self.poll(command);
            if command == JoybusCommand::ControllerRead {
                words = seen;
            }
        }
        words
    }

    /// Issues one poll of `command` on every port and returns what the
    /// controller channels read back.
    fn poll(&self, command: JoybusCommand) -> Vec<u32> {
        let mut channels = self.channels(command);
        if command == JoybusCommand::ControllerRead
            && let Some(rx) = channels[0].rx_mut()
        {
            let local = self.input.sample(0).to_word();
            if let Err(err) = reply::write_controller(rx, local) {
                trace!(error = %err, "local reply not written");
            }
        }

        if let Some(poll) = self.poll_cb.lock().as_mut() {
            poll(&mut channels);
        }

        channels[..self.ports]
            .iter()
            .map(|channel| {
                channel
                    .rx()
                    .and_then(|rx| reply::read_controller(rx).ok())
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Port 0 is the local pad; the others have nothing plugged in locally.
    fn channels(&self, command: JoybusCommand) -> JoybusChannels {
        let rx_len = match command {
            JoybusCommand::Status | JoybusCommand::Reset => STATUS_REPLY_LEN,
            JoybusCommand::PakRead => PAK_READ_REPLY_LEN,
            JoybusCommand::PakWrite => PAK_WRITE_REPLY_LEN,
            _ => CONTROLLER_REPLY_LEN,
        };
        let mut channels = idle_channels();
        for (port, channel) in channels.iter_mut().take(self.ports).enumerate() {
            let request = JoybusChannel::request(command, rx_len);
            *channel = if port == 0 {
                request
            } else {
                request.with_status(RxStatus::DEVICE_ABSENT.bits())
            };
        }
        channels
    }

    fn wait_while_paused(&self) {
        while self.paused.load(Ordering::Acquire) && !self.stop.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

impl Engine for ScriptedEngine {
    fn execute(&self) -> Result<(), EngineError> {
        self.stop.store(false, Ordering::Release);
        self.observed.lock().clear();
        info!(frames = self.frames, ports = self.ports, "scripted run started");

        let mut frame = 0;
        while frame < self.frames {
            self.wait_while_paused();
            if self.stop.load(Ordering::Acquire) {
                debug!(frame, "stop requested");
                break;
            }
            if self.reset.swap(false, Ordering::AcqRel) {
                frame = 0;
                self.observed.lock().clear();
            }
            let words = self.run_frame(frame);
            self.observed.lock().push(words);
            frame += 1;
        }
        Ok(())
    }

    fn command(&self, command: EngineCommand) -> Result<(), EngineError> {
        debug!(%command, "scripted engine command");
        match command {
            EngineCommand::Stop => self.stop.store(true, Ordering::Release),
            EngineCommand::Pause => self.paused.store(true, Ordering::Release),
            EngineCommand::Resume => self.paused.store(false, Ordering::Release),
            EngineCommand::Reset { .. } => self.reset.store(true, Ordering::Release),
        }
        Ok(())
    }

    fn set_frame_callback(&self, callback: FrameCallback) {
        *self.frame_cb.lock() = Some(callback);
    }

    fn open_pif(&self, image: &[u8]) -> Result<(), EngineError> {
        if image.is_empty() {
            return Err(EngineError::Rejected("empty PIF image".into()));
        }
        self.pif_loaded.store(true, Ordering::Release);
        Ok(())
    }

    fn poll_hook(&self) -> Option<&dyn PollHook> {
        Some(self)
    }
}

impl PollHook for ScriptedEngine {
    fn set_poll_callback(&self, callback: PollCallback) {
        *self.poll_cb.lock() = Some(callback);
    }
}

/// Local pad that changes on every sample.
pub struct ScriptedPad {
    rng: Mutex<StdRng>,
}

impl ScriptedPad {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl LocalInputSource for ScriptedPad {
    fn sample(&self, _control: usize) -> pifsync_joybus::ControllerSample {
        let mut rng = self.rng.lock();
        pifsync_joybus::ControllerSample {
            buttons: pifsync_joybus::N64Buttons::from_bits_truncate(rng.random()),
            x: rng.random_range(-80..=80),
            y: rng.random_range(-80..=80),
        }
    }
}

#[cfg(test)]
mod tests {
    use pifsync_joybus::ControllerSample;

    use super::*;

    fn fixed_pad(word: u32) -> Arc<dyn LocalInputSource> {
        Arc::new(move |_control: usize| ControllerSample::from_word(word))
    }

    #[test]
    fn without_callbacks_local_input_passes_through() {
        let sample = ControllerSample::from_word(0x8000_1020);
        let engine = ScriptedEngine::new(5, 3, 2, 7, fixed_pad(sample.to_word()));
        engine.execute().expect("run");

        let observed = engine.observed();
        assert_eq!(observed.len(), 5);
        for words in observed {
            assert_eq!(words, vec![sample.to_word(), 0]);
        }
    }

    #[test]
    fn stop_ends_the_run_early() {
        let engine = ScriptedEngine::new(1_000, 1, 1, 1, fixed_pad(0));
        engine.command(EngineCommand::Stop).expect("stop");
        // A stale stop from a previous run is cleared by execute.
        engine.execute().expect("run");
        assert_eq!(engine.observed().len(), 1_000);

        let engine = Arc::new(engine);
        engine.command(EngineCommand::Pause).expect("pause");
        let runner = {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.execute())
        };
        thread::sleep(Duration::from_millis(10));
        engine.command(EngineCommand::Stop).expect("stop");
        runner.join().expect("runner").expect("run");
        assert!(engine.observed().is_empty());
    }

    #[test]
    fn scripted_pad_is_seeded() {
        let a = ScriptedPad::new(42);
        let b = ScriptedPad::new(42);
        for _ in 0..8 {
            assert_eq!(a.sample(0), b.sample(0));
        }
    }

    #[test]
    fn empty_pif_image_is_rejected() {
        let engine = ScriptedEngine::new(1, 1, 1, 1, fixed_pad(0));
        assert!(engine.open_pif(&[]).is_err());
        engine.open_pif(&[0; 16]).expect("image accepted");
        assert!(engine.pif_loaded());
    }
}
