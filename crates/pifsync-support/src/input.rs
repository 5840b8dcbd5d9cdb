//! Local input seam between controller backends and engines.

use std::time::Duration;

use pifsync_joybus::ControllerSample;
use tracing::info;

use crate::{
    adapter::PORT_COUNT,
    error::SupportError,
    mapping::MappingProfile,
    poller::{AdapterPoller, AdapterTransport},
};

/// Supplies the local controller state for an engine control slot.
pub trait LocalInputSource: Send + Sync {
    fn sample(&self, control: usize) -> ControllerSample;
}

impl<F> LocalInputSource for F
where
    F: Fn(usize) -> ControllerSample + Send + Sync,
{
    fn sample(&self, control: usize) -> ControllerSample {
        self(control)
    }
}

/// GameCube adapter input with connected ports packed onto the first
/// control slots, so the pad in adapter port 4 can still be player 1.
pub struct GcAdapterInput {
    poller: AdapterPoller,
    profile: MappingProfile,
    control_to_port: [Option<usize>; PORT_COUNT],
}

impl GcAdapterInput {
    pub fn start<T: AdapterTransport>(
        transport: T,
        profile: MappingProfile,
        timeout: Duration,
    ) -> Result<Self, SupportError> {
        let poller = AdapterPoller::spawn(transport)?;
        poller.wait_for_first_poll(timeout)?;
        Ok(Self::new(poller, profile))
    }

    /// Builds the control mapping from the poller's current snapshot.
    pub fn new(poller: AdapterPoller, profile: MappingProfile) -> Self {
        let mut input = Self {
            poller,
            profile,
            control_to_port: [None; PORT_COUNT],
        };
        input.remap();
        input
    }

    /// Reassigns control slots to the enabled ports that are connected now.
    pub fn remap(&mut self) {
        let ports = self.poller.snapshot();
        self.control_to_port = [None; PORT_COUNT];
        let connected = (0..PORT_COUNT)
            .filter(|&port| self.profile.ports_enabled[port] && ports[port].is_connected());
        for (slot, port) in self.control_to_port.iter_mut().zip(connected) {
            *slot = Some(port);
        }
        info!(mapping = ?self.control_to_port, "adapter ports mapped to controls");
    }

    pub fn control_port(&self, control: usize) -> Option<usize> {
        self.control_to_port.get(control).copied().flatten()
    }

    /// Which control slots have a pad behind them.
    pub fn present(&self) -> [bool; PORT_COUNT] {
        self.control_to_port.map(|port| port.is_some())
    }

    pub fn profile(&self) -> &MappingProfile {
        &self.profile
    }

    pub fn poller(&self) -> &AdapterPoller {
        &self.poller
    }
}

impl LocalInputSource for GcAdapterInput {
    fn sample(&self, control: usize) -> ControllerSample {
        self.control_port(control)
            .and_then(|port| self.poller.port(port))
            .map_or(ControllerSample::NEUTRAL, |state| self.profile.sample(&state))
    }
}
