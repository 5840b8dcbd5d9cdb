//! Local controller input for netplay sessions.
//!
//! - [`adapter`]: GameCube adapter report layout and per-port state
//! - [`mapping`]: translation of adapter state into an N64 controller sample
//! - [`poller`]: background thread reading adapter reports
//! - [`input`]: the [`LocalInputSource`] seam consumed by engines

pub mod adapter;
pub mod error;
pub mod input;
pub mod mapping;
pub mod poller;

pub use adapter::{GcButtons, PORT_COUNT, PortState, REPORT_LEN, parse_report};
pub use error::SupportError;
pub use input::{GcAdapterInput, LocalInputSource};
pub use mapping::{ButtonMapping, GcInput, MappingProfile, N64_AXIS_PEAK, scale_axis};
pub use poller::{AdapterPoller, AdapterTransport};
