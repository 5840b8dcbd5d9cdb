//! Joybus / PIF protocol primitives.
//!
//! The simulated console polls controller-like devices through a fixed set of
//! six channels. Each poll carries a command byte in the transmit frame and an
//! optional receive buffer the device fills in. This crate models that
//! traffic with typed accessors instead of raw pointer arithmetic.
//!
//! - [`constants`]: wire constants that must match the hardware bit-for-bit
//! - [`command`]: the Joybus command set
//! - [`channel`]: a tagged view of one channel's transmit/status/receive state
//! - [`reply`]: encoders for synthetic device replies
//! - [`sample`]: the 4-byte standard controller response

pub mod channel;
pub mod command;
pub mod constants;
pub mod error;
pub mod reply;
pub mod sample;

pub use channel::{JoybusChannel, JoybusChannels, RxStatus, idle_channels};
pub use command::JoybusCommand;
pub use error::JoybusError;
pub use sample::{ControllerSample, N64Buttons};
