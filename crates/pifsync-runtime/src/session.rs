mod controller;
mod state;
mod types;

pub use controller::SessionController;
pub use state::SessionState;
pub use types::{SessionError, StartRequest};
