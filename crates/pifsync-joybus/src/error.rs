use thiserror::Error;

use crate::command::JoybusCommand;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoybusError {
    #[error("{command} reply needs {needed} bytes, receive buffer has {actual}")]
    ReplyTooShort {
        command: JoybusCommand,
        needed: usize,
        actual: usize,
    },
}
