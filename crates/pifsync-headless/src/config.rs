use crate::error::HeadlessError;

/// Highest player count the console has controller ports for.
pub const MAX_PLAYERS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoakConfig {
    pub players: usize,
    pub frames: u32,
    /// Upper bound of controller polls per frame; at least one is a
    /// controller read.
    pub polls_per_frame: u32,
    pub seed: u64,
}

impl Default for SoakConfig {
    fn default() -> Self {
        Self {
            players: 2,
            frames: 600,
            polls_per_frame: 4,
            seed: 0x5EED,
        }
    }
}

impl SoakConfig {
    pub fn validate(&self) -> Result<(), HeadlessError> {
        if !(1..=MAX_PLAYERS).contains(&self.players) {
            return Err(HeadlessError::InvalidConfig(format!(
                "players must be between 1 and {MAX_PLAYERS}, got {}",
                self.players
            )));
        }
        if self.frames == 0 {
            return Err(HeadlessError::InvalidConfig("frames must be positive".into()));
        }
        if self.polls_per_frame == 0 {
            return Err(HeadlessError::InvalidConfig(
                "polls per frame must be positive".into(),
            ));
        }
        Ok(())
    }
}
