use std::fmt;

use pifsync_joybus::constants::MAX_PLAYERS;

use crate::error::NetplayError;

/// A participant number in `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerNumber(u8);

impl PlayerNumber {
    pub fn new(number: i64) -> Result<Self, NetplayError> {
        if (1..=MAX_PLAYERS as i64).contains(&number) {
            Ok(Self(number as u8))
        } else {
            Err(NetplayError::InvalidPlayer(number))
        }
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based slot, which is also the position in an exchange result.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl TryFrom<i32> for PlayerNumber {
    type Error = NetplayError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_one_through_eight() {
        for n in 1..=8 {
            let player = PlayerNumber::new(n).unwrap();
            assert_eq!(player.get() as i64, n);
            assert_eq!(player.index() as i64, n - 1);
        }
    }

    #[test]
    fn rejects_out_of_range() {
        for n in [0, 9, -1, i64::MIN, i64::MAX] {
            assert_eq!(PlayerNumber::new(n), Err(NetplayError::InvalidPlayer(n)));
        }
        assert!(PlayerNumber::try_from(-3i32).is_err());
    }
}
