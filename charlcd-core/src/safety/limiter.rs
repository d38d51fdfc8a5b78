//! Safe-mode brightness limiter
//!
//! Safe-mode keeps a backlight (or a boost converter behind it) from being
//! driven hard by a misbehaving master. While active, every brightness
//! write is capped at [`SAFE_MODE_CEILING`].

use charlcd_protocol::{SAFE_MODE_ENTER, SAFE_MODE_EXIT};

use crate::traits::CHANNELS;

/// Highest brightness level applied while safe-mode is active
pub const SAFE_MODE_CEILING: u8 = 0x40;

/// Safe-mode transition requested over the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafeModeRequest {
    Enter,
    Exit,
}

impl SafeModeRequest {
    /// Match an operand pair against the magic values
    pub fn from_pair(pair: [u8; 2]) -> Option<Self> {
        if pair == SAFE_MODE_ENTER {
            Some(SafeModeRequest::Enter)
        } else if pair == SAFE_MODE_EXIT {
            Some(SafeModeRequest::Exit)
        } else {
            None
        }
    }
}

/// Brightness limiter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BrightnessLimiter {
    active: bool,
}

impl BrightnessLimiter {
    /// Create a limiter in the given state
    pub fn new(active: bool) -> Self {
        Self { active }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Apply a bus request
    ///
    /// Returns `true` when the state changed.
    pub fn request(&mut self, request: SafeModeRequest) -> bool {
        let active = request == SafeModeRequest::Enter;
        let changed = self.active != active;
        self.active = active;
        changed
    }

    /// Level to apply for a requested level
    pub fn limit(&self, level: u8) -> u8 {
        if self.active {
            level.min(SAFE_MODE_CEILING)
        } else {
            level
        }
    }

    /// Per-channel [`limit`](Self::limit)
    pub fn limit_all(&self, levels: [u8; CHANNELS]) -> [u8; CHANNELS] {
        levels.map(|level| self.limit(level))
    }
}
