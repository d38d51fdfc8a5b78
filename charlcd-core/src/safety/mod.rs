//! Safety limiting
//!
//! Caps backlight output while safe-mode is active.

pub mod limiter;

pub use limiter::*;
