//! Hardware abstraction traits
//!
//! These traits define the interface between the display logic and the
//! concrete controller and backlight drivers.

pub mod controller;
pub mod output;

pub use controller::TextController;
pub use output::{BacklightOutput, ContrastOutput, CHANNELS};
