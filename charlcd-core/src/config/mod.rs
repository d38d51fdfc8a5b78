//! Configuration types
//!
//! Display geometry set over the bus and the settings mirrored in flash.

pub mod settings;
pub mod types;

pub use settings::*;
pub use types::*;
