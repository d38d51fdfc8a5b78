//! Contrast potentiometer drivers
//!
//! Both parts are up/down digital potentiometers without a readable wiper.
//! Setting a level drives the wiper to zero and then counts up.

pub mod max5160;
pub mod mcp4013;

pub use max5160::Max5160;
pub use mcp4013::Mcp4013;
