//! Text controller drivers
//!
//! HD44780-compatible controllers (including KS0073) in 4-bit mode. Two
//! controllers may share RS, RW and the data lines, each with its own
//! enable line.

pub mod hd44780;

pub use hd44780::{Hd44780, Hd44780Bus};
