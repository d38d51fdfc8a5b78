//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in charlcd-core:
//!
//! - HD44780 controllers on a shared 4-bit bus with busy-flag readback
//! - Contrast potentiometers (MCP4013, MAX5160)
//! - PWM backlight (single colour or RGB)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod backlight;
pub mod contrast;
pub mod lcd;

#[cfg(test)]
pub(crate) mod mock;
