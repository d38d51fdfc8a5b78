//! Board-agnostic core logic for the character LCD backpack
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (text controller, backlight, contrast)
//! - Display geometry and cursor tracking across one or two controllers
//! - Display session owning the controller registers
//! - Persisted settings mirror and safe-mode brightness limiting
//! - Bus command dispatcher

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod display;
pub mod dispatch;
pub mod safety;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;
