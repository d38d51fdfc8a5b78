//! charlcd Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that are implemented
//! by chip-specific HALs (STM32F0 today). The display logic in
//! `charlcd-core` and the drivers in `charlcd-drivers` only ever talk to
//! these traits, which keeps them testable on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (charlcd-firmware)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  charlcd-core / charlcd-drivers         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  charlcd-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌─────────────────┐
//!            │ charlcd-hal-    │
//!            │    stm32f0      │
//!            └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`], [`gpio::FlexPin`] - Digital I/O
//! - [`i2c::I2cSlave`] - Byte-oriented bus slave transport
//! - [`flash::FlashStorage`] - Persistent settings storage

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod i2c;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use gpio::{FlexPin, InputPin, OutputPin};
pub use i2c::{I2cSlave, DEFAULT_SLAVE_ADDRESS};
