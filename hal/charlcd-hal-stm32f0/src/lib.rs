//! STM32F0-specific HAL for the charlcd firmware
//!
//! This crate provides STM32F0 implementations of the `charlcd-hal`
//! traits. It supports:
//!
//! - STM32F042F6 (TSSOP20 backpack)
//! - STM32F042K6 (LQFP32 backpack with RGB backlight)
//!
//! # Features
//!
//! - `stm32f042f6` / `stm32f042k6` - Chip selection
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! The I2C peripheral itself is driven by the firmware with embassy-stm32
//! directly; this crate provides the byte queues between that task and the
//! command dispatcher.

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod i2c;

// Re-export shared types from charlcd-hal
pub use charlcd_hal::flash::StorageKey;
