//! charlcd Bus Protocol
//!
//! This crate defines the byte-command protocol a bus master uses to drive
//! the character LCD backpack. There is no framing: every command is a
//! single opcode byte followed by a fixed number of operand bytes, and a few
//! query opcodes answer with a fixed number of reply bytes.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌────────┬──────────────────┐      ┌──────────────────┐
//! │ OPCODE │ OPERANDS         │  ->  │ REPLY (queries)  │
//! │ 1B     │ 0–9B (per table) │      │ 0–3B (per table) │
//! └────────┴──────────────────┘      └──────────────────┘
//! ```
//!
//! Bytes below `0x80` are not opcodes at all: they are characters to print
//! at the cursor, which lets a master send plain text without any prefix.
//! Opcodes above `0x80` that are not in the table are reserved and ignored.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod opcode;

pub use command::{Command, ProtocolError, ScrollDirection, TextDirection};
pub use opcode::{decode, Decoded, Opcode, MAX_OPERANDS, MAX_REPLY};

/// Firmware revision reported by [`Opcode::FirmwareRevision`]
pub const FIRMWARE_REVISION: u8 = 2;

/// Value reported by [`Opcode::ColumnCount`]
///
/// Kept for compatibility with masters written for the 7-segment variant of
/// the backpack; it does not follow the configured geometry.
pub const COLUMN_COUNT_REPLY: u8 = 16;

/// Operand pair that turns safe-mode on
pub const SAFE_MODE_ENTER: [u8; 2] = [0x5A, 0xA5];

/// Operand pair that turns safe-mode off
pub const SAFE_MODE_EXIT: [u8; 2] = [0xA5, 0x5A];

/// Two-cell copyright sign, left half then right half
///
/// Send each half with [`Command::DefineGlyph`] to put it in CGRAM.
pub const COPYRIGHT_GLYPHS: [[u8; 8]; 2] = [
    [0x07, 0x08, 0x13, 0x14, 0x14, 0x13, 0x08, 0x07],
    [0x00, 0x10, 0x08, 0x08, 0x08, 0x08, 0x10, 0x00],
];
