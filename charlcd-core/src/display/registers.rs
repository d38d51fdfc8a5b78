//! HD44780 instruction set
//!
//! Instruction bytes and the two control registers the session mirrors.
//! The controller registers are write-only, so the session keeps its own
//! copy and rewrites the whole register on every change.

use crate::config::ControllerVariant;

pub const CLEAR_DISPLAY: u8 = 0x01;
pub const RETURN_HOME: u8 = 0x02;

pub const ENTRY_MODE_SET: u8 = 0x04;
pub const ENTRY_LEFT: u8 = 0x02;
pub const ENTRY_SHIFT_INCREMENT: u8 = 0x01;

pub const DISPLAY_CONTROL: u8 = 0x08;
pub const DISPLAY_ON: u8 = 0x04;
pub const CURSOR_ON: u8 = 0x02;
pub const BLINK_ON: u8 = 0x01;

pub const SHIFT_DISPLAY_LEFT: u8 = 0x18;
pub const SHIFT_DISPLAY_RIGHT: u8 = 0x1C;

pub const FUNCTION_SET: u8 = 0x20;
pub const FUNCTION_TWO_LINES: u8 = 0x08;
/// KS0073 extended register select (RE)
pub const FUNCTION_EXTENDED_REGISTERS: u8 = 0x04;
pub const FUNCTION_4BIT_1LINE: u8 = FUNCTION_SET;
pub const FUNCTION_4BIT_2LINES: u8 = FUNCTION_SET | FUNCTION_TWO_LINES;

pub const SET_CGRAM: u8 = 0x40;
pub const SET_DDRAM: u8 = 0x80;

/// Busy flag in the status byte; the low 7 bits are the address counter
pub const BUSY_FLAG: u8 = 0x80;

/// KS0073 sequence switching the controller into four-line mode
pub const KS0073_FOUR_LINE_SEQUENCE: [u8; 3] = [
    0x24, // extended function register on (RE = 1)
    0x09, // four-line mode
    0x20, // extended function register off (RE = 0)
];

/// Display control at power-on: display on, cursor off, blink off
pub const DEFAULT_DISPLAY_CONTROL: u8 = DISPLAY_CONTROL | DISPLAY_ON;

/// Entry mode at power-on: left to right, no display shift
pub const DEFAULT_ENTRY_MODE: u8 = ENTRY_MODE_SET | ENTRY_LEFT;

/// Set DDRAM address instruction
pub const fn set_ddram(address: u8) -> u8 {
    SET_DDRAM | (address & 0x7F)
}

/// Set CGRAM address instruction for a glyph slot (0-7)
pub const fn set_cgram(slot: u8) -> u8 {
    SET_CGRAM | ((slot & 0x07) << 3)
}

/// Function-set instructions for a row count and controller variant
///
/// Four-line KS0073 panels need the extended register sequence instead of
/// a plain function set.
pub fn function_set(rows: u8, variant: ControllerVariant) -> &'static [u8] {
    match (rows, variant) {
        (4, ControllerVariant::ExtendedFourLine) => &KS0073_FOUR_LINE_SEQUENCE,
        (1, _) => &[FUNCTION_4BIT_1LINE],
        _ => &[FUNCTION_4BIT_2LINES],
    }
}

/// Set or clear `flag` in a register value
pub(crate) const fn with_flag(register: u8, flag: u8, on: bool) -> u8 {
    if on {
        register | flag
    } else {
        register & !flag
    }
}
