//! Typed commands
//!
//! A [`Command`] is an opcode together with its decoded operands. The
//! firmware builds one from the operand bytes it pulled off the bus; a bus
//! master builds one and encodes it.

use heapless::Vec;

use crate::opcode::{Opcode, MAX_OPERANDS};

/// Largest encoded command (opcode + operands)
pub const MAX_COMMAND_LEN: usize = 1 + MAX_OPERANDS;

/// Errors that can occur while building or encoding commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Operand slice length does not match the opcode's arity
    OperandCount,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Display shift direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollDirection {
    Left,
    Right,
}

/// Cursor advance direction after each character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

/// A decoded protocol command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Set and persist primary brightness
    SaveBrightness(u8),
    /// Persist and apply a bus address (ignored when not 7-bit)
    SetSlaveAddress(u8),
    Clear,
    /// Cursor to column of row 0
    SetColumn(u8),
    FirmwareRevision,
    ColumnCount,
    Home,
    GotoXy { col: u8, row: u8 },
    Display(bool),
    Cursor(bool),
    Blink(bool),
    Scroll(ScrollDirection),
    EntryDirection(TextDirection),
    Autoscroll(bool),
    DefineGlyph { slot: u8, pattern: [u8; 8] },
    WriteChar(u8),
    RawCommand(u8),
    RawData(u8),
    SaveContrast(u8),
    SetContrast(u8),
    GetContrast,
    SetBrightness(u8),
    GetBrightness,
    SaveRgb([u8; 3]),
    SetRgb([u8; 3]),
    GetRgb,
    /// Safe-mode request; only [`crate::SAFE_MODE_ENTER`] and
    /// [`crate::SAFE_MODE_EXIT`] have an effect
    SafeMode([u8; 2]),
    LineWrap(bool),
    /// Extended four-line controller command set on/off
    ControllerVariant(bool),
    Configure { columns: u8, rows: u8 },
    Reset,
    Flush,
}

impl Command {
    /// Build a command from an opcode and exactly its operand bytes
    pub fn from_operands(op: Opcode, operands: &[u8]) -> Result<Self, ProtocolError> {
        use Opcode as O;

        if operands.len() != op.operand_count() {
            return Err(ProtocolError::OperandCount);
        }
        let b = |i: usize| operands[i];

        let cmd = match op {
            O::SaveBrightness => Command::SaveBrightness(b(0)),
            O::SetSlaveAddress => Command::SetSlaveAddress(b(0)),
            O::Clear => Command::Clear,
            O::SetColumn => Command::SetColumn(b(0)),
            O::FirmwareRevision => Command::FirmwareRevision,
            O::ColumnCount => Command::ColumnCount,
            O::Home | O::HomeAlt => Command::Home,
            O::GotoXy | O::GotoXyAlt => Command::GotoXy {
                col: b(0),
                row: b(1),
            },
            O::DisplayOff => Command::Display(false),
            O::DisplayOn => Command::Display(true),
            O::CursorOff => Command::Cursor(false),
            O::CursorOn => Command::Cursor(true),
            O::BlinkOff => Command::Blink(false),
            O::BlinkOn => Command::Blink(true),
            O::ScrollLeft => Command::Scroll(ScrollDirection::Left),
            O::ScrollRight => Command::Scroll(ScrollDirection::Right),
            O::EntryLeftToRight => Command::EntryDirection(TextDirection::LeftToRight),
            O::EntryRightToLeft => Command::EntryDirection(TextDirection::RightToLeft),
            O::AutoscrollOn => Command::Autoscroll(true),
            O::AutoscrollOff => Command::Autoscroll(false),
            O::DefineGlyph => {
                let mut pattern = [0u8; 8];
                pattern.copy_from_slice(&operands[1..]);
                Command::DefineGlyph {
                    // Only 8 CGRAM slots exist
                    slot: b(0) & 0x07,
                    pattern,
                }
            }
            O::PutChar | O::WriteChar => Command::WriteChar(b(0)),
            O::RawCommand => Command::RawCommand(b(0)),
            O::RawData => Command::RawData(b(0)),
            O::SaveContrast => Command::SaveContrast(b(0)),
            O::SetContrast => Command::SetContrast(b(0)),
            O::GetContrast => Command::GetContrast,
            O::SetBrightness => Command::SetBrightness(b(0)),
            O::GetBrightness => Command::GetBrightness,
            O::SaveRgb => Command::SaveRgb([b(0), b(1), b(2)]),
            O::SetRgb => Command::SetRgb([b(0), b(1), b(2)]),
            O::GetRgb => Command::GetRgb,
            O::SafeMode => Command::SafeMode([b(0), b(1)]),
            O::LineWrap => Command::LineWrap(b(0) != 0),
            O::ControllerVariant => Command::ControllerVariant(b(0) != 0),
            O::Configure => Command::Configure {
                columns: b(0),
                rows: b(1),
            },
            O::Reset => Command::Reset,
            O::Flush => Command::Flush,
        };
        Ok(cmd)
    }

    /// Opcode used when encoding this command
    ///
    /// Aliased opcodes encode as their first table entry.
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::SaveBrightness(_) => Opcode::SaveBrightness,
            Command::SetSlaveAddress(_) => Opcode::SetSlaveAddress,
            Command::Clear => Opcode::Clear,
            Command::SetColumn(_) => Opcode::SetColumn,
            Command::FirmwareRevision => Opcode::FirmwareRevision,
            Command::ColumnCount => Opcode::ColumnCount,
            Command::Home => Opcode::Home,
            Command::GotoXy { .. } => Opcode::GotoXy,
            Command::Display(true) => Opcode::DisplayOn,
            Command::Display(false) => Opcode::DisplayOff,
            Command::Cursor(true) => Opcode::CursorOn,
            Command::Cursor(false) => Opcode::CursorOff,
            Command::Blink(true) => Opcode::BlinkOn,
            Command::Blink(false) => Opcode::BlinkOff,
            Command::Scroll(ScrollDirection::Left) => Opcode::ScrollLeft,
            Command::Scroll(ScrollDirection::Right) => Opcode::ScrollRight,
            Command::EntryDirection(TextDirection::LeftToRight) => Opcode::EntryLeftToRight,
            Command::EntryDirection(TextDirection::RightToLeft) => Opcode::EntryRightToLeft,
            Command::Autoscroll(true) => Opcode::AutoscrollOn,
            Command::Autoscroll(false) => Opcode::AutoscrollOff,
            Command::DefineGlyph { .. } => Opcode::DefineGlyph,
            Command::WriteChar(_) => Opcode::WriteChar,
            Command::RawCommand(_) => Opcode::RawCommand,
            Command::RawData(_) => Opcode::RawData,
            Command::SaveContrast(_) => Opcode::SaveContrast,
            Command::SetContrast(_) => Opcode::SetContrast,
            Command::GetContrast => Opcode::GetContrast,
            Command::SetBrightness(_) => Opcode::SetBrightness,
            Command::GetBrightness => Opcode::GetBrightness,
            Command::SaveRgb(_) => Opcode::SaveRgb,
            Command::SetRgb(_) => Opcode::SetRgb,
            Command::GetRgb => Opcode::GetRgb,
            Command::SafeMode(_) => Opcode::SafeMode,
            Command::LineWrap(_) => Opcode::LineWrap,
            Command::ControllerVariant(_) => Opcode::ControllerVariant,
            Command::Configure { .. } => Opcode::Configure,
            Command::Reset => Opcode::Reset,
            Command::Flush => Opcode::Flush,
        }
    }

    /// Encode this command into a byte buffer
    ///
    /// Returns the number of bytes written.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, ProtocolError> {
        let mut out = Vec::<u8, MAX_COMMAND_LEN>::new();
        // Capacity covers the largest command, pushes cannot fail
        let _ = out.push(self.opcode().to_byte());

        let mut extend = |bytes: &[u8]| {
            let _ = out.extend_from_slice(bytes);
        };
        match self {
            Command::SaveBrightness(v)
            | Command::SetSlaveAddress(v)
            | Command::SetColumn(v)
            | Command::WriteChar(v)
            | Command::RawCommand(v)
            | Command::RawData(v)
            | Command::SaveContrast(v)
            | Command::SetContrast(v)
            | Command::SetBrightness(v) => extend(&[*v]),
            Command::GotoXy { col, row } => extend(&[*col, *row]),
            Command::DefineGlyph { slot, pattern } => {
                extend(&[*slot & 0x07]);
                extend(pattern);
            }
            Command::SaveRgb(rgb) | Command::SetRgb(rgb) => extend(rgb),
            Command::SafeMode(pair) => extend(pair),
            Command::LineWrap(on) | Command::ControllerVariant(on) => extend(&[*on as u8]),
            Command::Configure { columns, rows } => extend(&[*columns, *rows]),
            _ => {}
        }

        if buffer.len() < out.len() {
            return Err(ProtocolError::BufferTooSmall);
        }
        buffer[..out.len()].copy_from_slice(&out);
        Ok(out.len())
    }
}

/// Number of flush opcodes a master sends before resetting the display
pub const INIT_FLUSH_COUNT: usize = 4;

/// Length of the master-side initialisation sequence
pub const INIT_SEQUENCE_LEN: usize = INIT_FLUSH_COUNT + 1 + 3;

/// Master-side initialisation sequence
///
/// Flushes any half-received command out of the slave (each `0xFF` is a
/// complete no-op command, so a pending operand read swallows at most a few
/// of them), resets to a known state and configures the geometry.
pub fn init_sequence(columns: u8, rows: u8) -> Vec<u8, INIT_SEQUENCE_LEN> {
    let mut seq = Vec::new();
    for _ in 0..INIT_FLUSH_COUNT {
        let _ = seq.push(Opcode::Flush.to_byte());
    }
    let _ = seq.push(Opcode::Reset.to_byte());
    let _ = seq.extend_from_slice(&[Opcode::Configure.to_byte(), columns, rows]);
    seq
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::{decode, Decoded};

    fn parse(bytes: &[u8]) -> Command {
        match decode(bytes[0]) {
            Decoded::Opcode(op) => Command::from_operands(op, &bytes[1..]).unwrap(),
            other => panic!("not an opcode: {:?}", other),
        }
    }

    #[test]
    fn test_operand_count_mismatch() {
        assert_eq!(
            Command::from_operands(Opcode::GotoXy, &[1]),
            Err(ProtocolError::OperandCount)
        );
        assert_eq!(
            Command::from_operands(Opcode::Clear, &[0]),
            Err(ProtocolError::OperandCount)
        );
    }

    #[test]
    fn test_aliases_decode_to_same_command() {
        assert_eq!(parse(&[0x91]), Command::Home);
        assert_eq!(parse(&[0xA0]), Command::Home);
        assert_eq!(parse(&[0x92, 3, 1]), Command::GotoXy { col: 3, row: 1 });
        assert_eq!(parse(&[0xA1, 3, 1]), Command::GotoXy { col: 3, row: 1 });
        assert_eq!(parse(&[0xA2, b'x']), Command::WriteChar(b'x'));
        assert_eq!(parse(&[0xA4, b'x']), Command::WriteChar(b'x'));
    }

    #[test]
    fn test_glyph_slot_masked() {
        let cmd = parse(&[0x9F, 0x0B, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(
            cmd,
            Command::DefineGlyph {
                slot: 3,
                pattern: [1, 2, 3, 4, 5, 6, 7, 8],
            }
        );
    }

    #[test]
    fn test_safe_mode_pair_passed_through() {
        assert_eq!(
            parse(&[0xF0, 0x5A, 0xA5]),
            Command::SafeMode(crate::SAFE_MODE_ENTER)
        );
        assert_eq!(parse(&[0xF0, 0x5A, 0x5A]), Command::SafeMode([0x5A, 0x5A]));
    }

    #[test]
    fn test_bool_operands() {
        assert_eq!(parse(&[0xFB, 0]), Command::LineWrap(false));
        assert_eq!(parse(&[0xFB, 7]), Command::LineWrap(true));
        assert_eq!(parse(&[0xFC, 1]), Command::ControllerVariant(true));
    }

    #[test]
    fn test_encode_configure() {
        let mut buf = [0u8; 4];
        let len = Command::Configure {
            columns: 40,
            rows: 4,
        }
        .encode(&mut buf)
        .unwrap();
        assert_eq!(&buf[..len], &[0xFD, 40, 4]);
    }

    #[test]
    fn test_encode_glyph_decodes_back() {
        let original = Command::DefineGlyph {
            slot: 5,
            pattern: [0x07, 0x08, 0x13, 0x14, 0x14, 0x13, 0x08, 0x07],
        };
        let mut buf = [0u8; MAX_COMMAND_LEN];
        let len = original.encode(&mut buf).unwrap();
        assert_eq!(len, 10);
        assert_eq!(parse(&buf[..len]), original);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut buf = [0u8; 2];
        assert_eq!(
            Command::SaveRgb([1, 2, 3]).encode(&mut buf),
            Err(ProtocolError::BufferTooSmall)
        );
    }

    #[test]
    fn test_init_sequence() {
        let seq = init_sequence(20, 4);
        assert_eq!(seq.as_slice(), &[0xFF, 0xFF, 0xFF, 0xFF, 0xFE, 0xFD, 20, 4]);
    }
}
