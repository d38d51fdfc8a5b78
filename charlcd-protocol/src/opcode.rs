//! Opcode table
//!
//! Every opcode the backpack understands, with the number of operand bytes
//! it consumes and the number of reply bytes it produces. The arity lookups
//! are exhaustive matches, so adding an opcode without declaring its shape
//! does not compile.

/// Largest operand count of any opcode (glyph slot + 8 pattern rows)
pub const MAX_OPERANDS: usize = 9;

/// Largest reply of any opcode (three brightness channels)
pub const MAX_REPLY: usize = 3;

/// First byte value treated as an opcode rather than a character
pub const OPCODE_BASE: u8 = 0x80;

/// Protocol opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Opcode {
    /// Set and persist primary brightness
    SaveBrightness = 0x80,
    /// Persist and apply a new bus address
    SetSlaveAddress = 0x81,
    /// Clear the display
    Clear = 0x82,
    /// Move the cursor to a column of the first row
    SetColumn = 0x89,
    /// Reply with the firmware revision
    FirmwareRevision = 0x8A,
    /// Reply with the fixed column count constant
    ColumnCount = 0x8B,
    /// Cursor home
    Home = 0x91,
    /// Move the cursor to (column, row)
    GotoXy = 0x92,
    DisplayOff = 0x93,
    DisplayOn = 0x94,
    CursorOff = 0x95,
    CursorOn = 0x96,
    BlinkOff = 0x97,
    BlinkOn = 0x98,
    ScrollLeft = 0x99,
    ScrollRight = 0x9A,
    EntryLeftToRight = 0x9B,
    EntryRightToLeft = 0x9C,
    AutoscrollOn = 0x9D,
    AutoscrollOff = 0x9E,
    /// Define a custom glyph (slot + 8 pattern rows)
    DefineGlyph = 0x9F,
    /// Cursor home (LCD command set alias)
    HomeAlt = 0xA0,
    /// Move the cursor (LCD command set alias)
    GotoXyAlt = 0xA1,
    /// Print a character
    PutChar = 0xA2,
    /// Raw controller instruction
    RawCommand = 0xA3,
    /// Print a character (LCD command set alias)
    WriteChar = 0xA4,
    /// Raw controller data write
    RawData = 0xA5,
    /// Set and persist contrast
    SaveContrast = 0xD0,
    /// Set contrast without persisting
    SetContrast = 0xD1,
    /// Reply with the applied contrast
    GetContrast = 0xD2,
    /// Set primary brightness without persisting
    SetBrightness = 0xD3,
    /// Reply with the applied primary brightness
    GetBrightness = 0xD4,
    /// Set and persist all three brightness channels
    SaveRgb = 0xD5,
    /// Set all three brightness channels without persisting
    SetRgb = 0xD6,
    /// Reply with the three applied brightness channels
    GetRgb = 0xD7,
    /// Enter or exit safe-mode (magic operand pair)
    SafeMode = 0xF0,
    /// Enable or disable line wrapping
    LineWrap = 0xFB,
    /// Select the extended four-line controller command set
    ControllerVariant = 0xFC,
    /// Reconfigure the geometry (columns, rows)
    Configure = 0xFD,
    /// Reset to a known state
    Reset = 0xFE,
    /// Bus flush, does nothing
    Flush = 0xFF,
}

impl Opcode {
    /// Look up an opcode from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        use Opcode::*;

        let op = match byte {
            0x80 => SaveBrightness,
            0x81 => SetSlaveAddress,
            0x82 => Clear,
            0x89 => SetColumn,
            0x8A => FirmwareRevision,
            0x8B => ColumnCount,
            0x91 => Home,
            0x92 => GotoXy,
            0x93 => DisplayOff,
            0x94 => DisplayOn,
            0x95 => CursorOff,
            0x96 => CursorOn,
            0x97 => BlinkOff,
            0x98 => BlinkOn,
            0x99 => ScrollLeft,
            0x9A => ScrollRight,
            0x9B => EntryLeftToRight,
            0x9C => EntryRightToLeft,
            0x9D => AutoscrollOn,
            0x9E => AutoscrollOff,
            0x9F => DefineGlyph,
            0xA0 => HomeAlt,
            0xA1 => GotoXyAlt,
            0xA2 => PutChar,
            0xA3 => RawCommand,
            0xA4 => WriteChar,
            0xA5 => RawData,
            0xD0 => SaveContrast,
            0xD1 => SetContrast,
            0xD2 => GetContrast,
            0xD3 => SetBrightness,
            0xD4 => GetBrightness,
            0xD5 => SaveRgb,
            0xD6 => SetRgb,
            0xD7 => GetRgb,
            0xF0 => SafeMode,
            0xFB => LineWrap,
            0xFC => ControllerVariant,
            0xFD => Configure,
            0xFE => Reset,
            0xFF => Flush,
            _ => return None,
        };
        Some(op)
    }

    /// Wire byte of this opcode
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Number of operand bytes that follow the opcode
    pub const fn operand_count(self) -> usize {
        use Opcode::*;

        match self {
            Clear | FirmwareRevision | ColumnCount | Home | HomeAlt | DisplayOff | DisplayOn
            | CursorOff | CursorOn | BlinkOff | BlinkOn | ScrollLeft | ScrollRight
            | EntryLeftToRight | EntryRightToLeft | AutoscrollOn | AutoscrollOff | GetContrast
            | GetBrightness | GetRgb | Reset | Flush => 0,
            SaveBrightness | SetSlaveAddress | SetColumn | PutChar | RawCommand | WriteChar
            | RawData | SaveContrast | SetContrast | SetBrightness | LineWrap
            | ControllerVariant => 1,
            GotoXy | GotoXyAlt | SafeMode | Configure => 2,
            SaveRgb | SetRgb => 3,
            DefineGlyph => MAX_OPERANDS,
        }
    }

    /// Number of reply bytes produced after the command runs
    pub const fn reply_len(self) -> usize {
        use Opcode::*;

        match self {
            FirmwareRevision | ColumnCount | GetContrast | GetBrightness => 1,
            GetRgb => MAX_REPLY,
            _ => 0,
        }
    }

    /// Check whether this opcode answers with reply bytes
    pub const fn is_query(self) -> bool {
        self.reply_len() > 0
    }
}

/// Classification of one incoming byte in command position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decoded {
    /// A table opcode; its operands follow
    Opcode(Opcode),
    /// A character to print (already mapped for raw digit values)
    Text(u8),
    /// Reserved opcode or carriage return; nothing else is consumed
    Ignored,
}

/// Classify a byte received in command position
///
/// Raw values `0..=9` are printed as the ASCII digits `'0'..='9'`, so a
/// master can send numbers without converting them.
pub fn decode(byte: u8) -> Decoded {
    if byte >= OPCODE_BASE {
        return match Opcode::from_byte(byte) {
            Some(op) => Decoded::Opcode(op),
            None => Decoded::Ignored,
        };
    }

    match byte {
        b'\r' => Decoded::Ignored,
        0..=9 => Decoded::Text(b'0' + byte),
        _ => Decoded::Text(byte),
    }
}
