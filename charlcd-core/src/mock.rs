//! Test doubles for the hardware traits

use core::future::Future;

use charlcd_hal::{FlashError, FlashStorage, I2cSlave, StorageKey};
use heapless::{Deque, Vec};

use crate::display::registers::{
    CLEAR_DISPLAY, ENTRY_LEFT, ENTRY_MODE_SET, FUNCTION_EXTENDED_REGISTERS, FUNCTION_SET,
    FUNCTION_TWO_LINES, RETURN_HOME, SET_CGRAM, SET_DDRAM,
};
use crate::traits::{BacklightOutput, ContrastOutput, TextController, CHANNELS};

/// Bus traffic seen by a [`MockController`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Command(u8),
    Data(u8),
}

/// Address counter layout selected by the last function set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// `0x00..=0x4F`, then back to `0x00`
    One,
    /// `0x00..=0x27` and `0x40..=0x67`, each line running into the other
    Two,
    /// KS0073 four-line mode, linear over the whole 7-bit range
    Four,
}

/// Controller model with DDRAM, CGRAM and an address counter
///
/// The counter follows the line mode like a real part: in two-line mode
/// `0x27` is followed by `0x40` and `0x67` by `0x00`.
pub struct MockController {
    pub ddram: [u8; 128],
    pub cgram: [u8; 64],
    pub address: u8,
    pub cg_address: u8,
    pub in_cgram: bool,
    pub increment: bool,
    pub mode: LineMode,
    extended_registers: bool,
    pub log: Vec<Op, 1024>,
}

impl MockController {
    pub fn new() -> Self {
        Self {
            ddram: [b' '; 128],
            cgram: [0; 64],
            address: 0,
            cg_address: 0,
            in_cgram: false,
            increment: true,
            mode: LineMode::One,
            extended_registers: false,
            log: Vec::new(),
        }
    }

    pub fn commands(&self) -> impl Iterator<Item = u8> + '_ {
        self.log.iter().filter_map(|op| match op {
            Op::Command(cmd) => Some(*cmd),
            Op::Data(_) => None,
        })
    }

    pub fn has_command(&self, cmd: u8) -> bool {
        self.commands().any(|c| c == cmd)
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Text currently in DDRAM starting at `address`
    pub fn text_at(&self, address: u8, len: usize) -> &[u8] {
        &self.ddram[address as usize..address as usize + len]
    }

    pub fn glyph(&self, slot: u8) -> &[u8] {
        let start = slot as usize * 8;
        &self.cgram[start..start + 8]
    }

    fn next_address(&self) -> u8 {
        match (self.mode, self.increment, self.address) {
            (LineMode::Two, true, 0x27) => 0x40,
            (LineMode::Two, true, 0x67) => 0x00,
            (LineMode::Two, false, 0x40) => 0x27,
            (LineMode::Two, false, 0x00) => 0x67,
            (LineMode::One, true, 0x4F) => 0x00,
            (LineMode::One, false, 0x00) => 0x4F,
            (_, true, address) => address.wrapping_add(1) & 0x7F,
            (_, false, address) => address.wrapping_sub(1) & 0x7F,
        }
    }
}

impl TextController for MockController {
    fn command(&mut self, cmd: u8) {
        self.log.push(Op::Command(cmd)).unwrap();
        if cmd & SET_DDRAM != 0 {
            self.address = cmd & 0x7F;
            self.in_cgram = false;
        } else if cmd & SET_CGRAM != 0 {
            self.cg_address = cmd & 0x3F;
            self.in_cgram = true;
        } else if cmd == CLEAR_DISPLAY {
            self.ddram = [b' '; 128];
            self.address = 0;
            self.in_cgram = false;
            self.increment = true;
        } else if cmd & !0x01 == RETURN_HOME {
            self.address = 0;
            self.in_cgram = false;
        } else if cmd & 0xFC == ENTRY_MODE_SET {
            self.increment = cmd & ENTRY_LEFT != 0;
        } else if cmd & 0xE0 == FUNCTION_SET {
            self.extended_registers = cmd & FUNCTION_EXTENDED_REGISTERS != 0;
            if !self.extended_registers {
                self.mode = match (self.mode, cmd & FUNCTION_TWO_LINES != 0) {
                    (LineMode::Four, _) if cmd == FUNCTION_SET => LineMode::Four,
                    (_, true) => LineMode::Two,
                    (_, false) => LineMode::One,
                };
            }
        } else if self.extended_registers && cmd & 0xF8 == 0x08 {
            // Extended function set: bit 0 selects four-line mode
            if cmd & 0x01 != 0 {
                self.mode = LineMode::Four;
            }
        }
    }

    fn data(&mut self, byte: u8) {
        self.log.push(Op::Data(byte)).unwrap();
        if self.in_cgram {
            self.cgram[self.cg_address as usize] = byte;
            self.cg_address = (self.cg_address + 1) & 0x3F;
        } else {
            self.ddram[self.address as usize] = byte;
            self.address = self.next_address();
        }
    }

    fn wait_busy(&mut self) -> u8 {
        if self.in_cgram {
            self.cg_address
        } else {
            self.address
        }
    }
}

/// In-memory settings store
pub struct MockStore {
    entries: [Option<Vec<u8, CHANNELS>>; 4],
    pub fail_writes: bool,
    pub writes: usize,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            entries: [None, None, None, None],
            fail_writes: false,
            writes: 0,
        }
    }

    pub fn put(&mut self, key: StorageKey, data: &[u8]) {
        self.entries[key.as_u8() as usize] = Some(Vec::from_slice(data).unwrap());
    }

    pub fn get(&self, key: StorageKey) -> Option<&[u8]> {
        self.entries[key.as_u8() as usize].as_deref()
    }
}

impl FlashStorage for MockStore {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let data = self.get(key).ok_or(FlashError::NotFound)?;
        if buffer.len() < data.len() {
            return Err(FlashError::BufferTooSmall);
        }
        buffer[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if self.fail_writes {
            return Err(FlashError::Flash);
        }
        self.writes += 1;
        self.put(key, data);
        Ok(())
    }
}

/// Scripted bus slave
pub struct MockTransport {
    pub rx: Deque<u8, 256>,
    pub tx: Vec<u8, 64>,
    pub flushes: usize,
    pub address: Option<u8>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            rx: Deque::new(),
            tx: Vec::new(),
            flushes: 0,
            address: None,
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.rx.push_back(byte).unwrap();
        }
    }
}

impl I2cSlave for MockTransport {
    fn receive(&mut self) -> impl Future<Output = u8> {
        let byte = self.rx.pop_front().expect("receive on drained transport");
        core::future::ready(byte)
    }

    fn transmit(&mut self, byte: u8) -> impl Future<Output = ()> {
        self.tx.push(byte).unwrap();
        core::future::ready(())
    }

    fn has_data(&self) -> bool {
        !self.rx.is_empty()
    }

    fn flush(&mut self) {
        self.rx.clear();
        self.tx.clear();
        self.flushes += 1;
    }

    fn set_address(&mut self, address: u8) {
        self.address = Some(address);
    }
}

/// Records the last applied backlight levels
#[derive(Default)]
pub struct MockBacklight {
    pub levels: Option<[u8; CHANNELS]>,
    pub applies: usize,
}

impl BacklightOutput for MockBacklight {
    fn set_levels(&mut self, levels: [u8; CHANNELS]) {
        self.levels = Some(levels);
        self.applies += 1;
    }
}

/// Records the last applied contrast level
#[derive(Default)]
pub struct MockContrast {
    pub level: Option<u8>,
    pub applies: usize,
}

impl ContrastOutput for MockContrast {
    fn set_contrast(&mut self, level: u8) {
        self.level = Some(level);
        self.applies += 1;
    }
}
