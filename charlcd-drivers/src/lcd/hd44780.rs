//! HD44780 4-bit bus driver
//!
//! The data lines are D4..D7 of the controller. Every byte is sent high
//! nibble first and latched on the falling edge of the controller's enable
//! line. Reads turn the data lines into inputs and sample them while enable
//! is held high.
//!
//! Before each write the driver polls the busy flag instead of waiting a
//! worst-case execution time. The poll has no timeout.

use core::cell::RefCell;

use charlcd_core::display::registers::BUSY_FLAG;
use charlcd_core::traits::TextController;
use charlcd_hal::{FlexPin, OutputPin};
use embedded_hal::delay::DelayNs;

/// Enable pulse width and hold time
const ENABLE_PULSE_NS: u32 = 1_000;

/// Wait after power-on before the first nibble
const POWER_ON_DELAY_MS: u32 = 16;

/// Wait after the first 8-bit function set nibble
const RESET_FIRST_DELAY_US: u32 = 5_000;

/// Wait after the remaining reset nibbles
const RESET_STEP_DELAY_US: u32 = 64;

/// The address counter updates shortly after the busy flag clears
const ADDRESS_SETTLE_US: u32 = 4;

/// Address counter bits of the status byte
const ADDRESS_MASK: u8 = 0x7F;

/// Lines shared by every controller on the bus
pub struct Hd44780Bus<RS, RW, D, DL> {
    rs: RS,
    rw: RW,
    /// D4..D7
    data: [D; 4],
    delay: DL,
}

impl<RS, RW, D, DL> Hd44780Bus<RS, RW, D, DL>
where
    RS: OutputPin,
    RW: OutputPin,
    D: FlexPin,
    DL: DelayNs,
{
    /// Take the bus lines and drive them to the idle write state
    pub fn new(rs: RS, rw: RW, data: [D; 4], delay: DL) -> Self {
        let mut bus = Self {
            rs,
            rw,
            data,
            delay,
        };
        bus.rs.set_low();
        bus.rw.set_low();
        bus.drive(0);
        bus
    }

    fn drive(&mut self, nibble: u8) {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            pin.set_as_output();
            pin.set_state((nibble >> bit) & 1 != 0);
        }
    }

    fn sample(&self) -> u8 {
        self.data
            .iter()
            .enumerate()
            .fold(0, |acc, (bit, pin)| acc | ((pin.is_high() as u8) << bit))
    }

    fn write_nibble<E: OutputPin>(&mut self, enable: &mut E, nibble: u8) {
        self.drive(nibble);
        enable.set_high();
        self.delay.delay_ns(ENABLE_PULSE_NS);
        enable.set_low();
        self.delay.delay_ns(ENABLE_PULSE_NS);
    }

    fn write<E: OutputPin>(&mut self, enable: &mut E, byte: u8, register_select: bool) {
        self.rw.set_low();
        self.rs.set_state(register_select);
        self.write_nibble(enable, byte >> 4);
        self.write_nibble(enable, byte & 0x0F);
    }

    fn read_nibble<E: OutputPin>(&mut self, enable: &mut E) -> u8 {
        enable.set_high();
        self.delay.delay_ns(ENABLE_PULSE_NS);
        let nibble = self.sample();
        enable.set_low();
        self.delay.delay_ns(ENABLE_PULSE_NS);
        nibble
    }

    fn read<E: OutputPin>(&mut self, enable: &mut E, register_select: bool) -> u8 {
        for pin in self.data.iter_mut() {
            pin.set_as_input();
        }
        self.rs.set_state(register_select);
        self.rw.set_high();

        let high = self.read_nibble(enable);
        let low = self.read_nibble(enable);

        self.rw.set_low();
        (high << 4) | low
    }
}

/// One controller on a shared [`Hd44780Bus`]
///
/// Only the enable line is owned; everything else is borrowed from the bus
/// for the duration of each transfer.
pub struct Hd44780<'a, RS, RW, D, DL, E> {
    bus: &'a RefCell<Hd44780Bus<RS, RW, D, DL>>,
    enable: E,
}

impl<'a, RS, RW, D, DL, E> Hd44780<'a, RS, RW, D, DL, E>
where
    RS: OutputPin,
    RW: OutputPin,
    D: FlexPin,
    DL: DelayNs,
    E: OutputPin,
{
    pub fn new(bus: &'a RefCell<Hd44780Bus<RS, RW, D, DL>>, mut enable: E) -> Self {
        enable.set_low();
        Self { bus, enable }
    }

    /// Power-on reset into 4-bit mode
    ///
    /// Uses the timed reset sequence since the busy flag cannot be read
    /// until the interface width is known.
    pub fn init(&mut self) {
        let mut bus = self.bus.borrow_mut();
        bus.rs.set_low();
        bus.rw.set_low();
        bus.delay.delay_ms(POWER_ON_DELAY_MS);

        bus.write_nibble(&mut self.enable, 0x3);
        bus.delay.delay_us(RESET_FIRST_DELAY_US);
        bus.write_nibble(&mut self.enable, 0x3);
        bus.delay.delay_us(RESET_STEP_DELAY_US);
        bus.write_nibble(&mut self.enable, 0x3);
        bus.delay.delay_us(RESET_STEP_DELAY_US);

        // 4-bit interface from here on
        bus.write_nibble(&mut self.enable, 0x2);
        bus.delay.delay_us(RESET_STEP_DELAY_US);

        #[cfg(feature = "defmt")]
        defmt::debug!("HD44780 reset into 4-bit mode");
    }
}

impl<RS, RW, D, DL, E> TextController for Hd44780<'_, RS, RW, D, DL, E>
where
    RS: OutputPin,
    RW: OutputPin,
    D: FlexPin,
    DL: DelayNs,
    E: OutputPin,
{
    fn command(&mut self, cmd: u8) {
        self.wait_busy();
        self.bus.borrow_mut().write(&mut self.enable, cmd, false);
    }

    fn data(&mut self, byte: u8) {
        self.wait_busy();
        self.bus.borrow_mut().write(&mut self.enable, byte, true);
    }

    fn wait_busy(&mut self) -> u8 {
        let mut bus = self.bus.borrow_mut();
        while bus.read(&mut self.enable, false) & BUSY_FLAG != 0 {}
        bus.delay.delay_us(ADDRESS_SETTLE_US);
        bus.read(&mut self.enable, false) & ADDRESS_MASK
    }
}
