//! Pin-level test doubles
//!
//! [`Wires`] models the HD44780 side of the bus: it latches nibbles on the
//! falling edge of an enable line and drives the status byte (busy flag and
//! address counter) while RW is high.

use core::cell::RefCell;
use core::convert::Infallible;

use charlcd_hal::{FlexPin, InputPin, OutputPin};
use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use heapless::Vec;

/// Latched write: (RS level, nibble)
pub type Nibble = (bool, u8);

#[derive(Default)]
pub struct Wires {
    pub rs: bool,
    pub rw: bool,
    pub enable: [bool; 2],
    pub data: [bool; 4],
    pub data_is_input: [bool; 4],
    /// Nibbles latched by each controller
    pub writes: [Vec<Nibble, 256>; 2],
    /// Status reads left that report busy
    pub busy_polls: [u8; 2],
    /// Address counter reported in the status byte
    pub address: [u8; 2],
    /// Completed status byte reads
    pub reads: [usize; 2],
    presented: u8,
    low_next: [bool; 2],
}

impl Wires {
    fn status(&self, controller: usize) -> u8 {
        let busy = if self.busy_polls[controller] > 0 { 0x80 } else { 0 };
        busy | (self.address[controller] & 0x7F)
    }

    fn set_enable(&mut self, controller: usize, high: bool) {
        let was_high = self.enable[controller];
        self.enable[controller] = high;

        if high && !was_high && self.rw {
            let status = self.status(controller);
            if self.low_next[controller] {
                self.presented = status & 0x0F;
                self.busy_polls[controller] = self.busy_polls[controller].saturating_sub(1);
                self.reads[controller] += 1;
            } else {
                self.presented = status >> 4;
            }
            self.low_next[controller] = !self.low_next[controller];
        }

        if !high && was_high && !self.rw {
            let nibble = self
                .data
                .iter()
                .enumerate()
                .fold(0u8, |acc, (bit, &level)| acc | ((level as u8) << bit));
            self.writes[controller].push((self.rs, nibble)).unwrap();
        }
    }

    /// Latched nibbles of a controller paired back into bytes, skipping
    /// the first `skip` nibbles
    pub fn bytes(&self, controller: usize, skip: usize) -> Vec<Nibble, 128> {
        self.writes[controller][skip..]
            .chunks(2)
            .map(|pair| (pair[0].0, (pair[0].1 << 4) | pair[1].1))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Line {
    Rs,
    Rw,
    Enable(usize),
    Data(usize),
}

pub struct MockPin<'a> {
    wires: &'a RefCell<Wires>,
    line: Line,
    high: bool,
}

impl<'a> MockPin<'a> {
    pub fn new(wires: &'a RefCell<Wires>, line: Line) -> Self {
        Self {
            wires,
            line,
            high: false,
        }
    }
}

impl OutputPin for MockPin<'_> {
    fn set_high(&mut self) {
        self.set_level(true);
    }

    fn set_low(&mut self) {
        self.set_level(false);
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

impl MockPin<'_> {
    fn set_level(&mut self, high: bool) {
        self.high = high;
        let mut wires = self.wires.borrow_mut();
        match self.line {
            Line::Rs => wires.rs = high,
            Line::Rw => wires.rw = high,
            Line::Enable(controller) => wires.set_enable(controller, high),
            Line::Data(bit) => wires.data[bit] = high,
        }
    }
}

impl InputPin for MockPin<'_> {
    fn is_high(&self) -> bool {
        let wires = self.wires.borrow();
        match self.line {
            Line::Data(bit) if wires.data_is_input[bit] => (wires.presented >> bit) & 1 != 0,
            _ => self.high,
        }
    }
}

impl FlexPin for MockPin<'_> {
    fn set_as_output(&mut self) {
        if let Line::Data(bit) = self.line {
            self.wires.borrow_mut().data_is_input[bit] = false;
        }
    }

    fn set_as_input(&mut self) {
        if let Line::Data(bit) = self.line {
            self.wires.borrow_mut().data_is_input[bit] = true;
        }
    }
}

/// Plain output pin that counts edges
#[derive(Default)]
pub struct CountingPin {
    pub high: bool,
    pub rising: usize,
}

impl OutputPin for CountingPin {
    fn set_high(&mut self) {
        if !self.high {
            self.rising += 1;
        }
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Delay that only accumulates the requested time
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

/// PWM channel recording its duty cycle
pub struct MockPwm {
    pub max: u16,
    pub duty: u16,
}

impl MockPwm {
    pub fn new(max: u16) -> Self {
        Self { max, duty: 0 }
    }
}

impl ErrorType for MockPwm {
    type Error = Infallible;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty = duty;
        Ok(())
    }
}
