//! MCP4013 64-step potentiometer
//!
//! Two-wire interface: CS and U/D. The direction is latched from U/D on the
//! falling edge of CS and the wiper moves on each rising edge of U/D.

use charlcd_core::traits::ContrastOutput;
use charlcd_hal::OutputPin;
use embedded_hal::delay::DelayNs;

/// Wiper positions
pub const STEPS: u8 = 64;

/// Settle time after releasing the part at power-up
const STARTUP_DELAY_MS: u32 = 2;

/// Direction setup before selecting the chip
const SETUP_US: u32 = 10;

/// Hold time between edges
const EDGE_US: u32 = 2;

pub struct Mcp4013<CS, UD, DL> {
    cs: CS,
    up_down: UD,
    delay: DL,
    /// Tracked wiper position (0..STEPS)
    wiper: u8,
}

impl<CS: OutputPin, UD: OutputPin, DL: DelayNs> Mcp4013<CS, UD, DL> {
    /// Deselect the part and run the wiper to full scale
    pub fn new(mut cs: CS, mut up_down: UD, mut delay: DL) -> Self {
        cs.set_high();
        up_down.set_high();
        delay.delay_ms(STARTUP_DELAY_MS);

        let mut pot = Self {
            cs,
            up_down,
            delay,
            wiper: 0,
        };
        for _ in 0..STEPS {
            pot.increment();
        }
        pot
    }

    pub fn wiper(&self) -> u8 {
        self.wiper
    }

    pub fn increment(&mut self) {
        self.up_down.set_high();
        self.delay.delay_us(SETUP_US);
        self.cs.set_low();
        self.delay.delay_us(EDGE_US);

        self.up_down.set_low();
        self.delay.delay_us(EDGE_US);
        self.up_down.set_high();
        self.delay.delay_us(EDGE_US);

        self.deselect();
        self.wiper = (self.wiper + 1).min(STEPS - 1);
    }

    pub fn decrement(&mut self) {
        self.up_down.set_low();
        self.delay.delay_us(SETUP_US);
        self.cs.set_low();
        self.delay.delay_us(EDGE_US);

        self.up_down.set_high();
        self.delay.delay_us(EDGE_US);

        self.deselect();
        self.wiper = self.wiper.saturating_sub(1);
    }

    fn deselect(&mut self) {
        self.up_down.set_high();
        self.cs.set_high();
    }
}

impl<CS: OutputPin, UD: OutputPin, DL: DelayNs> ContrastOutput for Mcp4013<CS, UD, DL> {
    fn set_contrast(&mut self, level: u8) {
        for _ in 0..STEPS {
            self.decrement();
        }
        for _ in 0..level >> 2 {
            self.increment();
        }
    }
}
