//! MAX5160 32-step potentiometer
//!
//! Three-wire interface: CS, INC and U/D. With CS low the wiper moves one
//! step in the direction given by U/D on each falling edge of INC.

use charlcd_core::traits::ContrastOutput;
use charlcd_hal::OutputPin;
use embedded_hal::delay::DelayNs;

/// Wiper positions
pub const STEPS: u8 = 32;

const STARTUP_DELAY_MS: u32 = 50;

/// Direction setup before the INC edge
const SETUP_US: u32 = 50;

/// INC low time
const STEP_US: u32 = 1_000;

pub struct Max5160<CS, INC, UD, DL> {
    cs: CS,
    inc: INC,
    up_down: UD,
    delay: DL,
    wiper: u8,
}

impl<CS, INC, UD, DL> Max5160<CS, INC, UD, DL>
where
    CS: OutputPin,
    INC: OutputPin,
    UD: OutputPin,
    DL: DelayNs,
{
    /// Deselect the part and run the wiper to full scale
    pub fn new(mut cs: CS, mut inc: INC, mut up_down: UD, mut delay: DL) -> Self {
        cs.set_high();
        inc.set_high();
        up_down.set_high();
        delay.delay_ms(STARTUP_DELAY_MS);

        let mut pot = Self {
            cs,
            inc,
            up_down,
            delay,
            wiper: 0,
        };
        for _ in 0..STEPS {
            pot.step(true);
        }
        pot
    }

    pub fn wiper(&self) -> u8 {
        self.wiper
    }

    /// Move the wiper one position
    pub fn step(&mut self, up: bool) {
        self.cs.set_low();
        self.up_down.set_state(up);
        self.delay.delay_us(SETUP_US);

        self.inc.set_low();
        self.delay.delay_us(STEP_US);

        self.inc.set_high();
        self.up_down.set_high();
        self.cs.set_high();

        self.wiper = if up {
            (self.wiper + 1).min(STEPS - 1)
        } else {
            self.wiper.saturating_sub(1)
        };
    }
}

impl<CS, INC, UD, DL> ContrastOutput for Max5160<CS, INC, UD, DL>
where
    CS: OutputPin,
    INC: OutputPin,
    UD: OutputPin,
    DL: DelayNs,
{
    fn set_contrast(&mut self, level: u8) {
        for _ in 0..STEPS {
            self.step(false);
        }
        for _ in 0..level >> 3 {
            self.step(true);
        }
    }
}
