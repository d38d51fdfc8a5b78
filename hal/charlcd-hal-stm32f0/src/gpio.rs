//! GPIO adapters for STM32F0
//!
//! Wrap embassy-stm32 pins so the display and potentiometer drivers can use
//! the `charlcd-hal` pin traits.

use embassy_stm32::gpio::{Flex, Output, Pull, Speed};

/// Push-pull output
pub struct Stm32Output<'d> {
    pin: Output<'d>,
}

impl<'d> Stm32Output<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl charlcd_hal::OutputPin for Stm32Output<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Bidirectional data line
///
/// As an input the line is pulled down, so a controller that never drives
/// the bus reads back as idle (busy flag clear, address 0).
pub struct Stm32Flex<'d> {
    pin: Flex<'d>,
}

impl<'d> Stm32Flex<'d> {
    /// Take a pin and start it as a low output
    pub fn new(mut pin: Flex<'d>) -> Self {
        pin.set_low();
        pin.set_as_output(Speed::Low);
        Self { pin }
    }
}

impl charlcd_hal::OutputPin for Stm32Flex<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

impl charlcd_hal::InputPin for Stm32Flex<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

impl charlcd_hal::FlexPin for Stm32Flex<'_> {
    fn set_as_output(&mut self) {
        self.pin.set_as_output(Speed::Low);
    }

    fn set_as_input(&mut self) {
        self.pin.set_as_input(Pull::Down);
    }
}
