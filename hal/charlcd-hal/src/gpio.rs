//! GPIO pin abstractions
//!
//! Provides traits for digital input, output and bidirectional pins that
//! can be implemented by chip-specific HALs.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Pin whose direction can be switched at runtime
///
/// The HD44780 data bus is shared between writes (MCU drives) and
/// busy-flag reads (controller drives), so its data lines must be able to
/// turn around between the two.
pub trait FlexPin: OutputPin + InputPin {
    /// Configure the pin as a push-pull output
    fn set_as_output(&mut self);

    /// Configure the pin as a floating input
    fn set_as_input(&mut self);
}
