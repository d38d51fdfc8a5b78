//! Backlight and contrast output traits

/// Number of backlight channels (R, G, B)
///
/// Single-colour boards drive channel 0 only.
pub const CHANNELS: usize = 3;

/// Backlight brightness output
///
/// Implementations drive PWM channels or LED drivers.
pub trait BacklightOutput {
    /// Apply a brightness level (0-255) to every channel
    fn set_levels(&mut self, levels: [u8; CHANNELS]);
}

/// Contrast voltage output
///
/// Implementations scale the 0-255 level to the range of the fitted
/// potentiometer or DAC.
pub trait ContrastOutput {
    /// Apply a contrast level (0-255)
    fn set_contrast(&mut self, level: u8);
}
