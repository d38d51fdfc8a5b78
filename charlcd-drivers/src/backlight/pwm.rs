//! PWM backlight
//!
//! One PWM channel per colour. A single-colour board fits only the red
//! channel; levels for missing channels are dropped.

use charlcd_core::traits::{BacklightOutput, CHANNELS};
use embedded_hal::pwm::SetDutyCycle;

/// Full-scale brightness level
const LEVEL_MAX: u16 = 255;

pub struct PwmBacklight<P> {
    channels: [Option<P>; CHANNELS],
}

impl<P: SetDutyCycle> PwmBacklight<P> {
    /// Single-colour backlight on one channel
    pub fn mono(channel: P) -> Self {
        Self {
            channels: [Some(channel), None, None],
        }
    }

    /// RGB backlight
    pub fn rgb(red: P, green: P, blue: P) -> Self {
        Self {
            channels: [Some(red), Some(green), Some(blue)],
        }
    }

    pub fn channel(&self, index: usize) -> Option<&P> {
        self.channels.get(index).and_then(Option::as_ref)
    }
}

impl<P: SetDutyCycle> BacklightOutput for PwmBacklight<P> {
    fn set_levels(&mut self, levels: [u8; CHANNELS]) {
        for (channel, level) in self.channels.iter_mut().zip(levels) {
            let Some(pwm) = channel else { continue };
            if let Err(_e) = pwm.set_duty_cycle_fraction(u16::from(level), LEVEL_MAX) {
                #[cfg(feature = "defmt")]
                defmt::warn!("Backlight duty update failed");
            }
        }
    }
}
