//! Persisted settings mirror
//!
//! In-memory copy of the values kept in settings storage. Save-type
//! opcodes update the mirror first and then write through, so a failed
//! write leaves the running firmware consistent with what the master asked
//! for even if the value will not survive a power cycle.

use charlcd_hal::i2c::is_valid_address;
use charlcd_hal::{FlashError, FlashStorage, StorageKey, DEFAULT_SLAVE_ADDRESS};

use crate::traits::CHANNELS;

/// Factory brightness for every channel
pub const DEFAULT_BRIGHTNESS: u8 = 100;

/// Factory contrast level
pub const DEFAULT_CONTRAST: u8 = 40;

/// Stored flag byte meaning "safe-mode active"
///
/// Any other byte (including erased flash) reads as inactive.
pub const SAFE_MODE_MAGIC: u8 = 0x5A;

/// Persisted settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// 7-bit bus address
    pub slave_address: u8,
    /// Saved brightness per channel
    pub brightness: [u8; CHANNELS],
    /// Saved contrast level
    pub contrast: u8,
    /// Safe-mode persisted across resets
    pub safe_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            slave_address: DEFAULT_SLAVE_ADDRESS,
            brightness: [DEFAULT_BRIGHTNESS; CHANNELS],
            contrast: DEFAULT_CONTRAST,
            safe_mode: false,
        }
    }
}

impl Settings {
    /// Load every setting, keeping the factory value for missing or
    /// unreadable entries
    ///
    /// An out-of-range stored address falls back to the default.
    pub async fn load<S: FlashStorage>(store: &mut S) -> Self {
        let mut settings = Self::default();
        let mut buf = [0u8; CHANNELS];

        for key in StorageKey::ALL {
            let len = match store.read(key, &mut buf).await {
                Ok(len) => len,
                Err(FlashError::NotFound) => continue,
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("settings: read {} failed: {}", key, _e);
                    continue;
                }
            };
            if len != key.value_len() {
                #[cfg(feature = "defmt")]
                defmt::warn!("settings: {} has {} bytes, ignoring", key, len);
                continue;
            }

            match key {
                StorageKey::SlaveAddress => {
                    if is_valid_address(buf[0]) {
                        settings.slave_address = buf[0];
                    }
                }
                StorageKey::Brightness => settings.brightness.copy_from_slice(&buf),
                StorageKey::Contrast => settings.contrast = buf[0],
                StorageKey::SafeMode => settings.safe_mode = buf[0] == SAFE_MODE_MAGIC,
            }
        }

        settings
    }

    /// Update and persist the bus address
    pub async fn save_slave_address<S: FlashStorage>(
        &mut self,
        store: &mut S,
        address: u8,
    ) -> Result<(), FlashError> {
        self.slave_address = address;
        store.write(StorageKey::SlaveAddress, &[address]).await
    }

    /// Update and persist every brightness channel
    pub async fn save_brightness<S: FlashStorage>(
        &mut self,
        store: &mut S,
        levels: [u8; CHANNELS],
    ) -> Result<(), FlashError> {
        self.brightness = levels;
        store.write(StorageKey::Brightness, &levels).await
    }

    /// Update and persist the contrast level
    pub async fn save_contrast<S: FlashStorage>(
        &mut self,
        store: &mut S,
        level: u8,
    ) -> Result<(), FlashError> {
        self.contrast = level;
        store.write(StorageKey::Contrast, &[level]).await
    }

    /// Update and persist the safe-mode flag
    pub async fn save_safe_mode<S: FlashStorage>(
        &mut self,
        store: &mut S,
        active: bool,
    ) -> Result<(), FlashError> {
        self.safe_mode = active;
        let flag = if active { SAFE_MODE_MAGIC } else { 0 };
        store.write(StorageKey::SafeMode, &[flag]).await
    }
}
