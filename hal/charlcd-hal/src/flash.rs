//! Persistent settings storage abstractions
//!
//! Provides a small key-value store for the handful of settings the
//! backpack keeps across power cycles. Chip HALs back it with flash
//! (wear-leveled) or EEPROM.

use core::future::Future;

/// Storage keys for persisted settings
///
/// Each key holds a few raw bytes; the meaning of the bytes is owned by the
/// settings mirror in `charlcd-core`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// 7-bit bus slave address (1 byte)
    SlaveAddress = 0,
    /// Backlight brightness, one byte per channel (R, G, B)
    Brightness = 1,
    /// Contrast level (1 byte)
    Contrast = 2,
    /// Safe-mode magic flag (1 byte)
    SafeMode = 3,
}

impl StorageKey {
    /// Every key, in storage order
    pub const ALL: [StorageKey; 4] = [
        StorageKey::SlaveAddress,
        StorageKey::Brightness,
        StorageKey::Contrast,
        StorageKey::SafeMode,
    ];

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::SlaveAddress),
            1 => Some(StorageKey::Brightness),
            2 => Some(StorageKey::Contrast),
            3 => Some(StorageKey::SafeMode),
            _ => None,
        }
    }

    /// Number of value bytes stored under this key
    pub fn value_len(self) -> usize {
        match self {
            StorageKey::Brightness => 3,
            _ => 1,
        }
    }
}

/// Errors from settings storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Storage operation failed
    Storage,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
}

/// Settings storage trait
///
/// Implementations should handle:
/// - Wear leveling across flash sectors
/// - Data integrity (CRC or similar)
pub trait FlashStorage {
    /// Read a value by key into the provided buffer
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl Future<Output = Result<usize, FlashError>>;

    /// Write a value by key
    fn write(&mut self, key: StorageKey, data: &[u8]) -> impl Future<Output = Result<(), FlashError>>;
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}
