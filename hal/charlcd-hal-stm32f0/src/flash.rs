//! Flash storage driver for STM32F0
//!
//! Uses sequential-storage for wear-leveled key-value storage in the last
//! 4KB of flash. STM32F042 parts have 32KB flash with 1KB pages.
//!
//! Implements the `FlashStorage` trait from `charlcd-hal`.

use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_stm32::flash::{Blocking, Flash};
use sequential_storage::cache::NoCache;
use sequential_storage::map;

// Re-export shared types from charlcd-hal
pub use charlcd_hal::flash::{FlashError, StorageKey};

/// Flash storage configuration for STM32F042
pub const FLASH_SIZE: usize = 32 * 1024; // 32KB
pub const CONFIG_PARTITION_SIZE: usize = 4 * 1024; // 4 pages
pub const CONFIG_PARTITION_START: usize = FLASH_SIZE - CONFIG_PARTITION_SIZE;

/// Flash range for the config partition
pub const CONFIG_RANGE: core::ops::Range<u32> =
    (CONFIG_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch space for one stored item; values are at most 3 bytes
const ITEM_BUFFER: usize = 32;

/// STM32F0 flash storage implementation
///
/// The F0 flash controller is blocking; `BlockingAsync` adapts it to the
/// async `NorFlash` trait required by sequential-storage.
pub struct Stm32FlashStorage<'d> {
    flash: BlockingAsync<Flash<'d, Blocking>>,
}

impl<'d> Stm32FlashStorage<'d> {
    pub fn new(flash: Flash<'d, Blocking>) -> Self {
        Self {
            flash: BlockingAsync::new(flash),
        }
    }
}

impl charlcd_hal::FlashStorage for Stm32FlashStorage<'_> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut data_buffer = [0u8; ITEM_BUFFER];

        let result = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(FlashError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(FlashError::NotFound),
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Settings read failed for {}", key);
                Err(FlashError::Storage)
            }
        }
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        let mut data_buffer = [0u8; ITEM_BUFFER];

        map::store_item(
            &mut self.flash,
            CONFIG_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        )
        .await
        .map_err(|_| FlashError::Storage)
    }
}
