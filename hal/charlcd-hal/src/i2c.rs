//! I2C slave transport abstractions
//!
//! The backpack is a bus *slave*: a master addresses it and streams command
//! bytes, and occasionally clocks out a reply byte. Reception is buffered by
//! the chip HAL (interrupt or DMA driven); this trait only exposes the
//! byte-level view the command dispatcher needs.

use core::future::Future;

/// Factory default 7-bit slave address
pub const DEFAULT_SLAVE_ADDRESS: u8 = 0x32;

/// Highest valid 7-bit address (exclusive)
pub const ADDRESS_LIMIT: u8 = 0x80;

/// Check whether `address` fits in 7 bits
pub const fn is_valid_address(address: u8) -> bool {
    address < ADDRESS_LIMIT
}

/// Byte-oriented I2C slave
///
/// Implementations own the receive queue filled by the bus hardware and the
/// transmit queue drained when the master reads.
pub trait I2cSlave {
    /// Wait for the next received byte
    ///
    /// Callers only await this once a command has started arriving, so an
    /// implementation may wait indefinitely.
    fn receive(&mut self) -> impl Future<Output = u8>;

    /// Queue one byte for the master to read
    fn transmit(&mut self, byte: u8) -> impl Future<Output = ()>;

    /// Check whether at least one received byte is buffered
    fn has_data(&self) -> bool;

    /// Drop every buffered byte in both directions
    fn flush(&mut self);

    /// Start answering on a new 7-bit address
    ///
    /// # Arguments
    /// * `address` - 7-bit address, already validated by the caller
    fn set_address(&mut self, address: u8);
}
