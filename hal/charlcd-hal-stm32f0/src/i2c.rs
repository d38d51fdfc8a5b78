//! I2C slave byte queues for STM32F0
//!
//! The bus task owns the embassy-stm32 I2C peripheral in slave mode. It
//! pushes every byte written by the master into [`SlaveLink`] and answers
//! master reads from the reply queue. The dispatcher sees the other end
//! through [`SlaveTransport`], which implements [`charlcd_hal::I2cSlave`].

use embassy_stm32::i2c::Error as I2cError;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::Deque;

use charlcd_hal::i2c::is_valid_address;
use charlcd_hal::I2cSlave;

/// Receive queue depth
pub const RX_QUEUE: usize = 64;

/// Reply queue depth
pub const TX_QUEUE: usize = 8;

/// Byte filler clocked out when the master reads with no reply queued
pub const IDLE_REPLY: u8 = 0xFF;

/// Queues shared between the bus task and the dispatcher
pub struct SlaveLink {
    rx: Channel<CriticalSectionRawMutex, u8, RX_QUEUE>,
    tx: Channel<CriticalSectionRawMutex, u8, TX_QUEUE>,
    address: Signal<CriticalSectionRawMutex, u8>,
}

impl Default for SlaveLink {
    fn default() -> Self {
        Self::new()
    }
}

impl SlaveLink {
    pub const fn new() -> Self {
        Self {
            rx: Channel::new(),
            tx: Channel::new(),
            address: Signal::new(),
        }
    }

    /// Queue bytes written by the master
    ///
    /// Returns how many were dropped because the queue was full.
    pub fn deliver(&self, bytes: &[u8]) -> usize {
        let mut dropped = 0;
        for &byte in bytes {
            if self.rx.try_send(byte).is_err() {
                dropped += 1;
            }
        }
        #[cfg(feature = "defmt")]
        if dropped > 0 {
            defmt::warn!("I2C receive queue full, dropped {} bytes", dropped);
        }
        dropped
    }

    /// Move queued reply bytes into the bus task's pending buffer
    pub fn take_replies(&self, pending: &mut PendingReply) {
        while !pending.bytes.is_full() {
            match self.tx.try_receive() {
                Ok(byte) => {
                    let _ = pending.bytes.push_back(byte);
                }
                Err(_) => break,
            }
        }
    }

    /// Wait for the dispatcher to request a new own address
    pub async fn address_changed(&self) -> u8 {
        self.address.wait().await
    }
}

/// Reply bytes handed to the master across read transactions
///
/// A master may read fewer bytes than are queued; the rest stay pending
/// for its next read.
#[derive(Default)]
pub struct PendingReply {
    bytes: Deque<u8, TX_QUEUE>,
}

impl PendingReply {
    pub const fn new() -> Self {
        Self {
            bytes: Deque::new(),
        }
    }

    /// Bytes to offer for the next read, padded to at least one byte
    pub fn frame<'b>(&self, buffer: &'b mut [u8; TX_QUEUE]) -> &'b [u8] {
        buffer.fill(IDLE_REPLY);
        for (slot, byte) in buffer.iter_mut().zip(self.bytes.iter()) {
            *slot = *byte;
        }
        &buffer[..self.bytes.len().max(1)]
    }

    /// Drop the bytes the master actually clocked out
    pub fn consumed(&mut self, sent: usize) {
        for _ in 0..sent {
            if self.bytes.pop_front().is_none() {
                break;
            }
        }
    }
}

/// Dispatcher side of a [`SlaveLink`]
pub struct SlaveTransport<'a> {
    link: &'a SlaveLink,
}

impl<'a> SlaveTransport<'a> {
    pub fn new(link: &'a SlaveLink) -> Self {
        Self { link }
    }
}

impl I2cSlave for SlaveTransport<'_> {
    async fn receive(&mut self) -> u8 {
        self.link.rx.receive().await
    }

    async fn transmit(&mut self, byte: u8) {
        self.link.tx.send(byte).await;
    }

    fn has_data(&self) -> bool {
        !self.link.rx.is_empty()
    }

    fn flush(&mut self) {
        self.link.rx.clear();
        self.link.tx.clear();
    }

    fn set_address(&mut self, address: u8) {
        if is_valid_address(address) {
            self.link.address.signal(address);
        }
    }
}

/// Error from I2C operations
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cBusError {
    /// Bus error
    Bus,
    /// Arbitration lost
    ArbitrationLost,
    /// NACK received
    Nack,
    /// Timeout
    Timeout,
    /// Overrun
    Overrun,
    /// Other error
    Other,
}

impl From<I2cError> for I2cBusError {
    fn from(e: I2cError) -> Self {
        match e {
            I2cError::Bus => I2cBusError::Bus,
            I2cError::Arbitration => I2cBusError::ArbitrationLost,
            I2cError::Nack => I2cBusError::Nack,
            I2cError::Timeout => I2cBusError::Timeout,
            I2cError::Overrun => I2cBusError::Overrun,
            _ => I2cBusError::Other,
        }
    }
}
