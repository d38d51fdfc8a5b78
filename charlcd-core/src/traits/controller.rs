//! Text controller trait

/// One physical HD44780-class text controller
///
/// The handle owns its busy-wait: `command` and `data` return only once the
/// controller has accepted the byte. There is no timeout at this layer; a
/// busy flag that never clears hangs the caller.
pub trait TextController {
    /// Send an instruction byte (RS low)
    fn command(&mut self, cmd: u8);

    /// Send a data byte to DDRAM or CGRAM (RS high)
    fn data(&mut self, byte: u8);

    /// Spin until the busy flag clears
    ///
    /// Returns the address counter read together with the busy flag.
    fn wait_busy(&mut self) -> u8;
}
