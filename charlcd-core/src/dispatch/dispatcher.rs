//! Command dispatcher
//!
//! Pulls one opcode off the bus, then exactly its operands, runs it and
//! clocks out exactly its reply. Nothing is ever rejected on the bus:
//! reserved opcodes are skipped, out-of-range operands are clamped or
//! ignored and storage failures only show up in the log.

use core::fmt::Write;

use charlcd_hal::i2c::is_valid_address;
use charlcd_hal::{FlashError, FlashStorage, I2cSlave};
use charlcd_protocol::{
    decode, Command, Decoded, COLUMN_COUNT_REPLY, FIRMWARE_REVISION, MAX_OPERANDS, MAX_REPLY,
};
use heapless::{String, Vec};

use crate::config::{ControllerVariant, Settings};
use crate::display::DisplaySession;
use crate::safety::{BrightnessLimiter, SafeModeRequest};
use crate::traits::{BacklightOutput, ContrastOutput, TextController, CHANNELS};

/// Reply bytes of one command
pub type Reply = Vec<u8, MAX_REPLY>;

/// Prefix of the boot-time address banner
pub const ADDRESS_BANNER: &str = "TWI/I2C Adr: ";

/// Single owner of all mutable firmware state
///
/// One command runs to completion before the next opcode is read.
pub struct Dispatcher<T, C, B, K, S> {
    transport: T,
    session: DisplaySession<C>,
    backlight: B,
    contrast: K,
    store: S,
    settings: Settings,
    limiter: BrightnessLimiter,
    /// Applied brightness per channel
    brightness: [u8; CHANNELS],
    /// Applied contrast
    contrast_level: u8,
}

impl<T, C, B, K, S> Dispatcher<T, C, B, K, S>
where
    T: I2cSlave,
    C: TextController,
    B: BacklightOutput,
    K: ContrastOutput,
    S: FlashStorage,
{
    /// Create a dispatcher from loaded settings
    ///
    /// Nothing is applied until [`boot`](Self::boot).
    pub fn new(
        transport: T,
        session: DisplaySession<C>,
        backlight: B,
        contrast: K,
        store: S,
        settings: Settings,
    ) -> Self {
        let limiter = BrightnessLimiter::new(settings.safe_mode);
        Self {
            transport,
            session,
            backlight,
            contrast,
            store,
            brightness: limiter.limit_all(settings.brightness),
            contrast_level: settings.contrast,
            settings,
            limiter,
        }
    }

    /// Bring up the display and apply the stored outputs
    pub fn boot(&mut self) {
        self.session.init();
        self.apply_brightness();
        self.session.clear();
        self.apply_contrast(self.settings.contrast);
    }

    pub fn session(&self) -> &DisplaySession<C> {
        &self.session
    }

    /// Direct access to the display, for boot-time content
    pub fn session_mut(&mut self) -> &mut DisplaySession<C> {
        &mut self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Applied brightness per channel
    pub fn brightness(&self) -> [u8; CHANNELS] {
        self.brightness
    }

    /// Applied contrast level
    pub fn contrast_level(&self) -> u8 {
        self.contrast_level
    }

    /// Check whether the master has started sending
    pub fn has_pending(&self) -> bool {
        self.transport.has_data()
    }

    /// Show the bus address on a cleared display
    pub fn show_address(&mut self) {
        let mut banner: String<16> = String::new();
        // 13 banner chars + at most 3 digits
        let _ = write!(banner, "{}{}", ADDRESS_BANNER, self.settings.slave_address);
        self.session.clear();
        self.session.put_str(banner.as_bytes());
    }

    /// Process commands forever
    pub async fn run(&mut self) -> ! {
        loop {
            self.dispatch().await;
        }
    }

    /// Process exactly one opcode or character from the bus
    pub async fn dispatch(&mut self) {
        let byte = self.transport.receive().await;
        let op = match decode(byte) {
            Decoded::Text(c) => {
                self.session.put_char(c);
                return;
            }
            Decoded::Ignored => {
                #[cfg(feature = "defmt")]
                defmt::trace!("ignored byte {=u8:#x}", byte);
                return;
            }
            Decoded::Opcode(op) => op,
        };

        let count = op.operand_count();
        let mut operands = [0u8; MAX_OPERANDS];
        for operand in operands.iter_mut().take(count) {
            *operand = self.transport.receive().await;
        }

        let command = match Command::from_operands(op, &operands[..count]) {
            Ok(command) => command,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("{} rejected: {}", op, _e);
                return;
            }
        };

        let reply = self.execute(command).await;
        for byte in reply {
            self.transport.transmit(byte).await;
        }
    }

    /// Run a decoded command and return its reply bytes
    pub async fn execute(&mut self, command: Command) -> Reply {
        #[cfg(feature = "defmt")]
        defmt::trace!("execute {}", command);

        let mut reply = Reply::new();
        match command {
            Command::SaveBrightness(level) => {
                self.brightness[0] = self.limiter.limit(level);
                self.apply_brightness();
                let mut saved = self.settings.brightness;
                saved[0] = self.brightness[0];
                let result = self.settings.save_brightness(&mut self.store, saved).await;
                report(result);
            }
            Command::SetSlaveAddress(address) => {
                if is_valid_address(address) {
                    let result = self
                        .settings
                        .save_slave_address(&mut self.store, address)
                        .await;
                    report(result);
                    self.transport.set_address(address);
                } else {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("address {=u8:#x} ignored", address);
                }
            }
            Command::Clear => self.session.clear(),
            Command::SetColumn(column) => self.session.gotoxy(column, 0),
            Command::FirmwareRevision => push_reply(&mut reply, &[FIRMWARE_REVISION]),
            Command::ColumnCount => push_reply(&mut reply, &[COLUMN_COUNT_REPLY]),
            Command::Home => self.session.home(),
            Command::GotoXy { col, row } => self.session.gotoxy(col, row),
            Command::Display(on) => self.session.set_display(on),
            Command::Cursor(on) => self.session.set_cursor_visible(on),
            Command::Blink(on) => self.session.set_blink(on),
            Command::Scroll(direction) => self.session.scroll(direction),
            Command::EntryDirection(direction) => self.session.set_entry_direction(direction),
            Command::Autoscroll(on) => self.session.set_autoscroll(on),
            Command::DefineGlyph { slot, pattern } => self.session.define_glyph(slot, &pattern),
            Command::WriteChar(c) => self.session.put_char(c),
            Command::RawCommand(cmd) => self.session.raw_command(cmd),
            Command::RawData(byte) => self.session.raw_data(byte),
            Command::SaveContrast(level) => {
                self.apply_contrast(level);
                let result = self.settings.save_contrast(&mut self.store, level).await;
                report(result);
            }
            Command::SetContrast(level) => self.apply_contrast(level),
            Command::GetContrast => push_reply(&mut reply, &[self.contrast_level]),
            Command::SetBrightness(level) => {
                self.brightness[0] = self.limiter.limit(level);
                self.apply_brightness();
            }
            Command::GetBrightness => push_reply(&mut reply, &[self.brightness[0]]),
            Command::SaveRgb(levels) => {
                self.brightness = self.limiter.limit_all(levels);
                self.apply_brightness();
                let result = self
                    .settings
                    .save_brightness(&mut self.store, self.brightness)
                    .await;
                report(result);
            }
            Command::SetRgb(levels) => {
                self.brightness = self.limiter.limit_all(levels);
                self.apply_brightness();
            }
            Command::GetRgb => push_reply(&mut reply, &self.brightness),
            Command::SafeMode(pair) => self.safe_mode(pair).await,
            Command::LineWrap(on) => self.session.set_line_wrap(on),
            Command::ControllerVariant(extended) => self
                .session
                .set_controller_variant(ControllerVariant::from_flag(extended)),
            Command::Configure { columns, rows } => {
                let variant = self.session.config().variant();
                self.session.configure(columns, rows, variant);
            }
            Command::Reset => {
                self.transport.flush();
                self.session.clear();
                // Brightness stays at its in-memory value, contrast goes
                // back to the saved one
                self.apply_brightness();
                self.apply_contrast(self.settings.contrast);
            }
            Command::Flush => {}
        }
        reply
    }

    async fn safe_mode(&mut self, pair: [u8; 2]) {
        let Some(request) = SafeModeRequest::from_pair(pair) else {
            #[cfg(feature = "defmt")]
            defmt::debug!("safe-mode pair {} ignored", pair);
            return;
        };
        if !self.limiter.request(request) {
            return;
        }

        #[cfg(feature = "defmt")]
        defmt::info!("safe-mode {}", request);
        let active = self.limiter.is_active();
        let result = self.settings.save_safe_mode(&mut self.store, active).await;
        report(result);

        if active {
            self.brightness = self.limiter.limit_all(self.brightness);
            self.apply_brightness();
        }
    }

    fn apply_brightness(&mut self) {
        self.backlight.set_levels(self.brightness);
    }

    fn apply_contrast(&mut self, level: u8) {
        self.contrast_level = level;
        self.contrast.set_contrast(level);
    }
}

fn push_reply(reply: &mut Reply, bytes: &[u8]) {
    // Replies never exceed MAX_REPLY
    let _ = reply.extend_from_slice(bytes);
}

/// Log a failed settings write; the in-memory mirror is already updated
fn report(result: Result<(), FlashError>) {
    if let Err(_e) = result {
        #[cfg(feature = "defmt")]
        defmt::warn!("settings write failed: {}", _e);
    }
}
