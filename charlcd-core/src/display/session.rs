//! Display session
//!
//! Owns the controller handles and every piece of display state: the
//! geometry, the cursor and the two write-only control registers. All
//! display opcodes end up as a call on [`DisplaySession`].

use charlcd_protocol::{ScrollDirection, TextDirection};

use super::cursor::{CursorEvent, CursorState};
use super::geometry::{ControllerId, Geometry};
use super::registers::{self, with_flag};
use crate::config::{ControllerVariant, DisplayConfig};
use crate::traits::TextController;

/// Logical display built from one or two controllers
pub struct DisplaySession<C> {
    primary: C,
    /// Absent on boards with a single controller; dual-mode writes to it
    /// are dropped
    secondary: Option<C>,
    config: DisplayConfig,
    geometry: Geometry,
    cursor: CursorState,
    display_control: u8,
    entry_mode: u8,
}

impl<C: TextController> DisplaySession<C> {
    /// Create a session with the power-on geometry
    ///
    /// No bus traffic happens until [`init`](Self::init).
    pub fn new(primary: C, secondary: Option<C>) -> Self {
        let config = DisplayConfig::default();
        Self {
            primary,
            secondary,
            geometry: Geometry::from(&config),
            config,
            cursor: CursorState::default(),
            display_control: registers::DEFAULT_DISPLAY_CONTROL,
            entry_mode: registers::DEFAULT_ENTRY_MODE,
        }
    }

    /// Program the controllers after their interface is in 4-bit mode
    ///
    /// The second controller is only silenced here. It is brought up when
    /// a 40x4 geometry is configured.
    pub fn init(&mut self) {
        self.send_function_set();
        self.primary.command(registers::DISPLAY_CONTROL);
        self.clear();
        self.primary.command(self.entry_mode);
        self.primary.command(self.display_control);

        if let Some(secondary) = self.secondary.as_mut() {
            secondary.command(registers::FUNCTION_4BIT_2LINES);
            secondary.command(registers::DISPLAY_CONTROL);
        }
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    /// Display control register value
    pub fn display_control(&self) -> u8 {
        self.display_control
    }

    /// Entry mode register value
    pub fn entry_mode(&self) -> u8 {
        self.entry_mode
    }

    pub fn primary(&self) -> &C {
        &self.primary
    }

    pub fn secondary(&self) -> Option<&C> {
        self.secondary.as_ref()
    }

    fn controller(&mut self, id: ControllerId) -> Option<&mut C> {
        match id {
            ControllerId::Primary => Some(&mut self.primary),
            ControllerId::Secondary => self.secondary.as_mut(),
        }
    }

    fn send_command(&mut self, id: ControllerId, cmd: u8) {
        if let Some(controller) = self.controller(id) {
            controller.command(cmd);
        }
    }

    fn send_data(&mut self, id: ControllerId, byte: u8) {
        if let Some(controller) = self.controller(id) {
            controller.data(byte);
        }
    }

    /// Current address counter of a controller (0 when it is not fitted)
    fn address_of(&mut self, id: ControllerId) -> u8 {
        self.controller(id)
            .map(|controller| controller.wait_busy())
            .unwrap_or(0)
    }

    fn send_active(&mut self, cmd: u8) {
        self.send_command(self.cursor.controller, cmd);
    }

    /// Function set for the primary controller
    ///
    /// In dual mode each controller is a plain two-line part.
    fn send_function_set(&mut self) {
        let rows = if self.config.dual_controller() {
            2
        } else {
            self.config.rows()
        };
        for &cmd in registers::function_set(rows, self.config.variant()) {
            self.primary.command(cmd);
        }
    }

    /// Change the geometry
    ///
    /// Row counts other than 1, 2 and 4 are ignored. A 40x4 geometry turns
    /// on dual mode and brings up the second controller; any other geometry
    /// turns it off. Always ends with a cleared display.
    pub fn configure(&mut self, columns: u8, rows: u8, variant: ControllerVariant) {
        let Some(next) = self.config.with_geometry(columns, rows, variant) else {
            #[cfg(feature = "defmt")]
            defmt::debug!("configure {}x{} ignored", columns, rows);
            return;
        };

        let rows_changed = next.rows() != self.config.rows();
        self.config = next;
        self.geometry = Geometry::from(&next);
        if rows_changed {
            self.send_function_set();
        }

        if next.dual_controller() {
            #[cfg(feature = "defmt")]
            defmt::debug!("dual controller mode on");
            self.send_command(ControllerId::Secondary, registers::FUNCTION_4BIT_2LINES);
            self.send_command(ControllerId::Secondary, registers::DISPLAY_CONTROL);
            self.clear();
            self.send_command(ControllerId::Secondary, registers::DEFAULT_ENTRY_MODE);
            self.send_command(ControllerId::Secondary, registers::DEFAULT_DISPLAY_CONTROL);
        } else {
            self.clear();
        }
    }

    /// Clear the display and put the cursor on the first controller's
    /// origin
    pub fn clear(&mut self) {
        self.primary.command(registers::CLEAR_DISPLAY);
        if self.config.dual_controller() {
            self.send_command(ControllerId::Secondary, registers::CLEAR_DISPLAY);
        }
        self.cursor = self.cursor.transition(CursorEvent::Origin, &self.geometry);
    }

    /// Cursor to (0, 0) without clearing
    pub fn home(&mut self) {
        self.primary.command(registers::RETURN_HOME);
        self.cursor = self.cursor.transition(CursorEvent::Origin, &self.geometry);
    }

    /// Move the cursor to (column, row)
    pub fn gotoxy(&mut self, column: u8, row: u8) {
        let position = self.geometry.locate(column, row);
        self.send_command(position.controller, registers::set_ddram(position.address));
        self.cursor = self.cursor.transition(CursorEvent::Goto(row), &self.geometry);
    }

    /// Move to the start of the row after `from`
    fn newline(&mut self, from: u8) {
        self.cursor = self
            .cursor
            .transition(CursorEvent::Newline { from }, &self.geometry);
        let start = self.geometry.line_start(self.cursor.row);
        self.send_command(start.controller, registers::set_ddram(start.address));
    }

    /// Row the active controller's address counter is on
    fn current_row(&mut self) -> (u8, u8) {
        let active = self.cursor.controller;
        let address = self.address_of(active);
        (self.geometry.row_at(active, address, self.cursor.row), address)
    }

    /// Write one character at the cursor
    ///
    /// `\n` moves to the next line and `\r` is dropped. With line wrap on,
    /// a character arriving when the address counter sits just past the
    /// last column goes to the start of the next line instead.
    pub fn put_char(&mut self, c: u8) {
        match c {
            b'\r' => {}
            b'\n' => {
                let (row, _) = self.current_row();
                self.newline(row);
            }
            _ => {
                if self.config.line_wrap() {
                    let (row, address) = self.current_row();
                    if self.geometry.is_line_end(row, address) {
                        self.newline(row);
                    } else {
                        self.cursor = self
                            .cursor
                            .transition(CursorEvent::Observed(row), &self.geometry);
                    }
                }
                self.send_data(self.cursor.controller, c);
            }
        }
    }

    /// Write every byte through [`put_char`](Self::put_char)
    pub fn put_str(&mut self, s: &[u8]) {
        for &c in s {
            self.put_char(c);
        }
    }

    /// Define custom glyph `slot` (0-7)
    ///
    /// In dual mode the glyph is written to both controllers. The active
    /// controller's DDRAM address is restored afterwards so the next
    /// character lands where the cursor was.
    pub fn define_glyph(&mut self, slot: u8, pattern: &[u8; 8]) {
        let active = self.cursor.controller;
        let address = self.address_of(active);

        let mut targets = [Some(active), None];
        if self.config.dual_controller() {
            targets[1] = Some(active.other());
        }
        for id in targets.into_iter().flatten() {
            self.send_command(id, registers::set_cgram(slot));
            for &row in pattern {
                self.send_data(id, row);
            }
        }

        self.send_command(active, registers::set_ddram(address));
    }

    pub fn set_line_wrap(&mut self, on: bool) {
        self.config.set_line_wrap(on);
    }

    /// Switch controller command set
    ///
    /// Selecting the extended set sends the four-line enable sequence right
    /// away; going back re-sends the plain function set. Nothing is
    /// cleared.
    ///
    /// In dual mode both controllers stay two-line parts, so only the plain
    /// function set is re-sent whatever the variant.
    pub fn set_controller_variant(&mut self, variant: ControllerVariant) {
        self.config.set_variant(variant);
        self.geometry = Geometry::from(&self.config);
        match variant {
            ControllerVariant::ExtendedFourLine if !self.config.dual_controller() => {
                for cmd in registers::KS0073_FOUR_LINE_SEQUENCE {
                    self.primary.command(cmd);
                }
            }
            _ => self.send_function_set(),
        }
    }

    fn update_display_control(&mut self, flag: u8, on: bool) {
        self.display_control = with_flag(self.display_control, flag, on);
        self.send_active(self.display_control);
    }

    fn update_entry_mode(&mut self, flag: u8, on: bool) {
        self.entry_mode = with_flag(self.entry_mode, flag, on);
        self.send_active(self.entry_mode);
    }

    pub fn set_display(&mut self, on: bool) {
        self.update_display_control(registers::DISPLAY_ON, on);
    }

    pub fn set_cursor_visible(&mut self, on: bool) {
        self.update_display_control(registers::CURSOR_ON, on);
    }

    pub fn set_blink(&mut self, on: bool) {
        self.update_display_control(registers::BLINK_ON, on);
    }

    pub fn scroll(&mut self, direction: ScrollDirection) {
        let cmd = match direction {
            ScrollDirection::Left => registers::SHIFT_DISPLAY_LEFT,
            ScrollDirection::Right => registers::SHIFT_DISPLAY_RIGHT,
        };
        self.send_active(cmd);
    }

    pub fn set_entry_direction(&mut self, direction: TextDirection) {
        self.update_entry_mode(
            registers::ENTRY_LEFT,
            direction == TextDirection::LeftToRight,
        );
    }

    pub fn set_autoscroll(&mut self, on: bool) {
        self.update_entry_mode(registers::ENTRY_SHIFT_INCREMENT, on);
    }

    /// Pass an instruction straight to the active controller
    ///
    /// The session's registers and cursor are not updated.
    pub fn raw_command(&mut self, cmd: u8) {
        self.send_active(cmd);
    }

    /// Pass a data byte straight to the active controller
    pub fn raw_data(&mut self, byte: u8) {
        self.send_data(self.cursor.controller, byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{LineMode, MockController, Op};

    type Session = DisplaySession<MockController>;

    fn single() -> Session {
        let mut session = DisplaySession::new(MockController::new(), None);
        session.init();
        session
    }

    fn dual_capable() -> Session {
        let mut session =
            DisplaySession::new(MockController::new(), Some(MockController::new()));
        session.init();
        session
    }

    fn sessions_for(columns: u8, rows: u8) -> Session {
        let mut session = dual_capable();
        session.configure(columns, rows, ControllerVariant::Standard);
        session
    }

    fn active_address(session: &mut Session) -> u8 {
        let active = session.cursor().controller;
        session.address_of(active)
    }

    #[test]
    fn test_init_sequence() {
        let session = dual_capable();
        let primary: heapless::Vec<u8, 16> = session.primary().commands().collect();
        assert_eq!(primary.as_slice(), &[0x28, 0x08, 0x01, 0x06, 0x0C]);
        let secondary: heapless::Vec<u8, 16> =
            session.secondary().unwrap().commands().collect();
        assert_eq!(secondary.as_slice(), &[0x28, 0x08]);
    }

    #[test]
    fn test_gotoxy_matches_geometry() {
        for (columns, rows) in [(16, 1), (16, 2), (20, 4), (40, 4)] {
            let mut session = sessions_for(columns, rows);
            let geometry = Geometry::from(session.config());
            for row in 0..rows {
                for column in [0, columns / 2, columns - 1] {
                    session.gotoxy(column, row);
                    let expected = geometry.locate(column, row);
                    assert_eq!(session.cursor().controller, expected.controller);
                    assert_eq!(active_address(&mut session), expected.address);
                }
            }
        }
    }

    #[test]
    fn test_configure_ignores_bad_rows() {
        let mut session = single();
        session.primary.clear_log();
        session.configure(20, 3, ControllerVariant::Standard);
        assert_eq!(session.config().rows(), 2);
        assert!(session.primary().log.is_empty());
    }

    #[test]
    fn test_configure_function_set_only_on_row_change() {
        let mut session = single();
        session.primary.clear_log();
        session.configure(20, 2, ControllerVariant::Standard);
        assert!(!session.primary().has_command(0x28));
        assert!(session.primary().has_command(0x01));

        session.configure(20, 1, ControllerVariant::Standard);
        assert!(session.primary().has_command(0x20));
    }

    #[test]
    fn test_dual_mode_follows_geometry() {
        let mut session = dual_capable();
        session.configure(40, 4, ControllerVariant::Standard);
        assert!(session.config().dual_controller());

        let secondary: heapless::Vec<u8, 16> =
            session.secondary().unwrap().commands().collect();
        assert_eq!(
            secondary.as_slice(),
            &[0x28, 0x08, 0x28, 0x08, 0x01, 0x06, 0x0C]
        );

        session.configure(20, 4, ControllerVariant::Standard);
        assert!(!session.config().dual_controller());
        session.secondary.as_mut().unwrap().clear_log();
        session.clear();
        assert!(session.secondary().unwrap().log.is_empty());
    }

    #[test]
    fn test_dual_without_secondary_is_harmless() {
        let mut session = single();
        session.configure(40, 4, ControllerVariant::Standard);
        assert!(session.config().dual_controller());
        session.gotoxy(0, 3);
        session.put_str(b"lost");
        assert_eq!(session.cursor().controller, ControllerId::Secondary);
        session.gotoxy(0, 0);
        session.put_str(b"kept");
        assert_eq!(session.primary().text_at(0, 4), b"kept");
    }

    #[test]
    fn test_glyph_mirroring_survives_leaving_dual() {
        let pattern = [0x07, 0x08, 0x13, 0x14, 0x14, 0x13, 0x08, 0x07];
        let mut session = sessions_for(40, 4);
        session.define_glyph(2, &pattern);
        assert_eq!(session.primary().glyph(2), &pattern);
        assert_eq!(session.secondary().unwrap().glyph(2), &pattern);

        session.configure(16, 2, ControllerVariant::Standard);
        assert_eq!(session.primary().glyph(2), &pattern);
        assert_eq!(session.secondary().unwrap().glyph(2), &pattern);

        // Outside dual mode only the active controller is written
        let other = [0x1F; 8];
        session.define_glyph(2, &other);
        assert_eq!(session.primary().glyph(2), &other);
        assert_eq!(session.secondary().unwrap().glyph(2), &pattern);
    }

    #[test]
    fn test_glyph_restores_ddram_address() {
        let mut session = sessions_for(20, 4);
        session.gotoxy(5, 1);
        session.define_glyph(0, &[0x11; 8]);
        session.put_char(b'Z');
        assert_eq!(session.primary().ddram[0x45], b'Z');
    }

    #[test]
    fn test_wrap_moves_to_next_line() {
        for (columns, rows) in [(16, 1), (16, 2), (20, 4), (40, 4)] {
            let mut session = sessions_for(columns, rows);
            session.set_line_wrap(true);
            let geometry = Geometry::from(session.config());

            for row in 0..rows {
                session.gotoxy(0, row);
                for _ in 0..columns {
                    session.put_char(b'x');
                }
                session.put_char(b'N');

                let next = geometry.line_start(geometry.next_row(row));
                assert_eq!(session.cursor().controller, next.controller);
                let controller = match next.controller {
                    ControllerId::Primary => session.primary(),
                    ControllerId::Secondary => session.secondary().unwrap(),
                };
                assert_eq!(controller.ddram[next.address as usize], b'N');
            }
        }
    }

    #[test]
    fn test_wrap_standard_four_line_row_two_not_confused() {
        let mut session = sessions_for(20, 4);
        session.set_line_wrap(true);
        // 0x14 is also the end of row 0; the row hint keeps us on row 2
        session.gotoxy(0, 2);
        session.put_char(b'A');
        assert_eq!(session.primary().ddram[0x14], b'A');
        assert_eq!(session.cursor().row, 2);
    }

    #[test]
    fn test_wrap_dual_second_row_moves_to_secondary() {
        let mut session = sessions_for(40, 4);
        session.set_line_wrap(true);
        session.gotoxy(0, 1);
        for _ in 0..40 {
            session.put_char(b'x');
        }
        // The primary's counter has jumped from 0x67 back to 0x00
        assert_eq!(session.primary.address, 0x00);

        session.put_char(b'N');
        assert_eq!(session.cursor().controller, ControllerId::Secondary);
        assert_eq!(session.cursor().row, 2);
        assert_eq!(session.secondary().unwrap().ddram[0x00], b'N');
        assert_eq!(session.primary().ddram[0x00], b' ');
    }

    #[test]
    fn test_wrap_dual_last_row_returns_to_primary() {
        let mut session = sessions_for(40, 4);
        session.set_line_wrap(true);
        session.gotoxy(0, 3);
        for _ in 0..40 {
            session.put_char(b'x');
        }
        session.put_char(b'N');
        assert_eq!(session.cursor().controller, ControllerId::Primary);
        assert_eq!(session.cursor().row, 0);
        assert_eq!(session.primary().ddram[0x00], b'N');
        assert_eq!(session.secondary().unwrap().ddram[0x00], b' ');
    }

    #[test]
    fn test_wrap_standard_four_line_row_two_moves_to_row_three() {
        let mut session = sessions_for(20, 4);
        session.set_line_wrap(true);
        session.gotoxy(0, 2);
        for _ in 0..20 {
            session.put_char(b'x');
        }
        // 0x27 is followed by 0x40, the start of row 1
        assert_eq!(session.primary.address, 0x40);

        session.put_char(b'N');
        assert_eq!(session.cursor().row, 3);
        assert_eq!(session.primary().ddram[0x54], b'N');
        assert_eq!(session.primary().ddram[0x40], b' ');
    }

    #[test]
    fn test_no_wrap_writes_past_boundary() {
        let mut session = sessions_for(40, 4);
        session.gotoxy(0, 1);
        for _ in 0..40 {
            session.put_char(b'x');
        }
        session.primary.clear_log();
        session.secondary.as_mut().unwrap().clear_log();

        // Without wrap the counter runs on into row 0 like the bare part
        session.put_char(b'N');
        assert_eq!(session.primary().log.as_slice(), &[Op::Data(b'N')]);
        assert!(session.secondary().unwrap().log.is_empty());
        assert_eq!(session.cursor().controller, ControllerId::Primary);
        assert_eq!(session.primary().ddram[0x00], b'N');
    }

    #[test]
    fn test_newline_in_dual_mode() {
        let mut session = sessions_for(40, 4);
        session.gotoxy(3, 1);
        session.put_char(b'\n');
        assert_eq!(session.cursor().controller, ControllerId::Secondary);
        assert_eq!(session.cursor().row, 2);
        session.put_char(b'B');
        assert_eq!(session.secondary().unwrap().ddram[0x00], b'B');

        session.gotoxy(3, 3);
        session.put_char(b'\n');
        assert_eq!(session.cursor().controller, ControllerId::Primary);
        assert_eq!(session.cursor().row, 0);
        session.put_char(b'A');
        assert_eq!(session.primary().ddram[0x00], b'A');
    }

    #[test]
    fn test_carriage_return_ignored() {
        let mut session = single();
        session.primary.clear_log();
        session.put_char(b'\r');
        assert!(session.primary().log.is_empty());
    }

    #[test]
    fn test_clear_resets_cursor() {
        let mut session = sessions_for(40, 4);
        session.gotoxy(5, 3);
        session.secondary.as_mut().unwrap().clear_log();
        session.clear();
        assert_eq!(session.cursor(), CursorState::default());
        assert!(session.primary().has_command(0x01));
        assert!(session.secondary().unwrap().has_command(0x01));
    }

    #[test]
    fn test_home_keeps_text() {
        let mut session = single();
        session.put_str(b"abc");
        session.home();
        assert_eq!(session.primary().text_at(0, 3), b"abc");
        assert_eq!(active_address(&mut session), 0);
    }

    #[test]
    fn test_control_registers() {
        let mut session = single();
        session.set_cursor_visible(true);
        assert_eq!(session.display_control(), 0x0E);
        session.set_blink(true);
        assert_eq!(session.display_control(), 0x0F);
        session.set_display(false);
        assert_eq!(session.display_control(), 0x0B);
        assert!(session.primary().has_command(0x0B));

        session.set_entry_direction(TextDirection::RightToLeft);
        assert_eq!(session.entry_mode(), 0x04);
        session.set_autoscroll(true);
        assert_eq!(session.entry_mode(), 0x05);
        session.set_entry_direction(TextDirection::LeftToRight);
        assert_eq!(session.entry_mode(), 0x07);

        session.scroll(ScrollDirection::Right);
        assert!(session.primary().has_command(0x1C));
    }

    #[test]
    fn test_variant_toggle_sends_sequence_without_clear() {
        let mut session = sessions_for(20, 4);
        session.primary.clear_log();
        session.set_controller_variant(ControllerVariant::ExtendedFourLine);
        let sent: heapless::Vec<u8, 8> = session.primary().commands().collect();
        assert_eq!(sent.as_slice(), &[0x24, 0x09, 0x20]);

        session.gotoxy(0, 1);
        assert_eq!(active_address(&mut session), 0x20);
    }

    #[test]
    fn test_variant_extended_in_dual_keeps_two_line_function_set() {
        let mut session = sessions_for(40, 4);
        session.primary.clear_log();
        session.set_controller_variant(ControllerVariant::ExtendedFourLine);
        let sent: heapless::Vec<u8, 8> = session.primary().commands().collect();
        assert_eq!(sent.as_slice(), &[0x28]);
        assert_eq!(session.primary().mode, LineMode::Two);

        session.set_line_wrap(true);
        session.gotoxy(0, 1);
        assert_eq!(active_address(&mut session), 0x40);
        for _ in 0..40 {
            session.put_char(b'x');
        }
        session.put_char(b'N');
        assert_eq!(session.cursor().controller, ControllerId::Secondary);
        assert_eq!(session.secondary().unwrap().ddram[0x00], b'N');
    }

    #[test]
    fn test_raw_passthrough_goes_to_active() {
        let mut session = sessions_for(40, 4);
        session.gotoxy(0, 2);
        session.raw_data(b'R');
        session.raw_command(0x0F);
        assert_eq!(session.secondary().unwrap().ddram[0], b'R');
        assert!(session.secondary().unwrap().has_command(0x0F));
        assert_eq!(session.display_control(), 0x0C);
    }
}
