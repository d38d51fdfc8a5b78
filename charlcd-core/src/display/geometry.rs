//! Display geometry model
//!
//! Pure mapping from logical (column, row) positions to the controller that
//! owns the row and the DDRAM address inside that controller.
//!
//! DDRAM layouts:
//!
//! | geometry                 | row 0        | row 1        | row 2        | row 3        |
//! |--------------------------|--------------|--------------|--------------|--------------|
//! | 1 line                   | A `0x00`     | -            | -            | -            |
//! | 2 lines                  | A `0x00`     | A `0x40`     | -            | -            |
//! | 4 lines, Standard        | A `0x00`     | A `0x40`     | A `0x14`     | A `0x54`     |
//! | 4 lines, ExtendedFourLine| A `0x00`     | A `0x20`     | A `0x40`     | A `0x60`     |
//! | 40x4, dual               | A `0x00`     | A `0x40`     | B `0x00`     | B `0x40`     |
//!
//! In two-line mode the address counter skips the gap between the lines:
//! `0x27` is followed by `0x40` and `0x67` by `0x00`. One-line mode runs
//! `0x00..=0x4F` and then restarts at `0x00`.
//!
//! Row ends therefore often coincide with another row's start: the end of
//! row 0 on a Standard four-line panel (`0x14`) is the start of row 2, and
//! the end of a 40 column second line is `0x00`. An address alone does not
//! identify a row, so [`Geometry::row_at`] takes the last addressed row as
//! a hint to resolve that.

use crate::config::{ControllerVariant, DisplayConfig};

const TWO_LINE_STARTS: [u8; 2] = [0x00, 0x40];
const STANDARD_FOUR_LINE_STARTS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];
const EXTENDED_FOUR_LINE_STARTS: [u8; 4] = [0x00, 0x20, 0x40, 0x60];

/// One past the last address of each line in two-line mode
const TWO_LINE_LIMITS: [u8; 2] = [0x28, 0x68];

/// One past the last address in one-line mode
const ONE_LINE_LIMIT: u8 = 0x50;

/// Physical controller selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerId {
    /// First controller (enable line E1); the only one outside dual mode
    #[default]
    Primary,
    /// Second controller (enable line E2), rows 2 and 3 of a 40x4
    Secondary,
}

impl ControllerId {
    /// The other controller
    pub fn other(self) -> Self {
        match self {
            ControllerId::Primary => ControllerId::Secondary,
            ControllerId::Secondary => ControllerId::Primary,
        }
    }
}

/// A DDRAM address on a specific controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub controller: ControllerId,
    pub address: u8,
}

/// Geometry snapshot taken from a [`DisplayConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    columns: u8,
    rows: u8,
    variant: ControllerVariant,
    dual: bool,
}

impl From<&DisplayConfig> for Geometry {
    fn from(config: &DisplayConfig) -> Self {
        Self {
            columns: config.columns(),
            rows: config.rows(),
            variant: config.variant(),
            dual: config.dual_controller(),
        }
    }
}

impl Geometry {
    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    /// Rows past the last one address the last row
    fn clamp_row(&self, row: u8) -> u8 {
        row.min(self.rows.saturating_sub(1))
    }

    /// Controller that owns a row
    pub fn controller_of(&self, row: u8) -> ControllerId {
        if self.dual && self.clamp_row(row) >= 2 {
            ControllerId::Secondary
        } else {
            ControllerId::Primary
        }
    }

    /// First address of a row
    pub fn line_start(&self, row: u8) -> Position {
        let row = self.clamp_row(row);
        let address = match self.rows {
            1 => 0x00,
            2 => TWO_LINE_STARTS[row as usize],
            _ if self.dual => TWO_LINE_STARTS[(row % 2) as usize],
            _ => match self.variant {
                ControllerVariant::Standard => STANDARD_FOUR_LINE_STARTS[row as usize],
                ControllerVariant::ExtendedFourLine => EXTENDED_FOUR_LINE_STARTS[row as usize],
            },
        };
        Position {
            controller: self.controller_of(row),
            address,
        }
    }

    /// Address of (column, row)
    ///
    /// The column is not clamped: addressing past the visible width lands
    /// in off-screen DDRAM exactly as the controller would.
    pub fn locate(&self, column: u8, row: u8) -> Position {
        let start = self.line_start(row);
        Position {
            address: start.address.wrapping_add(column),
            ..start
        }
    }

    /// Whether the controller owning the rows runs with two-line addressing
    fn two_line_counter(&self) -> bool {
        match self.rows {
            1 => false,
            2 => true,
            _ => self.dual || self.variant == ControllerVariant::Standard,
        }
    }

    /// Address the counter reports after the last visible column of a row
    pub fn line_end(&self, row: u8) -> u8 {
        let end = self.line_start(row).address.wrapping_add(self.columns) & 0x7F;
        if self.two_line_counter() {
            match TWO_LINE_LIMITS.iter().position(|&limit| limit == end) {
                Some(line) => TWO_LINE_STARTS[(line + 1) % 2],
                None => end,
            }
        } else if self.rows == 1 && end == ONE_LINE_LIMIT {
            0x00
        } else {
            end
        }
    }

    /// Check whether `address` is the wrap boundary of `row`
    pub fn is_line_end(&self, row: u8, address: u8) -> bool {
        self.line_end(row) == address
    }

    /// Row following `row`; the last row wraps to row 0
    pub fn next_row(&self, row: u8) -> u8 {
        (self.clamp_row(row) + 1) % self.rows.max(1)
    }

    /// Check whether `address` is one of the visible cells of `row`
    fn contains(&self, row: u8, address: u8) -> bool {
        let start = self.line_start(row).address as u16;
        (start..start + self.columns as u16).contains(&(address as u16))
    }

    /// Row containing an address on a controller
    ///
    /// The hint wins whenever the address lies inside it or on its end
    /// boundary. Otherwise a row that strictly contains the address is
    /// preferred over one that merely ends there. Falls back to the hint
    /// when nothing matches (off-screen addresses).
    pub fn row_at(&self, controller: ControllerId, address: u8, hint: u8) -> u8 {
        let hint = self.clamp_row(hint);
        let owned = |row: &u8| self.controller_of(*row) == controller;

        if owned(&hint) && (self.contains(hint, address) || self.is_line_end(hint, address)) {
            return hint;
        }

        (0..self.rows)
            .filter(owned)
            .find(|&row| self.contains(row, address))
            .or_else(|| {
                (0..self.rows)
                    .filter(owned)
                    .find(|&row| self.is_line_end(row, address))
            })
            .unwrap_or(hint)
    }
}
