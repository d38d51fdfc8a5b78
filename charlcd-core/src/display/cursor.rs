//! Cursor state machine
//!
//! Tracks which controller receives characters and which logical row was
//! last addressed. The hardware address counter stays the source of truth
//! for the column; the row is only a hint used to resolve addresses shared
//! by two rows.

use super::geometry::{ControllerId, Geometry};

/// Line within the owning controller's two-line window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Half {
    #[default]
    Top,
    Bottom,
}

/// Cursor movement events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CursorEvent {
    /// Clear, home or reconfigure
    Origin,
    /// Explicit positioning onto a row
    Goto(u8),
    /// Line feed from the given row (explicit `\n` or wrap)
    Newline { from: u8 },
    /// Cursor found on a row by reading the address counter
    Observed(u8),
}

/// Cursor tracking state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CursorState {
    /// Controller receiving characters
    pub controller: ControllerId,
    /// Line within that controller
    pub half: Half,
    /// Logical row last addressed
    pub row: u8,
}

impl CursorState {
    /// State for the cursor sitting on `row`
    pub fn on_row(geometry: &Geometry, row: u8) -> Self {
        let row = row.min(geometry.rows().saturating_sub(1));
        Self {
            controller: geometry.controller_of(row),
            half: if row % 2 == 0 { Half::Top } else { Half::Bottom },
            row,
        }
    }

    /// Process an event and return the next state
    ///
    /// In dual mode this is where the active controller flips: going to
    /// rows 2-3 selects the second controller, a line feed from row 1
    /// moves onto it and a line feed from row 3 returns to the first.
    pub fn transition(self, event: CursorEvent, geometry: &Geometry) -> Self {
        match event {
            CursorEvent::Origin => Self::on_row(geometry, 0),
            CursorEvent::Goto(row) | CursorEvent::Observed(row) => Self::on_row(geometry, row),
            CursorEvent::Newline { from } => Self::on_row(geometry, geometry.next_row(from)),
        }
    }
}
