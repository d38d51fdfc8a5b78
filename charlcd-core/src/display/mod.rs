//! Logical display
//!
//! One or two HD44780-class controllers presented as a single display.

pub mod cursor;
pub mod geometry;
pub mod registers;
pub mod session;

pub use cursor::{CursorEvent, CursorState, Half};
pub use geometry::{ControllerId, Geometry, Position};
pub use session::DisplaySession;
