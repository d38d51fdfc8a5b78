//! Bus command dispatch

pub mod dispatcher;

pub use dispatcher::{Dispatcher, Reply, ADDRESS_BANNER};
