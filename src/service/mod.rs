#[cfg(unix)]
pub mod signals;

#[cfg(unix)]
pub use signals::{SignalHandler, SignalType};
