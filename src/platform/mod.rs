//! Per-platform adapters that turn native payloads into
//! [`DeviceDescriptor`](crate::audio::DeviceDescriptor) and
//! [`RouteNotification`](crate::audio::RouteNotification) values.

pub mod android;
pub mod ios;
pub mod macos;
