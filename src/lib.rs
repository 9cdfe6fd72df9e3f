pub mod audio;
pub mod bridge;
pub mod config;
pub mod logging;
pub mod platform;
pub mod service;
pub mod system;

pub use audio::{DeviceDescriptor, DeviceRecord, Protocol, RouteNotification};
pub use bridge::{BridgeAdapter, EventSubscription, MethodResponse};
pub use config::{Config, ConfigLoader};
pub use system::{AudioSystemInterface, FileSystemInterface, RouteNotificationSource};

#[cfg(target_os = "macos")]
pub use system::{CoreAudioRouteSource, CoreAudioSystem};

#[cfg(any(test, feature = "test-mocks"))]
pub use system::{MockAudioSystem, MockFileSystem, MockRouteNotificationSource};
