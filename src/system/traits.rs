use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::audio::{DeviceDescriptor, RouteNotification};

/// Callback a notification source invokes on its own delivery context.
pub type NotificationHandler = Arc<dyn Fn(RouteNotification) + Send + Sync>;

/// Trait for audio routing queries - abstracts CoreAudio, AVAudioSession and AudioManager
pub trait AudioSystemInterface: Send + Sync {
    /// Outputs of the current route, primary output first
    fn active_outputs(&self) -> Result<Vec<DeviceDescriptor>>;

    /// Input ports that are connected but not necessarily routed.
    /// Only platforms that cannot list idle outputs report anything here.
    fn available_inputs(&self) -> Result<Vec<DeviceDescriptor>> {
        Ok(Vec::new())
    }

    /// Primary output of the current route, if any
    fn current_output(&self) -> Result<Option<DeviceDescriptor>> {
        Ok(self.active_outputs()?.into_iter().next())
    }
}

/// Trait for OS route-change subscriptions with an explicit start/stop lifecycle
pub trait RouteNotificationSource: Send + Sync {
    /// Begin delivering notifications to `handler`
    fn start(&self, handler: NotificationHandler) -> Result<()>;

    /// Stop delivering notifications. Once this returns the handler is no
    /// longer registered with the OS.
    fn stop(&self) -> Result<()>;
}

/// Trait for file system operations - abstracts std::fs for testability
pub trait FileSystemInterface {
    /// Read the entire contents of a configuration file
    fn read_config_file(&self, path: &Path) -> Result<String>;

    /// Write configuration content to a file
    fn write_config_file(&self, path: &Path, content: &str) -> Result<()>;

    /// Check if a configuration file exists
    fn config_file_exists(&self, path: &Path) -> bool;

    /// Create the directory structure for config files
    fn create_config_dir(&self, path: &Path) -> Result<()>;
}

impl<T: AudioSystemInterface + ?Sized> AudioSystemInterface for Arc<T> {
    fn active_outputs(&self) -> Result<Vec<DeviceDescriptor>> {
        (**self).active_outputs()
    }

    fn available_inputs(&self) -> Result<Vec<DeviceDescriptor>> {
        (**self).available_inputs()
    }

    fn current_output(&self) -> Result<Option<DeviceDescriptor>> {
        (**self).current_output()
    }
}

impl<T: RouteNotificationSource + ?Sized> RouteNotificationSource for Arc<T> {
    fn start(&self, handler: NotificationHandler) -> Result<()> {
        (**self).start(handler)
    }

    fn stop(&self) -> Result<()> {
        (**self).stop()
    }
}
