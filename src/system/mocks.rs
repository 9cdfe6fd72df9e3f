use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::audio::{DeviceDescriptor, RouteNotification};
use crate::system::traits::{
    AudioSystemInterface, FileSystemInterface, NotificationHandler, RouteNotificationSource,
};

/// Mock audio system for testing - provides a controllable current route
#[derive(Clone)]
pub struct MockAudioSystem {
    pub outputs: Arc<Mutex<Vec<DeviceDescriptor>>>,
    pub inputs: Arc<Mutex<Vec<DeviceDescriptor>>>,
    pub should_fail_enumeration: Arc<AtomicBool>,
    pub query_count: Arc<AtomicUsize>,
}

impl MockAudioSystem {
    pub fn new() -> Self {
        Self {
            outputs: Arc::new(Mutex::new(Vec::new())),
            inputs: Arc::new(Mutex::new(Vec::new())),
            should_fail_enumeration: Arc::new(AtomicBool::new(false)),
            query_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the outputs of the current route
    pub fn set_outputs(&self, outputs: Vec<DeviceDescriptor>) {
        *self.outputs.lock().unwrap() = outputs;
    }

    /// Replace the available input ports
    pub fn set_inputs(&self, inputs: Vec<DeviceDescriptor>) {
        *self.inputs.lock().unwrap() = inputs;
    }

    /// Configure the mock to behave as if the audio service is unavailable
    pub fn set_enumeration_failure(&self, should_fail: bool) {
        self.should_fail_enumeration
            .store(should_fail, Ordering::SeqCst);
    }

    /// Number of route queries made so far
    pub fn get_query_count(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }
}

impl AudioSystemInterface for MockAudioSystem {
    fn active_outputs(&self) -> Result<Vec<DeviceDescriptor>> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail_enumeration.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Mock audio service unavailable"));
        }
        Ok(self.outputs.lock().unwrap().clone())
    }

    fn available_inputs(&self) -> Result<Vec<DeviceDescriptor>> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail_enumeration.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Mock audio service unavailable"));
        }
        Ok(self.inputs.lock().unwrap().clone())
    }
}

impl Default for MockAudioSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock notification source - lets tests inject OS notifications, including
/// ones the OS delivers late after the subscription was removed
#[derive(Clone)]
pub struct MockRouteNotificationSource {
    pub handler: Arc<Mutex<Option<NotificationHandler>>>,
    pub stale_handler: Arc<Mutex<Option<NotificationHandler>>>,
    pub start_calls: Arc<AtomicUsize>,
    pub stop_calls: Arc<AtomicUsize>,
    pub should_fail_start: Arc<AtomicBool>,
}

impl MockRouteNotificationSource {
    pub fn new() -> Self {
        Self {
            handler: Arc::new(Mutex::new(None)),
            stale_handler: Arc::new(Mutex::new(None)),
            start_calls: Arc::new(AtomicUsize::new(0)),
            stop_calls: Arc::new(AtomicUsize::new(0)),
            should_fail_start: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Deliver a notification to the registered handler.
    /// Returns false when nothing is registered.
    pub fn deliver(&self, notification: RouteNotification) -> bool {
        let handler = self.handler.lock().unwrap().clone();
        match handler {
            Some(handler) => {
                handler(notification);
                true
            }
            None => false,
        }
    }

    /// Deliver a notification to the handler that was registered before the
    /// last stop, as an OS might when a delivery is already in flight
    pub fn deliver_late(&self, notification: RouteNotification) -> bool {
        let handler = self.stale_handler.lock().unwrap().clone();
        match handler {
            Some(handler) => {
                handler(notification);
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.handler.lock().unwrap().is_some()
    }

    pub fn get_start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn get_stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// Configure the mock to fail registration
    pub fn set_start_failure(&self, should_fail: bool) {
        self.should_fail_start.store(should_fail, Ordering::SeqCst);
    }
}

impl RouteNotificationSource for MockRouteNotificationSource {
    fn start(&self, handler: NotificationHandler) -> Result<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail_start.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Mock notification registration failure"));
        }
        *self.handler.lock().unwrap() = Some(handler);
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        let previous = self.handler.lock().unwrap().take();
        if previous.is_some() {
            *self.stale_handler.lock().unwrap() = previous;
        }
        Ok(())
    }
}

impl Default for MockRouteNotificationSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock file system for testing - provides controllable file operations
#[derive(Clone)]
pub struct MockFileSystem {
    pub files: Arc<Mutex<HashMap<PathBuf, String>>>,
    pub read_calls: Arc<Mutex<Vec<PathBuf>>>,
    pub write_calls: Arc<Mutex<Vec<(PathBuf, String)>>>,
    pub directory_creation_calls: Arc<Mutex<Vec<PathBuf>>>,
    pub should_fail_read: Arc<Mutex<bool>>,
    pub should_fail_write: Arc<Mutex<bool>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            read_calls: Arc::new(Mutex::new(Vec::new())),
            write_calls: Arc::new(Mutex::new(Vec::new())),
            directory_creation_calls: Arc::new(Mutex::new(Vec::new())),
            should_fail_read: Arc::new(Mutex::new(false)),
            should_fail_write: Arc::new(Mutex::new(false)),
        }
    }

    /// Add a file to the mock file system
    pub fn add_file<P: AsRef<Path>>(&self, path: P, content: String) {
        self.files
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), content);
    }

    /// Get all read calls that were made
    pub fn get_read_calls(&self) -> Vec<PathBuf> {
        self.read_calls.lock().unwrap().clone()
    }

    /// Get all write calls that were made
    pub fn get_write_calls(&self) -> Vec<(PathBuf, String)> {
        self.write_calls.lock().unwrap().clone()
    }

    /// Get all directory creation calls that were made
    pub fn get_directory_creation_calls(&self) -> Vec<PathBuf> {
        self.directory_creation_calls.lock().unwrap().clone()
    }

    /// Configure the mock to fail read operations
    pub fn set_read_failure(&self, should_fail: bool) {
        *self.should_fail_read.lock().unwrap() = should_fail;
    }

    /// Configure the mock to fail write operations
    pub fn set_write_failure(&self, should_fail: bool) {
        *self.should_fail_write.lock().unwrap() = should_fail;
    }

    /// Check if a file exists in the mock system
    pub fn file_exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.lock().unwrap().contains_key(path.as_ref())
    }
}

impl FileSystemInterface for MockFileSystem {
    fn read_config_file(&self, path: &Path) -> Result<String> {
        self.read_calls.lock().unwrap().push(path.to_path_buf());

        if *self.should_fail_read.lock().unwrap() {
            return Err(anyhow::anyhow!("Mock read failure"));
        }

        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("File not found: {}", path.display()))
    }

    fn write_config_file(&self, path: &Path, content: &str) -> Result<()> {
        self.write_calls
            .lock()
            .unwrap()
            .push((path.to_path_buf(), content.to_string()));

        if *self.should_fail_write.lock().unwrap() {
            return Err(anyhow::anyhow!("Mock write failure"));
        }

        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn config_file_exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn create_config_dir(&self, path: &Path) -> Result<()> {
        self.directory_creation_calls
            .lock()
            .unwrap()
            .push(path.to_path_buf());
        Ok(())
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}
