use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

use crate::system::{AudioSystemInterface, NotificationHandler, RouteNotificationSource};

use super::device::{DeviceDescriptor, DeviceRecord, PortType};
use super::normalizer::{identifier_of, normalize};
use super::notification::{BluetoothConnectionState, RouteChangeReason, RouteNotification};

/// Sink for records produced by the watcher
pub type EmitFn = Arc<dyn Fn(DeviceRecord) + Send + Sync>;

/// Route-change state machine.
///
/// Holds only the identifier of the last active output and turns each
/// notification into zero or more records. It reads the current route from
/// the audio system on demand and never emits `unknown` records.
#[derive(Debug, Default)]
pub struct RouteChangeTracker {
    last_active_device_id: Option<String>,
}

impl RouteChangeTracker {
    pub fn new(initial_output: Option<&DeviceDescriptor>) -> Self {
        Self {
            last_active_device_id: initial_output.map(identifier_of),
        }
    }

    pub fn last_active_device_id(&self) -> Option<&str> {
        self.last_active_device_id.as_deref()
    }

    pub fn process<A: AudioSystemInterface + ?Sized>(
        &mut self,
        notification: &RouteNotification,
        audio_system: &A,
    ) -> Vec<DeviceRecord> {
        match notification {
            RouteNotification::RouteChange {
                reason,
                previous_outputs,
            } => {
                let Some(reason) = reason else {
                    debug!("Ignoring route change without a recognised reason");
                    return Vec::new();
                };
                self.handle_route_change(*reason, previous_outputs.as_deref(), audio_system)
            }
            RouteNotification::Bluetooth {
                profile,
                state,
                device,
            } => {
                let (Some(state), Some(device)) = (state, device) else {
                    debug!("Ignoring Bluetooth notification with missing state or device");
                    return Vec::new();
                };

                let is_connected = match state {
                    BluetoothConnectionState::Connected => true,
                    BluetoothConnectionState::Disconnected => false,
                    BluetoothConnectionState::Connecting
                    | BluetoothConnectionState::Disconnecting => {
                        debug!("Ignoring transitional Bluetooth state {:?}", state);
                        return Vec::new();
                    }
                };

                let descriptor = DeviceDescriptor {
                    display_name: device.name.clone(),
                    identifier: Some(device.address.clone()),
                    port_type: PortType::AndroidBluetooth(*profile),
                };
                emit_known(normalize(&descriptor, is_connected))
            }
            RouteNotification::HeadsetPlug { state, microphone } => {
                let is_connected = match state {
                    Some(1) => true,
                    Some(0) => false,
                    other => {
                        debug!("Ignoring headset plug notification with state {:?}", other);
                        return Vec::new();
                    }
                };

                let descriptor = DeviceDescriptor::new(PortType::WiredPlug {
                    microphone: *microphone == Some(1),
                });
                emit_known(normalize(&descriptor, is_connected))
            }
        }
    }

    fn handle_route_change<A: AudioSystemInterface + ?Sized>(
        &mut self,
        reason: RouteChangeReason,
        previous_outputs: Option<&[DeviceDescriptor]>,
        audio_system: &A,
    ) -> Vec<DeviceRecord> {
        match reason {
            RouteChangeReason::NewDeviceAvailable | RouteChangeReason::CategoryChange => {
                let Some(current) = read_current_output(audio_system) else {
                    return Vec::new();
                };

                let id = identifier_of(&current);
                if self.last_active_device_id.as_deref() == Some(id.as_str()) {
                    debug!("Route unchanged ({}), nothing to report", id);
                    return Vec::new();
                }

                self.last_active_device_id = Some(id);
                emit_known(normalize(&current, true))
            }
            RouteChangeReason::OldDeviceUnavailable => {
                let mut records = Vec::new();

                // The departed device is always announced, even with no replacement
                if let Some(old) = previous_outputs.and_then(|outputs| outputs.first()) {
                    records.extend(emit_known(normalize(old, false)));
                }

                if let Some(fallback) = read_current_output(audio_system) {
                    self.last_active_device_id = Some(identifier_of(&fallback));
                    records.extend(emit_known(normalize(&fallback, true)));
                }

                records
            }
            RouteChangeReason::Unknown
            | RouteChangeReason::Override
            | RouteChangeReason::WakeFromSleep
            | RouteChangeReason::NoSuitableRouteForCategory
            | RouteChangeReason::RouteConfigurationChange => {
                debug!("Ignoring route change reason {:?}", reason);
                Vec::new()
            }
        }
    }
}

fn read_current_output<A: AudioSystemInterface + ?Sized>(
    audio_system: &A,
) -> Option<DeviceDescriptor> {
    match audio_system.current_output() {
        Ok(output) => output,
        Err(e) => {
            warn!("Failed to read current audio route: {}", e);
            None
        }
    }
}

fn emit_known(record: DeviceRecord) -> Vec<DeviceRecord> {
    if record.protocol.is_known() {
        vec![record]
    } else {
        debug!("Dropping record with unmapped protocol: {}", record.address);
        Vec::new()
    }
}

struct WatcherShared {
    active: AtomicBool,
    // Bumped by every start; a handler only acts for the registration that created it
    generation: AtomicU64,
    tracker: Mutex<Option<RouteChangeTracker>>,
}

/// Subscribes to a notification source and forwards normalized records.
pub struct RouteChangeWatcher<A: AudioSystemInterface, N: RouteNotificationSource> {
    audio_system: Arc<A>,
    source: N,
    shared: Arc<WatcherShared>,
}

impl WatcherShared {
    fn is_current(&self, generation: u64) -> bool {
        self.active.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
    }
}

impl<A: AudioSystemInterface + 'static, N: RouteNotificationSource> RouteChangeWatcher<A, N> {
    pub fn new(audio_system: Arc<A>, source: N) -> Self {
        Self {
            audio_system,
            source,
            shared: Arc::new(WatcherShared {
                active: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                tracker: Mutex::new(None),
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Identifier of the output the watcher last reported as active
    pub fn last_active_device_id(&self) -> Option<String> {
        self.shared
            .tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|tracker| tracker.last_active_device_id().map(str::to_string))
    }

    /// Start listening. State is seeded from the route active right now.
    pub fn start(&self, emit: EmitFn) -> Result<()> {
        if self.is_running() {
            debug!("Route change watcher already running");
            return Ok(());
        }

        let initial = read_current_output(self.audio_system.as_ref());
        info!(
            "Starting route change watcher (active output: {})",
            initial
                .as_ref()
                .map(identifier_of)
                .unwrap_or_else(|| "none".to_string())
        );

        *self
            .shared
            .tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner) =
            Some(RouteChangeTracker::new(initial.as_ref()));
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.active.store(true, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let audio_system = Arc::clone(&self.audio_system);
        let handler: NotificationHandler = Arc::new(move |notification| {
            if !shared.is_current(generation) {
                debug!("Dropping notification from a stopped registration");
                return;
            }

            let mut guard = shared.tracker.lock().unwrap_or_else(PoisonError::into_inner);
            // stop() or a restart may have won the race for the lock
            if !shared.is_current(generation) {
                return;
            }
            let Some(tracker) = guard.as_mut() else {
                return;
            };

            debug!("Handling route notification: {:?}", notification);
            for record in tracker.process(&notification, audio_system.as_ref()) {
                info!("Audio route event: {}", record);
                emit(record);
            }
        });

        if let Err(e) = self.source.start(handler) {
            self.shared.active.store(false, Ordering::SeqCst);
            *self
                .shared
                .tracker
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = None;
            return Err(e).context("Failed to register for route change notifications");
        }

        Ok(())
    }

    /// Stop listening and clear state. Any handler already running finishes
    /// before this returns; later deliveries are ignored.
    pub fn stop(&self) -> Result<()> {
        let was_running = self.shared.active.swap(false, Ordering::SeqCst);

        *self
            .shared
            .tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;

        if was_running {
            info!("Stopping route change watcher");
            self.source
                .stop()
                .context("Failed to unregister route change notifications")?;
        }

        Ok(())
    }
}

impl<A: AudioSystemInterface, N: RouteNotificationSource> Drop for RouteChangeWatcher<A, N> {
    fn drop(&mut self) {
        if self.shared.active.swap(false, Ordering::SeqCst) {
            if let Err(e) = self.source.stop() {
                warn!("Failed to unregister route change notifications: {}", e);
            }
        }
    }
}
