use anyhow::Result;
use core_foundation::base::TCFType;
use core_foundation::string::CFString;
use core_foundation_sys::string::CFStringRef;
use coreaudio_sys::*;
use std::os::raw::c_void;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::audio::{DeviceDescriptor, PortType, TransportType};
use crate::platform::macos::{RetiredQueue, RouteSnapshot, route_change_between};
use crate::system::traits::{AudioSystemInterface, NotificationHandler, RouteNotificationSource};

const DATA_SOURCE_HEADPHONES: u32 = u32::from_be_bytes(*b"hdpn");

// Long enough for any HAL callback dispatched before removal to finish
const LISTENER_RETIRE_GRACE: Duration = Duration::from_secs(5);

fn property_address(
    selector: AudioObjectPropertySelector,
    scope: AudioObjectPropertyScope,
) -> AudioObjectPropertyAddress {
    AudioObjectPropertyAddress {
        mSelector: selector,
        mScope: scope,
        mElement: kAudioObjectPropertyElementMain,
    }
}

fn get_u32_property(object: AudioObjectID, address: &AudioObjectPropertyAddress) -> Result<u32> {
    let mut value: u32 = 0;
    let mut property_size = std::mem::size_of::<u32>() as u32;

    let result = unsafe {
        AudioObjectGetPropertyData(
            object,
            address,
            0,
            ptr::null(),
            &mut property_size,
            &mut value as *mut u32 as *mut c_void,
        )
    };

    if result != kAudioHardwareNoError as i32 {
        return Err(anyhow::anyhow!(
            "Failed to read property {:#x} of object {}: {}",
            address.mSelector,
            object,
            result
        ));
    }
    Ok(value)
}

fn get_string_property(
    object: AudioObjectID,
    address: &AudioObjectPropertyAddress,
) -> Result<String> {
    let mut cf_string: CFStringRef = ptr::null();
    let mut property_size = std::mem::size_of::<CFStringRef>() as u32;

    let result = unsafe {
        AudioObjectGetPropertyData(
            object,
            address,
            0,
            ptr::null(),
            &mut property_size,
            &mut cf_string as *mut _ as *mut c_void,
        )
    };

    if result != kAudioHardwareNoError as i32 {
        return Err(anyhow::anyhow!(
            "Failed to read string property {:#x} of object {}: {}",
            address.mSelector,
            object,
            result
        ));
    }

    if cf_string.is_null() {
        return Err(anyhow::anyhow!("String property of object {} is null", object));
    }

    // The HAL hands out a retained string
    let cf_string = unsafe { CFString::wrap_under_create_rule(cf_string) };
    Ok(cf_string.to_string())
}

fn device_ids() -> Result<Vec<AudioDeviceID>> {
    let address = property_address(
        kAudioHardwarePropertyDevices,
        kAudioObjectPropertyScopeGlobal,
    );

    let mut property_size: u32 = 0;
    let result = unsafe {
        AudioObjectGetPropertyDataSize(
            kAudioObjectSystemObject,
            &address,
            0,
            ptr::null(),
            &mut property_size,
        )
    };

    if result != kAudioHardwareNoError as i32 {
        return Err(anyhow::anyhow!("Failed to get device list size: {}", result));
    }

    let device_count = property_size as usize / std::mem::size_of::<AudioDeviceID>();
    let mut devices: Vec<AudioDeviceID> = vec![0; device_count];

    let result = unsafe {
        AudioObjectGetPropertyData(
            kAudioObjectSystemObject,
            &address,
            0,
            ptr::null(),
            &mut property_size,
            devices.as_mut_ptr() as *mut c_void,
        )
    };

    if result != kAudioHardwareNoError as i32 {
        return Err(anyhow::anyhow!("Failed to get device list: {}", result));
    }

    devices.truncate(property_size as usize / std::mem::size_of::<AudioDeviceID>());
    Ok(devices)
}

fn has_output_streams(device_id: AudioDeviceID) -> bool {
    let address = property_address(kAudioDevicePropertyStreams, kAudioObjectPropertyScopeOutput);

    let mut property_size: u32 = 0;
    let result = unsafe {
        AudioObjectGetPropertyDataSize(device_id, &address, 0, ptr::null(), &mut property_size)
    };

    result == kAudioHardwareNoError as i32 && property_size > 0
}

fn descriptor_for(device_id: AudioDeviceID) -> DeviceDescriptor {
    let transport = get_u32_property(
        device_id,
        &property_address(
            kAudioDevicePropertyTransportType,
            kAudioObjectPropertyScopeGlobal,
        ),
    )
    .map(TransportType::from_raw)
    .unwrap_or(TransportType::Other(0));

    // Built-in outputs switch between speaker and jack through their data source
    let headphones = transport == TransportType::BuiltIn
        && get_u32_property(
            device_id,
            &property_address(kAudioDevicePropertyDataSource, kAudioObjectPropertyScopeOutput),
        )
        .map(|source| source == DATA_SOURCE_HEADPHONES)
        .unwrap_or(false);

    let name = get_string_property(
        device_id,
        &property_address(
            kAudioDevicePropertyDeviceNameCFString,
            kAudioObjectPropertyScopeGlobal,
        ),
    )
    .map_err(|e| debug!("No name for device {}: {}", device_id, e))
    .ok();

    let uid = get_string_property(
        device_id,
        &property_address(kAudioDevicePropertyDeviceUID, kAudioObjectPropertyScopeGlobal),
    )
    .map_err(|e| debug!("No UID for device {}: {}", device_id, e))
    .ok();

    DeviceDescriptor {
        display_name: name,
        identifier: uid,
        port_type: PortType::CoreAudio {
            transport,
            headphones,
        },
    }
}

fn default_output_id() -> Result<Option<AudioDeviceID>> {
    let device_id = get_u32_property(
        kAudioObjectSystemObject,
        &property_address(
            kAudioHardwarePropertyDefaultOutputDevice,
            kAudioObjectPropertyScopeGlobal,
        ),
    )?;

    if device_id == kAudioObjectUnknown {
        Ok(None)
    } else {
        Ok(Some(device_id))
    }
}

/// Production implementation of AudioSystemInterface using CoreAudio.
///
/// Every output-capable device counts as routable; the default output is
/// the primary output of the current route.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreAudioSystem;

impl CoreAudioSystem {
    pub fn new() -> Self {
        info!("Initialized CoreAudio audio system");
        Self
    }

    fn snapshot(&self) -> Result<RouteSnapshot> {
        Ok(RouteSnapshot {
            outputs: self.active_outputs()?,
            default_output: self.current_output()?,
        })
    }
}

impl AudioSystemInterface for CoreAudioSystem {
    fn active_outputs(&self) -> Result<Vec<DeviceDescriptor>> {
        let default_id = default_output_id()?;

        let mut output_ids: Vec<AudioDeviceID> = device_ids()?
            .into_iter()
            .filter(|&id| has_output_streams(id))
            .collect();

        // Current route first, then the rest in HAL order
        if let Some(default_id) = default_id {
            if let Some(position) = output_ids.iter().position(|&id| id == default_id) {
                let id = output_ids.remove(position);
                output_ids.insert(0, id);
            }
        }

        debug!("Found {} CoreAudio output devices", output_ids.len());
        Ok(output_ids.into_iter().map(descriptor_for).collect())
    }

    fn current_output(&self) -> Result<Option<DeviceDescriptor>> {
        Ok(default_output_id()?.map(descriptor_for))
    }
}

struct ListenerContext {
    audio_system: CoreAudioSystem,
    handler: NotificationHandler,
    active: AtomicBool,
    snapshot: Mutex<RouteSnapshot>,
}

impl ListenerContext {
    fn handle_property_change(&self) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }

        let current = match self.audio_system.snapshot() {
            Ok(current) => current,
            Err(e) => {
                warn!("Failed to read audio route after change: {}", e);
                return;
            }
        };

        let notification = {
            let mut previous = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
            let notification = route_change_between(&previous, &current);
            *previous = current;
            notification
        };

        if let Some(notification) = notification {
            debug!("CoreAudio route change: {:?}", notification);
            (self.handler)(notification);
        }
    }
}

/// Production implementation of RouteNotificationSource using HAL property listeners
pub struct CoreAudioRouteSource {
    device_list_address: AudioObjectPropertyAddress,
    default_output_address: AudioObjectPropertyAddress,
    registered: Mutex<Option<Arc<ListenerContext>>>,
    // Contexts whose listeners were removed. A callback the HAL had already
    // dispatched may still hold a pointer to one.
    retired: Mutex<RetiredQueue<Arc<ListenerContext>>>,
}

impl CoreAudioRouteSource {
    pub fn new() -> Self {
        Self {
            device_list_address: property_address(
                kAudioHardwarePropertyDevices,
                kAudioObjectPropertyScopeGlobal,
            ),
            default_output_address: property_address(
                kAudioHardwarePropertyDefaultOutputDevice,
                kAudioObjectPropertyScopeGlobal,
            ),
            registered: Mutex::new(None),
            retired: Mutex::new(RetiredQueue::new(LISTENER_RETIRE_GRACE)),
        }
    }

    fn retire(&self, context: Arc<ListenerContext>) {
        context.active.store(false, Ordering::SeqCst);
        self.remove_listeners(&context);
        self.retired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retire(context, Instant::now());
    }

    fn remove_listeners(&self, context: &Arc<ListenerContext>) {
        let client_data = Arc::as_ptr(context) as *mut c_void;

        for address in [&self.device_list_address, &self.default_output_address] {
            let result = unsafe {
                AudioObjectRemovePropertyListener(
                    kAudioObjectSystemObject,
                    address,
                    Some(route_property_listener),
                    client_data,
                )
            };
            if result != kAudioHardwareNoError as i32 {
                warn!(
                    "Failed to remove property listener {:#x}: {}",
                    address.mSelector, result
                );
            }
        }
    }
}

impl Default for CoreAudioRouteSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteNotificationSource for CoreAudioRouteSource {
    fn start(&self, handler: NotificationHandler) -> Result<()> {
        info!("Registering CoreAudio property listeners");

        let audio_system = CoreAudioSystem::new();
        let context = Arc::new(ListenerContext {
            snapshot: Mutex::new(audio_system.snapshot().unwrap_or_default()),
            audio_system,
            handler,
            active: AtomicBool::new(true),
        });
        let client_data = Arc::as_ptr(&context) as *mut c_void;

        for address in [&self.device_list_address, &self.default_output_address] {
            let result = unsafe {
                AudioObjectAddPropertyListener(
                    kAudioObjectSystemObject,
                    address,
                    Some(route_property_listener),
                    client_data,
                )
            };

            if result != kAudioHardwareNoError as i32 {
                error!(
                    "Failed to register property listener {:#x}: {}",
                    address.mSelector, result
                );
                self.retire(context);
                return Err(anyhow::anyhow!(
                    "Failed to register CoreAudio property listener: {}",
                    result
                ));
            }
        }

        let previous = self
            .registered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(context);
        if let Some(previous) = previous {
            self.retire(previous);
        }

        info!("CoreAudio property listeners registered successfully");
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let context = self
            .registered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(context) = context {
            info!("Removing CoreAudio property listeners");
            self.retire(context);
        }

        Ok(())
    }
}

impl Drop for CoreAudioRouteSource {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to remove CoreAudio property listeners: {}", e);
        }
    }
}

unsafe extern "C" fn route_property_listener(
    _in_object_id: AudioObjectID,
    _in_number_addresses: UInt32,
    _in_addresses: *const AudioObjectPropertyAddress,
    in_client_data: *mut c_void,
) -> OSStatus {
    if !in_client_data.is_null() {
        let context = unsafe { &*(in_client_data as *const ListenerContext) };
        context.handle_property_change();
    }
    kAudioHardwareNoError as i32
}
