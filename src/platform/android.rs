//! Android payloads: `AudioDeviceInfo` entries from `AudioManager.getDevices`
//! and the connection broadcasts a receiver is registered for.

use std::collections::HashMap;

use crate::audio::{
    AndroidDeviceType, BluetoothConnectionState, BluetoothDevice, BluetoothProfile,
    DeviceDescriptor, PortType, RouteNotification,
};

pub const ACTION_A2DP_CONNECTION_STATE_CHANGED: &str =
    "android.bluetooth.a2dp.profile.action.CONNECTION_STATE_CHANGED";
pub const ACTION_HEADSET_CONNECTION_STATE_CHANGED: &str =
    "android.bluetooth.headset.profile.action.CONNECTION_STATE_CHANGED";
pub const ACTION_HEADSET_PLUG: &str = "android.intent.action.HEADSET_PLUG";

pub const EXTRA_DEVICE: &str = "android.bluetooth.device.extra.DEVICE";
pub const EXTRA_STATE: &str = "android.bluetooth.profile.extra.STATE";
pub const EXTRA_PLUG_STATE: &str = "state";
pub const EXTRA_MICROPHONE: &str = "microphone";

/// Actions a receiver has to subscribe to
pub const RECEIVER_ACTIONS: [&str; 3] = [
    ACTION_A2DP_CONNECTION_STATE_CHANGED,
    ACTION_HEADSET_CONNECTION_STATE_CHANGED,
    ACTION_HEADSET_PLUG,
];

/// The fields of an `AudioDeviceInfo` the normalizer needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDeviceInfo {
    pub type_code: i32,
    pub product_name: Option<String>,
    pub address: Option<String>,
}

impl AudioDeviceInfo {
    pub fn to_descriptor(&self) -> DeviceDescriptor {
        DeviceDescriptor {
            display_name: self.product_name.clone(),
            identifier: self.address.clone(),
            port_type: PortType::Android(AndroidDeviceType::from_raw(self.type_code)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extra {
    Int(i32),
    Text(String),
    Device(BluetoothDevice),
}

/// A received broadcast intent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent {
    pub action: String,
    pub extras: HashMap<String, Extra>,
}

impl Intent {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            extras: HashMap::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Extra) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    fn int_extra(&self, key: &str) -> Option<i32> {
        match self.extras.get(key) {
            Some(Extra::Int(value)) => Some(*value),
            _ => None,
        }
    }

    fn device_extra(&self, key: &str) -> Option<BluetoothDevice> {
        match self.extras.get(key) {
            Some(Extra::Device(device)) => Some(device.clone()),
            _ => None,
        }
    }
}

/// Lift a broadcast into a notification. `None` for actions we don't handle.
///
/// Extras of the wrong kind are treated as absent, so the watcher sees a
/// malformed notification and ignores it.
pub fn notification_from_intent(intent: &Intent) -> Option<RouteNotification> {
    let profile = match intent.action.as_str() {
        ACTION_A2DP_CONNECTION_STATE_CHANGED => BluetoothProfile::A2dp,
        ACTION_HEADSET_CONNECTION_STATE_CHANGED => BluetoothProfile::Headset,
        ACTION_HEADSET_PLUG => {
            return Some(RouteNotification::HeadsetPlug {
                state: intent.int_extra(EXTRA_PLUG_STATE),
                microphone: intent.int_extra(EXTRA_MICROPHONE),
            });
        }
        _ => return None,
    };

    Some(RouteNotification::Bluetooth {
        profile,
        state: intent
            .int_extra(EXTRA_STATE)
            .and_then(BluetoothConnectionState::from_raw),
        device: intent.device_extra(EXTRA_DEVICE),
    })
}
