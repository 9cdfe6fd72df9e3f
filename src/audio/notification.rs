use super::device::{BluetoothProfile, DeviceDescriptor};

/// Why the OS says the audio route changed. Raw values follow
/// `AVAudioSession.RouteChangeReason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteChangeReason {
    Unknown,
    NewDeviceAvailable,
    OldDeviceUnavailable,
    CategoryChange,
    Override,
    WakeFromSleep,
    NoSuitableRouteForCategory,
    RouteConfigurationChange,
}

impl RouteChangeReason {
    pub fn from_raw(value: u64) -> Option<Self> {
        match value {
            0 => Some(RouteChangeReason::Unknown),
            1 => Some(RouteChangeReason::NewDeviceAvailable),
            2 => Some(RouteChangeReason::OldDeviceUnavailable),
            3 => Some(RouteChangeReason::CategoryChange),
            4 => Some(RouteChangeReason::Override),
            6 => Some(RouteChangeReason::WakeFromSleep),
            7 => Some(RouteChangeReason::NoSuitableRouteForCategory),
            8 => Some(RouteChangeReason::RouteConfigurationChange),
            _ => None,
        }
    }
}

/// `BluetoothProfile.STATE_*` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BluetoothConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl BluetoothConnectionState {
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(BluetoothConnectionState::Disconnected),
            1 => Some(BluetoothConnectionState::Connecting),
            2 => Some(BluetoothConnectionState::Connected),
            3 => Some(BluetoothConnectionState::Disconnecting),
            _ => None,
        }
    }
}

/// A Bluetooth peer as carried in a connection-state broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BluetoothDevice {
    pub name: Option<String>,
    pub address: String,
}

/// One OS notification, already lifted out of its platform container.
///
/// Fields that the platform may omit are optional; the watcher ignores a
/// notification whose required fields are missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteNotification {
    RouteChange {
        reason: Option<RouteChangeReason>,
        /// Outputs of the route that was active before the change, primary first.
        previous_outputs: Option<Vec<DeviceDescriptor>>,
    },
    Bluetooth {
        profile: BluetoothProfile,
        state: Option<BluetoothConnectionState>,
        device: Option<BluetoothDevice>,
    },
    HeadsetPlug {
        state: Option<i32>,
        microphone: Option<i32>,
    },
}

impl RouteNotification {
    pub fn route_change(reason: RouteChangeReason) -> Self {
        RouteNotification::RouteChange {
            reason: Some(reason),
            previous_outputs: None,
        }
    }

    pub fn route_change_from(reason: RouteChangeReason, previous: Vec<DeviceDescriptor>) -> Self {
        RouteNotification::RouteChange {
            reason: Some(reason),
            previous_outputs: Some(previous),
        }
    }
}
