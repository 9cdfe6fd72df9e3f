use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical protocol tag carried by every [`DeviceRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    BluetoothA2dp,
    BluetoothHfp,
    BluetoothLe,
    Wired,
    Speaker,
    Earpiece,
    Wifi,
    Airplay,
    Unknown,
}

impl Protocol {
    pub const ALL: [Protocol; 9] = [
        Protocol::BluetoothA2dp,
        Protocol::BluetoothHfp,
        Protocol::BluetoothLe,
        Protocol::Wired,
        Protocol::Speaker,
        Protocol::Earpiece,
        Protocol::Wifi,
        Protocol::Airplay,
        Protocol::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::BluetoothA2dp => "bluetooth_a2dp",
            Protocol::BluetoothHfp => "bluetooth_hfp",
            Protocol::BluetoothLe => "bluetooth_le",
            Protocol::Wired => "wired",
            Protocol::Speaker => "speaker",
            Protocol::Earpiece => "earpiece",
            Protocol::Wifi => "wifi",
            Protocol::Airplay => "airplay",
            Protocol::Unknown => "unknown",
        }
    }

    pub fn is_bluetooth(&self) -> bool {
        matches!(
            self,
            Protocol::BluetoothA2dp | Protocol::BluetoothHfp | Protocol::BluetoothLe
        )
    }

    pub fn is_known(&self) -> bool {
        *self != Protocol::Unknown
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record handed across the bridge, both as enumeration items and as
/// change events. Field names on the wire are fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub name: String,
    pub address: String,
    pub protocol: Protocol,
    #[serde(rename = "isConnected")]
    pub is_connected: bool,
}

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] ({}): {}",
            self.name,
            self.address,
            self.protocol,
            if self.is_connected {
                "Connected"
            } else {
                "Disconnected"
            }
        )
    }
}

/// Android `AudioDeviceInfo.TYPE_*` values this crate knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AndroidDeviceType {
    BuiltinEarpiece,
    BuiltinSpeaker,
    WiredHeadset,
    WiredHeadphones,
    BluetoothSco,
    BluetoothA2dp,
    UsbDevice,
    Ip,
    Bus,
    UsbHeadset,
    Other(i32),
}

impl AndroidDeviceType {
    pub fn from_raw(code: i32) -> Self {
        match code {
            1 => AndroidDeviceType::BuiltinEarpiece,
            2 => AndroidDeviceType::BuiltinSpeaker,
            3 => AndroidDeviceType::WiredHeadset,
            4 => AndroidDeviceType::WiredHeadphones,
            7 => AndroidDeviceType::BluetoothSco,
            8 => AndroidDeviceType::BluetoothA2dp,
            11 => AndroidDeviceType::UsbDevice,
            20 => AndroidDeviceType::Ip,
            21 => AndroidDeviceType::Bus,
            22 => AndroidDeviceType::UsbHeadset,
            other => AndroidDeviceType::Other(other),
        }
    }
}

/// Bluetooth profile a connection-state broadcast refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BluetoothProfile {
    A2dp,
    Headset,
}

/// `AVAudioSession.Port` values this crate knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IosPortType {
    BluetoothA2dp,
    BluetoothHfp,
    BluetoothLe,
    BuiltInSpeaker,
    BuiltInReceiver,
    Headphones,
    HeadsetMic,
    UsbAudio,
    CarAudio,
    AirPlay,
    Other(String),
}

impl IosPortType {
    pub fn from_raw(port_type: &str) -> Self {
        match port_type {
            "BluetoothA2DPOutput" => IosPortType::BluetoothA2dp,
            "BluetoothHFP" => IosPortType::BluetoothHfp,
            "BluetoothLE" => IosPortType::BluetoothLe,
            "Speaker" => IosPortType::BuiltInSpeaker,
            "Receiver" => IosPortType::BuiltInReceiver,
            "Headphones" => IosPortType::Headphones,
            "MicrophoneWired" => IosPortType::HeadsetMic,
            "USBAudio" => IosPortType::UsbAudio,
            "CarAudio" => IosPortType::CarAudio,
            "AirPlay" => IosPortType::AirPlay,
            other => IosPortType::Other(other.to_string()),
        }
    }
}

/// CoreAudio `kAudioDeviceTransportType*` values, reduced to what routing cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportType {
    BuiltIn,
    Usb,
    Bluetooth,
    BluetoothLe,
    AirPlay,
    Avb,
    Hdmi,
    DisplayPort,
    Thunderbolt,
    Virtual,
    Aggregate,
    Other(u32),
}

impl TransportType {
    pub fn from_raw(code: u32) -> Self {
        match &code.to_be_bytes() {
            b"bltn" => TransportType::BuiltIn,
            b"usb " => TransportType::Usb,
            b"blue" => TransportType::Bluetooth,
            b"blea" => TransportType::BluetoothLe,
            b"airp" => TransportType::AirPlay,
            b"eavb" => TransportType::Avb,
            b"hdmi" => TransportType::Hdmi,
            b"dprt" => TransportType::DisplayPort,
            b"thun" => TransportType::Thunderbolt,
            b"virt" => TransportType::Virtual,
            b"grup" => TransportType::Aggregate,
            _ => TransportType::Other(code),
        }
    }
}

/// Raw, platform-specific type of a port/device before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortType {
    Android(AndroidDeviceType),
    AndroidBluetooth(BluetoothProfile),
    WiredPlug { microphone: bool },
    Ios(IosPortType),
    CoreAudio {
        transport: TransportType,
        headphones: bool,
    },
}

impl PortType {
    /// Whether an input port of this type implies a connected output-capable
    /// accessory (used by the input-fallback enumeration path).
    pub fn is_accessory(&self) -> bool {
        match self {
            PortType::Ios(port) => matches!(
                port,
                IosPortType::BluetoothA2dp
                    | IosPortType::BluetoothHfp
                    | IosPortType::BluetoothLe
                    | IosPortType::Headphones
                    | IosPortType::HeadsetMic
                    | IosPortType::UsbAudio
            ),
            PortType::Android(kind) => matches!(
                kind,
                AndroidDeviceType::WiredHeadset
                    | AndroidDeviceType::UsbHeadset
                    | AndroidDeviceType::BluetoothSco
            ),
            PortType::AndroidBluetooth(_) | PortType::WiredPlug { .. } => true,
            PortType::CoreAudio { transport, .. } => matches!(
                transport,
                TransportType::Usb | TransportType::Bluetooth | TransportType::BluetoothLe
            ),
        }
    }
}

/// Platform-independent input to the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub display_name: Option<String>,
    pub identifier: Option<String>,
    pub port_type: PortType,
}

impl DeviceDescriptor {
    pub fn new(port_type: PortType) -> Self {
        Self {
            display_name: None,
            identifier: None,
            port_type,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }
}
