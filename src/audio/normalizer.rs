//! Maps platform descriptors onto the canonical [`DeviceRecord`] shape.
//!
//! [`protocol_for`] is the only place raw platform types are translated. Wired
//! sub-types (headset, headphones, USB) collapse to [`Protocol::Wired`], call
//! audio profiles (SCO, HFP, car audio) to [`Protocol::BluetoothHfp`], and
//! IP/bus routes to [`Protocol::Wifi`]. Anything unrecognised becomes
//! [`Protocol::Unknown`]; callers decide whether to drop it.

use super::device::{
    AndroidDeviceType, BluetoothProfile, DeviceDescriptor, DeviceRecord, IosPortType, PortType,
    Protocol, TransportType,
};

pub const WIRED_DEVICE_NAME: &str = "Wired Headset";
pub const WIRED_DEVICE_ADDRESS: &str = "wired_device";
pub const SPEAKER_ADDRESS: &str = "built_in_speaker";
pub const EARPIECE_ADDRESS: &str = "built_in_earpiece";
pub const UNKNOWN_ADDRESS: &str = "unknown_device";

pub fn protocol_for(port_type: &PortType) -> Protocol {
    match port_type {
        PortType::Android(kind) => match kind {
            AndroidDeviceType::WiredHeadset
            | AndroidDeviceType::WiredHeadphones
            | AndroidDeviceType::UsbHeadset
            | AndroidDeviceType::UsbDevice => Protocol::Wired,
            AndroidDeviceType::BuiltinSpeaker => Protocol::Speaker,
            AndroidDeviceType::BuiltinEarpiece => Protocol::Earpiece,
            AndroidDeviceType::BluetoothA2dp => Protocol::BluetoothA2dp,
            AndroidDeviceType::BluetoothSco => Protocol::BluetoothHfp,
            AndroidDeviceType::Ip | AndroidDeviceType::Bus => Protocol::Wifi,
            AndroidDeviceType::Other(_) => Protocol::Unknown,
        },
        PortType::AndroidBluetooth(profile) => match profile {
            BluetoothProfile::A2dp => Protocol::BluetoothA2dp,
            BluetoothProfile::Headset => Protocol::BluetoothHfp,
        },
        // Microphone presence does not split the canonical tag
        PortType::WiredPlug { .. } => Protocol::Wired,
        PortType::Ios(port) => match port {
            IosPortType::BluetoothA2dp => Protocol::BluetoothA2dp,
            IosPortType::BluetoothHfp | IosPortType::CarAudio => Protocol::BluetoothHfp,
            IosPortType::BluetoothLe => Protocol::BluetoothLe,
            IosPortType::BuiltInSpeaker => Protocol::Speaker,
            IosPortType::BuiltInReceiver => Protocol::Earpiece,
            IosPortType::Headphones | IosPortType::HeadsetMic | IosPortType::UsbAudio => {
                Protocol::Wired
            }
            IosPortType::AirPlay => Protocol::Airplay,
            IosPortType::Other(_) => Protocol::Unknown,
        },
        PortType::CoreAudio {
            transport,
            headphones,
        } => match transport {
            TransportType::BuiltIn if *headphones => Protocol::Wired,
            TransportType::BuiltIn => Protocol::Speaker,
            TransportType::Usb => Protocol::Wired,
            TransportType::Bluetooth => Protocol::BluetoothA2dp,
            TransportType::BluetoothLe => Protocol::BluetoothLe,
            TransportType::AirPlay => Protocol::Airplay,
            TransportType::Avb => Protocol::Wifi,
            TransportType::Hdmi
            | TransportType::DisplayPort
            | TransportType::Thunderbolt
            | TransportType::Virtual
            | TransportType::Aggregate
            | TransportType::Other(_) => Protocol::Unknown,
        },
    }
}

fn fallback_name(protocol: Protocol) -> &'static str {
    match protocol {
        Protocol::BluetoothA2dp | Protocol::BluetoothHfp | Protocol::BluetoothLe => {
            "Unknown Bluetooth"
        }
        Protocol::Wired => WIRED_DEVICE_NAME,
        Protocol::Speaker => "Built-in Speaker",
        Protocol::Earpiece => "Built-in Earpiece",
        Protocol::Airplay => "AirPlay",
        Protocol::Wifi => "Network Audio",
        Protocol::Unknown => "Unknown Device",
    }
}

fn fallback_address(protocol: Protocol) -> &'static str {
    match protocol {
        Protocol::Wired => WIRED_DEVICE_ADDRESS,
        Protocol::Speaker => SPEAKER_ADDRESS,
        Protocol::Earpiece => EARPIECE_ADDRESS,
        _ => UNKNOWN_ADDRESS,
    }
}

/// Build a fresh record from a descriptor. Empty strings count as missing.
pub fn normalize(descriptor: &DeviceDescriptor, is_connected: bool) -> DeviceRecord {
    let protocol = protocol_for(&descriptor.port_type);

    let name = descriptor
        .display_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback_name(protocol));

    let address = descriptor
        .identifier
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| fallback_address(protocol));

    DeviceRecord {
        name: name.to_string(),
        address: address.to_string(),
        protocol,
        is_connected,
    }
}

/// Identifier the watcher compares routes by; same fallback as [`normalize`].
pub fn identifier_of(descriptor: &DeviceDescriptor) -> String {
    descriptor
        .identifier
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| fallback_address(protocol_for(&descriptor.port_type)))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_fallbacks() {
        let descriptor = DeviceDescriptor::new(PortType::Ios(IosPortType::BuiltInSpeaker));
        let record = normalize(&descriptor, true);

        assert_eq!(record.name, "Built-in Speaker");
        assert_eq!(record.address, SPEAKER_ADDRESS);
        assert_eq!(record.protocol, Protocol::Speaker);
        assert!(record.is_connected);
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let descriptor = DeviceDescriptor::new(PortType::AndroidBluetooth(BluetoothProfile::A2dp))
            .with_name("")
            .with_identifier("");
        let record = normalize(&descriptor, false);

        assert_eq!(record.name, "Unknown Bluetooth");
        assert_eq!(record.address, UNKNOWN_ADDRESS);
        assert!(!record.is_connected);
    }

    #[test]
    fn test_platform_fields_are_kept() {
        let descriptor = DeviceDescriptor::new(PortType::Ios(IosPortType::BluetoothHfp))
            .with_name("Car Kit")
            .with_identifier("00:11:22:33:44:55-tsco");
        let record = normalize(&descriptor, true);

        assert_eq!(record.name, "Car Kit");
        assert_eq!(record.address, "00:11:22:33:44:55-tsco");
        assert_eq!(record.protocol, Protocol::BluetoothHfp);
    }

    #[test]
    fn test_identifier_matches_record_address() {
        let descriptor = DeviceDescriptor::new(PortType::WiredPlug { microphone: true });
        assert_eq!(identifier_of(&descriptor), normalize(&descriptor, true).address);
    }

    #[test]
    fn test_coreaudio_builtin_splits_on_data_source() {
        let speaker = PortType::CoreAudio {
            transport: TransportType::BuiltIn,
            headphones: false,
        };
        let jack = PortType::CoreAudio {
            transport: TransportType::BuiltIn,
            headphones: true,
        };
        assert_eq!(protocol_for(&speaker), Protocol::Speaker);
        assert_eq!(protocol_for(&jack), Protocol::Wired);
    }
}
