//! Test utility builders for creating device descriptors and notifications
//!
//! Individual methods may not be used by all tests, so dead code warnings are suppressed.

#![allow(dead_code)]

use audio_device_detection::audio::{
    AndroidDeviceType, BluetoothConnectionState, BluetoothDevice, BluetoothProfile,
    DeviceDescriptor, IosPortType, PortType, RouteChangeReason, RouteNotification, TransportType,
};

/// Builder for creating test DeviceDescriptor instances
pub struct DeviceDescriptorBuilder {
    name: Option<String>,
    identifier: Option<String>,
    port_type: PortType,
}

impl DeviceDescriptorBuilder {
    pub fn new() -> Self {
        Self {
            name: Some("Test Device".to_string()),
            identifier: Some("test_device_1".to_string()),
            port_type: PortType::Ios(IosPortType::BuiltInSpeaker),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn identifier(mut self, identifier: &str) -> Self {
        self.identifier = Some(identifier.to_string());
        self
    }

    pub fn without_name(mut self) -> Self {
        self.name = None;
        self
    }

    pub fn without_identifier(mut self) -> Self {
        self.identifier = None;
        self
    }

    pub fn ios(mut self, port: IosPortType) -> Self {
        self.port_type = PortType::Ios(port);
        self
    }

    pub fn android(mut self, kind: AndroidDeviceType) -> Self {
        self.port_type = PortType::Android(kind);
        self
    }

    pub fn core_audio(mut self, transport: TransportType) -> Self {
        self.port_type = PortType::CoreAudio {
            transport,
            headphones: false,
        };
        self
    }

    pub fn port_type(mut self, port_type: PortType) -> Self {
        self.port_type = port_type;
        self
    }

    pub fn build(self) -> DeviceDescriptor {
        DeviceDescriptor {
            display_name: self.name,
            identifier: self.identifier,
            port_type: self.port_type,
        }
    }
}

impl Default for DeviceDescriptorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper functions for creating common test scenarios
pub mod scenarios {
    use super::*;

    pub fn speaker() -> DeviceDescriptor {
        DeviceDescriptorBuilder::new()
            .name("Speaker")
            .identifier("Built-In Speaker")
            .ios(IosPortType::BuiltInSpeaker)
            .build()
    }

    pub fn airpods() -> DeviceDescriptor {
        DeviceDescriptorBuilder::new()
            .name("AirPods Pro")
            .identifier("AA:BB:CC:DD:EE:FF")
            .ios(IosPortType::BluetoothA2dp)
            .build()
    }

    pub fn wired_headphones() -> DeviceDescriptor {
        DeviceDescriptorBuilder::new()
            .name("Headphones")
            .identifier("Wired Headphones")
            .ios(IosPortType::Headphones)
            .build()
    }

    pub fn hfp_headset_input() -> DeviceDescriptor {
        DeviceDescriptorBuilder::new()
            .name("Jabra Evolve")
            .identifier("11:22:33:44:55:66")
            .ios(IosPortType::BluetoothHfp)
            .build()
    }

    pub fn built_in_microphone() -> DeviceDescriptor {
        DeviceDescriptorBuilder::new()
            .name("iPhone Microphone")
            .identifier("Built-In Microphone")
            .ios(IosPortType::Other("MicrophoneBuiltIn".to_string()))
            .build()
    }

    pub fn hdmi_display() -> DeviceDescriptor {
        DeviceDescriptorBuilder::new()
            .name("LG UltraFine")
            .identifier("hdmi-1")
            .core_audio(TransportType::Hdmi)
            .build()
    }

    pub fn new_device_available() -> RouteNotification {
        RouteNotification::route_change(RouteChangeReason::NewDeviceAvailable)
    }

    pub fn old_device_unavailable(previous: DeviceDescriptor) -> RouteNotification {
        RouteNotification::route_change_from(RouteChangeReason::OldDeviceUnavailable, vec![previous])
    }

    pub fn bluetooth(
        profile: BluetoothProfile,
        state: BluetoothConnectionState,
        name: &str,
        address: &str,
    ) -> RouteNotification {
        RouteNotification::Bluetooth {
            profile,
            state: Some(state),
            device: Some(BluetoothDevice {
                name: Some(name.to_string()),
                address: address.to_string(),
            }),
        }
    }

    pub fn headset_plug(state: i32, microphone: i32) -> RouteNotification {
        RouteNotification::HeadsetPlug {
            state: Some(state),
            microphone: Some(microphone),
        }
    }
}
