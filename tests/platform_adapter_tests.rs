mod test_utils;

use audio_device_detection::audio::{
    BluetoothConnectionState, BluetoothDevice, BluetoothProfile, DeviceRecord, EmitFn, Protocol,
    RouteChangeReason, RouteChangeWatcher, RouteNotification, TransportType,
};
use audio_device_detection::platform::android::{
    self, ACTION_A2DP_CONNECTION_STATE_CHANGED, ACTION_HEADSET_CONNECTION_STATE_CHANGED,
    ACTION_HEADSET_PLUG, AudioDeviceInfo, EXTRA_DEVICE, EXTRA_MICROPHONE, EXTRA_PLUG_STATE,
    EXTRA_STATE, Extra, Intent,
};
use audio_device_detection::platform::ios::{
    self, PortDescription, ROUTE_CHANGE_PREVIOUS_ROUTE_KEY, ROUTE_CHANGE_REASON_KEY, UserInfo,
    UserInfoValue,
};
use audio_device_detection::platform::macos::{RouteSnapshot, route_change_between};
use audio_device_detection::{MockAudioSystem, MockRouteNotificationSource};
use std::sync::{Arc, Mutex};
use test_utils::DeviceDescriptorBuilder;

fn pixel_buds() -> BluetoothDevice {
    BluetoothDevice {
        name: Some("Pixel Buds".to_string()),
        address: "00:1A:7D:DA:71:13".to_string(),
    }
}

#[cfg(test)]
mod android_tests {
    use super::*;

    #[test]
    fn test_device_info_types_normalize() {
        let cases = [
            (8, Protocol::BluetoothA2dp),
            (7, Protocol::BluetoothHfp),
            (3, Protocol::Wired),
            (22, Protocol::Wired),
            (2, Protocol::Speaker),
            (1, Protocol::Earpiece),
            (20, Protocol::Wifi),
            (18, Protocol::Unknown),
        ];

        for (type_code, expected) in cases {
            let info = AudioDeviceInfo {
                type_code,
                product_name: Some("Device".to_string()),
                address: None,
            };
            let record = audio_device_detection::audio::normalize(&info.to_descriptor(), true);
            assert_eq!(record.protocol, expected, "type code {}", type_code);
        }
    }

    #[test]
    fn test_a2dp_broadcast() {
        let intent = Intent::new(ACTION_A2DP_CONNECTION_STATE_CHANGED)
            .with_extra(EXTRA_STATE, Extra::Int(2))
            .with_extra(EXTRA_DEVICE, Extra::Device(pixel_buds()));

        assert_eq!(
            android::notification_from_intent(&intent),
            Some(RouteNotification::Bluetooth {
                profile: BluetoothProfile::A2dp,
                state: Some(BluetoothConnectionState::Connected),
                device: Some(pixel_buds()),
            })
        );
    }

    #[test]
    fn test_headset_profile_broadcast_with_unknown_state() {
        let intent = Intent::new(ACTION_HEADSET_CONNECTION_STATE_CHANGED)
            .with_extra(EXTRA_STATE, Extra::Int(42))
            .with_extra(EXTRA_DEVICE, Extra::Device(pixel_buds()));

        let Some(RouteNotification::Bluetooth { profile, state, .. }) =
            android::notification_from_intent(&intent)
        else {
            panic!("expected a Bluetooth notification");
        };

        assert_eq!(profile, BluetoothProfile::Headset);
        assert_eq!(state, None);
    }

    #[test]
    fn test_headset_plug_broadcast() {
        let intent = Intent::new(ACTION_HEADSET_PLUG)
            .with_extra(EXTRA_PLUG_STATE, Extra::Int(1))
            .with_extra(EXTRA_MICROPHONE, Extra::Int(0))
            .with_extra("name", Extra::Text("h2w".to_string()));

        assert_eq!(
            android::notification_from_intent(&intent),
            Some(RouteNotification::HeadsetPlug {
                state: Some(1),
                microphone: Some(0),
            })
        );
    }

    #[test]
    fn test_receiver_actions_are_all_handled() {
        for action in android::RECEIVER_ACTIONS {
            assert!(android::notification_from_intent(&Intent::new(action)).is_some());
        }
    }
}

#[cfg(test)]
mod ios_tests {
    use super::*;

    #[test]
    fn test_port_description_descriptor() {
        let port = PortDescription::new("BluetoothA2DPOutput", "AirPods Pro", "AA:BB:CC:DD:EE:FF");
        let record = audio_device_detection::audio::normalize(&port.to_descriptor(), true);

        assert_eq!(
            record,
            DeviceRecord {
                name: "AirPods Pro".to_string(),
                address: "AA:BB:CC:DD:EE:FF".to_string(),
                protocol: Protocol::BluetoothA2dp,
                is_connected: true,
            }
        );
    }

    #[test]
    fn test_unrecognised_reason_number() {
        let mut user_info = UserInfo::new();
        user_info.insert(ROUTE_CHANGE_REASON_KEY.to_string(), UserInfoValue::Number(5));

        assert_eq!(
            ios::notification_from_user_info(&user_info),
            RouteNotification::RouteChange {
                reason: None,
                previous_outputs: None,
            }
        );
    }

    #[test]
    fn test_empty_user_info() {
        assert_eq!(
            ios::notification_from_user_info(&UserInfo::new()),
            RouteNotification::RouteChange {
                reason: None,
                previous_outputs: None,
            }
        );
    }

    #[test]
    fn test_unplug_through_watcher() {
        let audio_system = MockAudioSystem::new();
        let source = MockRouteNotificationSource::new();
        let watcher = RouteChangeWatcher::new(Arc::new(audio_system.clone()), source.clone());
        let emitted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&emitted);
        let emit: EmitFn = Arc::new(move |record| sink.lock().unwrap().push(record));

        let headphones = PortDescription::new("Headphones", "Headphones", "Wired Headphones");
        let speaker = PortDescription::new("Speaker", "Speaker", "Built-In Speaker");
        audio_system.set_outputs(vec![headphones.to_descriptor()]);
        watcher.start(emit).unwrap();

        audio_system.set_outputs(vec![speaker.to_descriptor()]);
        let mut user_info = UserInfo::new();
        user_info.insert(ROUTE_CHANGE_REASON_KEY.to_string(), UserInfoValue::Number(2));
        user_info.insert(
            ROUTE_CHANGE_PREVIOUS_ROUTE_KEY.to_string(),
            UserInfoValue::Route(vec![headphones]),
        );
        source.deliver(ios::notification_from_user_info(&user_info));

        let emitted = emitted.lock().unwrap();
        assert_eq!(emitted.len(), 2);
        assert_eq!(emitted[0].protocol, Protocol::Wired);
        assert!(!emitted[0].is_connected);
        assert_eq!(emitted[1].protocol, Protocol::Speaker);
        assert!(emitted[1].is_connected);
    }
}

#[cfg(test)]
mod macos_tests {
    use super::*;

    fn built_in() -> audio_device_detection::DeviceDescriptor {
        DeviceDescriptorBuilder::new()
            .name("MacBook Pro Speakers")
            .identifier("BuiltInSpeakerDevice")
            .core_audio(TransportType::BuiltIn)
            .build()
    }

    fn airpods() -> audio_device_detection::DeviceDescriptor {
        DeviceDescriptorBuilder::new()
            .name("AirPods Pro")
            .identifier("AA-BB-CC-DD-EE-FF:output")
            .core_audio(TransportType::Bluetooth)
            .build()
    }

    fn usb_dac() -> audio_device_detection::DeviceDescriptor {
        DeviceDescriptorBuilder::new()
            .name("Audioengine 2+")
            .identifier("AppleUSBAudioEngine:Audioengine:2+")
            .core_audio(TransportType::Usb)
            .build()
    }

    fn snapshot(
        outputs: Vec<audio_device_detection::DeviceDescriptor>,
        default_output: Option<audio_device_detection::DeviceDescriptor>,
    ) -> RouteSnapshot {
        RouteSnapshot {
            outputs,
            default_output,
        }
    }

    #[test]
    fn test_identical_snapshots_produce_nothing() {
        let state = snapshot(vec![built_in(), airpods()], Some(airpods()));
        assert_eq!(route_change_between(&state, &state.clone()), None);
    }

    #[test]
    fn test_added_device_is_new_device_available() {
        let before = snapshot(vec![built_in()], Some(built_in()));
        let after = snapshot(vec![built_in(), airpods()], Some(built_in()));

        assert_eq!(
            route_change_between(&before, &after),
            Some(RouteNotification::route_change(
                RouteChangeReason::NewDeviceAvailable
            ))
        );
    }

    #[test]
    fn test_default_switch_is_new_device_available() {
        let before = snapshot(vec![built_in(), usb_dac()], Some(built_in()));
        let after = snapshot(vec![built_in(), usb_dac()], Some(usb_dac()));

        assert_eq!(
            route_change_between(&before, &after),
            Some(RouteNotification::route_change(
                RouteChangeReason::NewDeviceAvailable
            ))
        );
    }

    #[test]
    fn test_removed_default_is_reported_as_previous_route() {
        let before = snapshot(vec![usb_dac(), built_in(), airpods()], Some(airpods()));
        let after = snapshot(vec![built_in()], Some(built_in()));

        assert_eq!(
            route_change_between(&before, &after),
            Some(RouteNotification::route_change_from(
                RouteChangeReason::OldDeviceUnavailable,
                vec![airpods()],
            ))
        );
    }

    #[test]
    fn test_removed_idle_device_is_reported_when_default_stays() {
        let before = snapshot(vec![built_in(), usb_dac()], Some(built_in()));
        let after = snapshot(vec![built_in()], Some(built_in()));

        assert_eq!(
            route_change_between(&before, &after),
            Some(RouteNotification::route_change_from(
                RouteChangeReason::OldDeviceUnavailable,
                vec![usb_dac()],
            ))
        );
    }
}
