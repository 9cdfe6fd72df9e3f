//! iOS payloads: `AVAudioSessionPortDescription` values and the userInfo of
//! a route change notification.

use std::collections::HashMap;

use crate::audio::{DeviceDescriptor, IosPortType, PortType, RouteChangeReason, RouteNotification};

pub const ROUTE_CHANGE_REASON_KEY: &str = "AVAudioSessionRouteChangeReasonKey";
pub const ROUTE_CHANGE_PREVIOUS_ROUTE_KEY: &str = "AVAudioSessionRouteChangePreviousRouteKey";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescription {
    pub port_type: String,
    pub port_name: Option<String>,
    pub uid: Option<String>,
}

impl PortDescription {
    pub fn new(port_type: &str, port_name: &str, uid: &str) -> Self {
        Self {
            port_type: port_type.to_string(),
            port_name: Some(port_name.to_string()),
            uid: Some(uid.to_string()),
        }
    }

    pub fn to_descriptor(&self) -> DeviceDescriptor {
        DeviceDescriptor {
            display_name: self.port_name.clone(),
            identifier: self.uid.clone(),
            port_type: PortType::Ios(IosPortType::from_raw(&self.port_type)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInfoValue {
    Number(u64),
    /// Outputs of a route description
    Route(Vec<PortDescription>),
}

pub type UserInfo = HashMap<String, UserInfoValue>;

/// Lift a route change notification. A missing or unrecognised reason, or a
/// previous route of the wrong kind, is carried as `None`.
pub fn notification_from_user_info(user_info: &UserInfo) -> RouteNotification {
    let reason = match user_info.get(ROUTE_CHANGE_REASON_KEY) {
        Some(UserInfoValue::Number(raw)) => RouteChangeReason::from_raw(*raw),
        _ => None,
    };

    let previous_outputs = match user_info.get(ROUTE_CHANGE_PREVIOUS_ROUTE_KEY) {
        Some(UserInfoValue::Route(outputs)) => Some(
            outputs
                .iter()
                .map(PortDescription::to_descriptor)
                .collect(),
        ),
        _ => None,
    };

    RouteNotification::RouteChange {
        reason,
        previous_outputs,
    }
}
