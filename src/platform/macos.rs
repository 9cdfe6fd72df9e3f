//! CoreAudio has no route-change notification with a reason, only property
//! listeners on the device list and the default output. Snapshots taken on
//! each callback are diffed into the shared notification shape.

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use crate::audio::normalizer::identifier_of;
use crate::audio::{DeviceDescriptor, RouteChangeReason, RouteNotification};

/// Output devices and the default output at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSnapshot {
    pub outputs: Vec<DeviceDescriptor>,
    pub default_output: Option<DeviceDescriptor>,
}

/// Translate the difference between two snapshots.
///
/// A vanished device reports `OldDeviceUnavailable` with the departed device
/// (the old default if it is among them) as the previous route. A new device
/// or a new default output reports `NewDeviceAvailable`. No change, no
/// notification.
pub fn route_change_between(
    previous: &RouteSnapshot,
    current: &RouteSnapshot,
) -> Option<RouteNotification> {
    let before: HashSet<String> = previous.outputs.iter().map(identifier_of).collect();
    let after: HashSet<String> = current.outputs.iter().map(identifier_of).collect();

    let first_removed = previous
        .outputs
        .iter()
        .find(|device| !after.contains(&identifier_of(device)));

    if let Some(first_removed) = first_removed {
        let departed = previous
            .default_output
            .as_ref()
            .filter(|device| !after.contains(&identifier_of(device)))
            .unwrap_or(first_removed);

        return Some(RouteNotification::route_change_from(
            RouteChangeReason::OldDeviceUnavailable,
            vec![departed.clone()],
        ));
    }

    let added = after.iter().any(|id| !before.contains(id));
    let default_changed = previous.default_output.as_ref().map(identifier_of)
        != current.default_output.as_ref().map(identifier_of);

    if added || default_changed {
        Some(RouteNotification::route_change(
            RouteChangeReason::NewDeviceAvailable,
        ))
    } else {
        None
    }
}

/// Keeps values alive for a grace period after they are retired.
///
/// Removing a HAL property listener does not wait for a callback that is
/// already running, so listener state has to outlive its registration for a
/// while. Each retire releases whatever has been retired for longer than the
/// grace period.
#[derive(Debug)]
pub struct RetiredQueue<T> {
    grace: Duration,
    entries: VecDeque<(Instant, T)>,
}

impl<T> RetiredQueue<T> {
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            entries: VecDeque::new(),
        }
    }

    pub fn retire(&mut self, value: T, now: Instant) {
        self.release_expired(now);
        self.entries.push_back((now, value));
    }

    pub fn release_expired(&mut self, now: Instant) {
        while let Some((retired_at, _)) = self.entries.front() {
            if now.saturating_duration_since(*retired_at) < self.grace {
                break;
            }
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
