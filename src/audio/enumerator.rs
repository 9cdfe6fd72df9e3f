use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::EnumerationConfig;
use crate::system::AudioSystemInterface;

use super::device::DeviceRecord;
use super::normalizer::normalize;

/// Snapshot queries for the devices that can currently play audio
pub struct DeviceEnumerator<A: AudioSystemInterface> {
    audio_system: Arc<A>,
    include_input_fallback: bool,
}

impl<A: AudioSystemInterface> DeviceEnumerator<A> {
    pub fn new(audio_system: Arc<A>, config: &EnumerationConfig) -> Self {
        Self {
            audio_system,
            include_input_fallback: config.include_input_fallback,
        }
    }

    /// List connected output devices.
    ///
    /// Active outputs come first in OS order, followed by accessories only
    /// visible as available inputs. Records are unique by address (first
    /// one wins) and never carry the `unknown` protocol. An unavailable audio
    /// service yields an empty list rather than an error.
    pub fn list_connected_devices(&self) -> Vec<DeviceRecord> {
        let outputs = match self.audio_system.active_outputs() {
            Ok(outputs) => outputs,
            Err(e) => {
                warn!("Audio service unavailable, reporting no devices: {}", e);
                return Vec::new();
            }
        };

        let inputs = if self.include_input_fallback {
            match self.audio_system.available_inputs() {
                Ok(inputs) => inputs
                    .into_iter()
                    .filter(|input| input.port_type.is_accessory())
                    .collect(),
                Err(e) => {
                    warn!("Audio service unavailable, reporting no devices: {}", e);
                    return Vec::new();
                }
            }
        } else {
            Vec::new()
        };

        let mut seen = HashSet::new();
        let mut devices = Vec::new();

        for descriptor in outputs.iter().chain(inputs.iter()) {
            let record = normalize(descriptor, true);

            if !record.protocol.is_known() {
                debug!("Skipping device with unmapped type: {:?}", descriptor.port_type);
                continue;
            }

            if !seen.insert(record.address.clone()) {
                debug!("Skipping duplicate device: {}", record.address);
                continue;
            }

            devices.push(record);
        }

        info!("Enumerated {} connected audio devices", devices.len());
        devices
    }
}
