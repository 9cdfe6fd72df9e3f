pub mod device;
pub mod enumerator;
pub mod normalizer;
pub mod notification;
pub mod watcher;

pub use device::{
    AndroidDeviceType, BluetoothProfile, DeviceDescriptor, DeviceRecord, IosPortType, PortType,
    Protocol, TransportType,
};
pub use enumerator::DeviceEnumerator;
pub use normalizer::{normalize, protocol_for};
pub use notification::{
    BluetoothConnectionState, BluetoothDevice, RouteChangeReason, RouteNotification,
};
pub use watcher::{EmitFn, RouteChangeTracker, RouteChangeWatcher};
