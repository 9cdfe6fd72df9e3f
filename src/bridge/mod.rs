//! Method-call and event-stream surface for an embedding application.
//!
//! Enumeration is a plain request/response call. Route changes are pushed to
//! every live [`EventSubscription`]; the watcher runs only while at least one
//! subscription exists.

use anyhow::Result;
use serde::Serialize;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::audio::{DeviceEnumerator, DeviceRecord, RouteChangeWatcher};
use crate::config::Config;
use crate::system::{AudioSystemInterface, RouteNotificationSource};

pub const GET_CONNECTED_DEVICES: &str = "getConnectedDevices";
pub const LIST_CONNECTED_DEVICES: &str = "listConnectedDevices";

/// Reply to a bridge method call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum MethodResponse {
    Success(Vec<DeviceRecord>),
    NotImplemented,
}

pub type SubscriptionId = u64;

/// Whatever handed out a subscription; told when the subscription goes away
trait SubscriptionOwner: Send + Sync {
    fn detach(&self, id: SubscriptionId) -> Result<()>;
}

/// Stream of route events for one subscriber.
///
/// Dropping it detaches the subscriber, so dropping the last one stops the
/// watcher the same way [`BridgeAdapter::unsubscribe`] does.
pub struct EventSubscription {
    id: SubscriptionId,
    events: UnboundedReceiverStream<DeviceRecord>,
    owner: Weak<dyn SubscriptionOwner>,
}

impl EventSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Stream for EventSubscription {
    type Item = DeviceRecord;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        // Close first so the sink counts as gone even if it is still listed
        self.events.close();

        if let Some(owner) = self.owner.upgrade() {
            if let Err(e) = owner.detach(self.id) {
                warn!("Failed to detach event subscriber {}: {}", self.id, e);
            }
        }
    }
}

#[derive(Default)]
struct Subscribers {
    next_id: SubscriptionId,
    sinks: Vec<(SubscriptionId, mpsc::UnboundedSender<DeviceRecord>)>,
}

fn forward(subscribers: &Mutex<Subscribers>, record: DeviceRecord) {
    let mut subscribers = subscribers.lock().unwrap_or_else(PoisonError::into_inner);

    if subscribers.sinks.is_empty() {
        debug!("No subscribers, dropping event for {}", record.address);
        return;
    }

    subscribers
        .sinks
        .retain(|(id, sink)| match sink.send(record.clone()) {
            Ok(()) => true,
            Err(_) => {
                debug!("Subscriber {} went away, removing", id);
                false
            }
        });
}

struct BridgeState<A: AudioSystemInterface + 'static, N: RouteNotificationSource> {
    watcher: RouteChangeWatcher<A, N>,
    subscribers: Arc<Mutex<Subscribers>>,
    // Serializes watcher start/stop against subscribe/unsubscribe
    lifecycle: Mutex<()>,
}

impl<A: AudioSystemInterface + 'static, N: RouteNotificationSource> BridgeState<A, N> {
    /// Remove `id` and any closed sink; stop the watcher once none are left.
    fn remove_subscriber(&self, id: SubscriptionId) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);

        let (found, remaining) = {
            let mut subscribers = self
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let before = subscribers.sinks.len();
            subscribers.sinks.retain(|(sink_id, _)| *sink_id != id);
            let found = subscribers.sinks.len() != before;
            subscribers.sinks.retain(|(_, sink)| !sink.is_closed());
            (found, subscribers.sinks.len())
        };

        if found {
            info!("Event subscriber {} detached, {} remaining", id, remaining);
        }

        if remaining == 0 && self.watcher.is_running() {
            self.watcher.stop()?;
        }
        Ok(())
    }
}

impl<A, N> SubscriptionOwner for BridgeState<A, N>
where
    A: AudioSystemInterface + 'static,
    N: RouteNotificationSource + 'static,
{
    fn detach(&self, id: SubscriptionId) -> Result<()> {
        self.remove_subscriber(id)
    }
}

/// Ties the enumerator and the watcher to the bridge lifecycle
pub struct BridgeAdapter<A: AudioSystemInterface + 'static, N: RouteNotificationSource + 'static> {
    enumerator: DeviceEnumerator<A>,
    state: Arc<BridgeState<A, N>>,
}

impl<A, N> BridgeAdapter<A, N>
where
    A: AudioSystemInterface + 'static,
    N: RouteNotificationSource + 'static,
{
    pub fn new(audio_system: A, notification_source: N, config: &Config) -> Self {
        let audio_system = Arc::new(audio_system);

        Self {
            enumerator: DeviceEnumerator::new(Arc::clone(&audio_system), &config.enumeration),
            state: Arc::new(BridgeState {
                watcher: RouteChangeWatcher::new(audio_system, notification_source),
                subscribers: Arc::new(Mutex::new(Subscribers::default())),
                lifecycle: Mutex::new(()),
            }),
        }
    }

    /// Dispatch a method call by name
    pub fn handle_method_call(&self, method: &str) -> MethodResponse {
        match method {
            GET_CONNECTED_DEVICES | LIST_CONNECTED_DEVICES => {
                MethodResponse::Success(self.list_connected_devices())
            }
            other => {
                warn!("Method not implemented: {}", other);
                MethodResponse::NotImplemented
            }
        }
    }

    pub fn list_connected_devices(&self) -> Vec<DeviceRecord> {
        self.enumerator.list_connected_devices()
    }

    /// Attach a subscriber. The first one starts the watcher.
    pub fn subscribe(&self) -> Result<EventSubscription> {
        let state = &self.state;
        let _lifecycle = state.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        let (sender, receiver) = mpsc::unbounded_channel();

        let id = {
            let mut subscribers = state
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            subscribers.next_id += 1;
            let id = subscribers.next_id;
            subscribers.sinks.push((id, sender));
            id
        };

        if !state.watcher.is_running() {
            let subscribers = Arc::clone(&state.subscribers);
            let started = state
                .watcher
                .start(Arc::new(move |record| forward(&subscribers, record)));

            if let Err(e) = started {
                state
                    .subscribers
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .sinks
                    .retain(|(sink_id, _)| *sink_id != id);
                return Err(e);
            }
        }

        info!("Event subscriber {} attached", id);
        let owner: Arc<dyn SubscriptionOwner> = self.state.clone();
        Ok(EventSubscription {
            id,
            events: UnboundedReceiverStream::new(receiver),
            owner: Arc::downgrade(&owner),
        })
    }

    /// Detach a subscriber. Removing the last one stops the watcher and
    /// clears its state.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<()> {
        self.state.remove_subscriber(id)
    }

    /// Drop every subscriber and stop watching
    pub fn shutdown(&self) -> Result<()> {
        let _lifecycle = self
            .state
            .lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        self.state
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sinks
            .clear();
        self.state.watcher.stop()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sinks
            .len()
    }

    pub fn is_watching(&self) -> bool {
        self.state.watcher.is_running()
    }

    /// Identifier of the output last reported as active, while watching
    pub fn last_active_device_id(&self) -> Option<String> {
        self.state.watcher.last_active_device_id()
    }
}
