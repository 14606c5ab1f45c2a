use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::model::{Event, ResourceId};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub for outcome events, per resource plus one firehose.
pub struct NotifyHub {
    channels: DashMap<ResourceId, broadcast::Sender<Event>>,
    all: broadcast::Sender<Event>,
    capacity: usize,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl NotifyHub {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: DashMap::new(),
            all: broadcast::channel(capacity).0,
            capacity,
        }
    }

    /// Subscribe to events for one resource. Creates the channel if needed.
    pub fn subscribe(&self, resource_id: ResourceId) -> broadcast::Receiver<Event> {
        let sender = self
            .channels
            .entry(resource_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        sender.subscribe()
    }

    /// Subscribe to events for every resource.
    pub fn subscribe_all(&self) -> broadcast::Receiver<Event> {
        self.all.subscribe()
    }

    /// Send a notification. No-op if nobody is listening.
    pub fn send(&self, event: &Event) {
        if let Some(sender) = self.channels.get(&event.resource_id()) {
            let _ = sender.send(event.clone());
        }
        let _ = self.all.send(event.clone());
    }
}
