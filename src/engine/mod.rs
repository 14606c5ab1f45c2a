mod conflict;
mod error;
mod mutations;
mod queries;
mod store;

pub use conflict::now_secs;
pub use error::EngineError;
pub use store::ReservationStore;

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::config::Config;
use crate::model::*;
use crate::notify::NotifyHub;

pub type SharedResourceState = Arc<RwLock<ResourceState>>;

/// Booking engine over a [`ReservationStore`].
///
/// Every mutation runs its checks and its state change under the resource's
/// write lock, so no caller observes a partially applied request. Book and
/// cancel events are sent before that lock is released, so each resource's
/// events arrive in the order its state changed. Resources are independent
/// and can be worked on in parallel.
pub struct Engine {
    store: ReservationStore,
    pub notify: Arc<NotifyHub>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            store: ReservationStore::new(config.max_resources),
            notify: Arc::new(NotifyHub::new(config.notify_capacity)),
        }
    }

    /// Outcome events for one registered resource.
    pub fn subscribe(
        &self,
        resource_id: ResourceId,
    ) -> Result<broadcast::Receiver<Event>, EngineError> {
        if !self.store.contains_resource(&resource_id) {
            return Err(EngineError::UnknownResource(resource_id));
        }
        Ok(self.notify.subscribe(resource_id))
    }

    /// Outcome events for every resource.
    pub fn subscribe_all(&self) -> broadcast::Receiver<Event> {
        self.notify.subscribe_all()
    }
}
