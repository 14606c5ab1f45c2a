use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use crate::limits::*;
use crate::model::*;

use super::{EngineError, SharedResourceState};

pub struct ReservationStore {
    resources: DashMap<ResourceId, SharedResourceState>,
    /// Last booking id handed out; ids start at 1.
    booking_seq: AtomicU64,
    max_resources: usize,
}

impl Default for ReservationStore {
    fn default() -> Self {
        Self::new(MAX_RESOURCES)
    }
}

impl ReservationStore {
    pub fn new(max_resources: usize) -> Self {
        Self {
            resources: DashMap::new(),
            booking_seq: AtomicU64::new(0),
            max_resources,
        }
    }

    // ── Resource CRUD ────────────────────────────────────────

    /// Allocate a fresh resource with an empty reservation set.
    pub fn create_resource(&self, capacity: i64) -> Result<ResourceId, EngineError> {
        if capacity < 1 {
            return Err(EngineError::InvalidCapacity(capacity));
        }
        if capacity > MAX_CAPACITY {
            return Err(EngineError::LimitExceeded("capacity too large"));
        }
        if self.resources.len() >= self.max_resources {
            return Err(EngineError::LimitExceeded("too many resources"));
        }
        let id = ResourceId::new();
        let rs = ResourceState::new(id, capacity as u32);
        self.resources.insert(id, Arc::new(RwLock::new(rs)));
        Ok(id)
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn contains_resource(&self, id: &ResourceId) -> bool {
        self.resources.contains_key(id)
    }

    pub fn get_resource(&self, id: &ResourceId) -> Option<SharedResourceState> {
        self.resources.get(id).map(|e| e.value().clone())
    }

    pub fn resource_ids(&self) -> Vec<ResourceId> {
        self.resources.iter().map(|e| *e.key()).collect()
    }

    /// Lookup resource, acquire read lock.
    pub async fn read(
        &self,
        id: &ResourceId,
    ) -> Result<OwnedRwLockReadGuard<ResourceState>, EngineError> {
        let rs = self
            .get_resource(id)
            .ok_or(EngineError::UnknownResource(*id))?;
        Ok(rs.read_owned().await)
    }

    /// Lookup resource, acquire write lock.
    pub async fn write(
        &self,
        id: &ResourceId,
    ) -> Result<OwnedRwLockWriteGuard<ResourceState>, EngineError> {
        let rs = self
            .get_resource(id)
            .ok_or(EngineError::UnknownResource(*id))?;
        Ok(rs.write_owned().await)
    }

    // ── Identifiers ──────────────────────────────────────────

    pub fn next_booking_id(&self) -> BookingId {
        BookingId(self.booking_seq.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Per-resource primitives. Callers hold the resource's lock.
impl ResourceState {
    /// Held reservations, past or future.
    pub fn size(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    pub fn has_space(&self) -> bool {
        self.size() < self.capacity as usize
    }

    /// Insert maintaining sort order by `span.start`. The engine has already
    /// checked space and conflicts; a full resource here is a bug.
    pub fn insert(&mut self, reservation: Reservation) -> Result<(), EngineError> {
        if !self.has_space() {
            return Err(EngineError::CapacityExceeded(self.capacity));
        }
        let pos = self
            .reservations
            .binary_search_by_key(&reservation.span.start, |r| r.span.start)
            .unwrap_or_else(|e| e);
        self.reservations.insert(pos, reservation);
        Ok(())
    }

    pub fn remove(&mut self, id: BookingId) -> Option<Reservation> {
        let pos = self.position(id)?;
        Some(self.reservations.remove(pos))
    }

    pub fn find(&self, id: BookingId) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == id)
    }

    /// Current index of a reservation in the held set.
    pub fn position(&self, id: BookingId) -> Option<usize> {
        self.reservations.iter().position(|r| r.id == id)
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    /// Held reservations whose interval has not fully elapsed at `now`.
    pub fn active_count(&self, now: Secs) -> usize {
        self.reservations
            .iter()
            .filter(|r| r.span.ends_after(now))
            .count()
    }
}
