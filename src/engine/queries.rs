use crate::model::*;

use super::{Engine, EngineError};

impl Engine {
    pub async fn get_capacity(&self, resource_id: ResourceId) -> Result<u32, EngineError> {
        Ok(self.store.read(&resource_id).await?.capacity)
    }

    /// Held reservations regardless of date; elapsed ones count until cancelled.
    pub async fn get_size(&self, resource_id: ResourceId) -> Result<usize, EngineError> {
        Ok(self.store.read(&resource_id).await?.size())
    }

    pub async fn is_empty(&self, resource_id: ResourceId) -> Result<bool, EngineError> {
        Ok(self.store.read(&resource_id).await?.is_empty())
    }

    pub async fn has_space(&self, resource_id: ResourceId) -> Result<bool, EngineError> {
        Ok(self.store.read(&resource_id).await?.has_space())
    }

    /// Held reservations whose end is still after `now`. Never exceeds `get_size`.
    pub async fn get_active_bookings_count(
        &self,
        resource_id: ResourceId,
        now: Secs,
    ) -> Result<usize, EngineError> {
        Ok(self.store.read(&resource_id).await?.active_count(now))
    }

    /// Index of the booking in the resource's held set, or `-1` if it isn't held.
    pub async fn find_book(
        &self,
        resource_id: ResourceId,
        booking_id: BookingId,
    ) -> Result<i64, EngineError> {
        let guard = self.store.read(&resource_id).await?;
        Ok(guard.position(booking_id).map_or(-1, |pos| pos as i64))
    }

    pub async fn find(
        &self,
        resource_id: ResourceId,
        booking_id: BookingId,
    ) -> Result<Option<Reservation>, EngineError> {
        let guard = self.store.read(&resource_id).await?;
        Ok(guard.find(booking_id).cloned())
    }

    pub async fn get_dates(
        &self,
        resource_id: ResourceId,
        booking_id: BookingId,
    ) -> Result<Span, EngineError> {
        let guard = self.store.read(&resource_id).await?;
        guard
            .find(booking_id)
            .map(|r| r.span)
            .ok_or(EngineError::UnknownBooking(resource_id, booking_id))
    }

    pub async fn list_resources(&self) -> Vec<ResourceInfo> {
        let mut out = Vec::with_capacity(self.store.resource_count());
        for id in self.store.resource_ids() {
            let Ok(guard) = self.store.read(&id).await else {
                continue;
            };
            out.push(ResourceInfo {
                id: guard.id,
                capacity: guard.capacity,
                size: guard.size(),
            });
        }
        out.sort_by_key(|r| r.id);
        out
    }

    /// Held reservations on one resource, ordered by start date.
    pub async fn get_bookings(&self, resource_id: ResourceId) -> Result<Vec<BookingInfo>, EngineError> {
        let guard = self.store.read(&resource_id).await?;
        Ok(guard.reservations().iter().map(BookingInfo::from).collect())
    }

    /// Every reservation `caller` holds, across resources, ordered by booking id.
    pub async fn bookings_of(&self, caller: &CallerId) -> Vec<BookingInfo> {
        let mut out = Vec::new();
        for id in self.store.resource_ids() {
            let Ok(guard) = self.store.read(&id).await else {
                continue;
            };
            out.extend(
                guard
                    .reservations()
                    .iter()
                    .filter(|r| &r.owner == caller)
                    .map(BookingInfo::from),
            );
        }
        out.sort_by_key(|b| b.id);
        out
    }
}
