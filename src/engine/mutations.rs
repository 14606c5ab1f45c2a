use std::time::Instant;

use tracing::{debug, error, info};

use crate::model::*;
use crate::observability::{self, *};

use super::conflict::{booking_span, find_conflict};
use super::{Engine, EngineError};

impl Engine {
    /// Create a resource holding at most `capacity` concurrent reservations.
    pub fn register(&self, capacity: i64) -> Result<RegisterOutcome, EngineError> {
        let outcome = match self.store.create_resource(capacity) {
            Ok(resource_id) => {
                info!("registered resource {resource_id} (capacity {capacity})");
                metrics::gauge!(RESOURCES_ACTIVE).set(self.store.resource_count() as f64);
                self.notify.send(&Event::Registered {
                    resource_id,
                    capacity: capacity as u32,
                });
                RegisterOutcome::Registered { resource_id }
            }
            Err(EngineError::InvalidCapacity(requested)) => {
                RegisterOutcome::InvalidCapacity { requested }
            }
            Err(e) => {
                metrics::counter!(REQUEST_ERRORS_TOTAL, "op" => "register").increment(1);
                return Err(e);
            }
        };
        metrics::counter!(
            OPERATIONS_TOTAL,
            "op" => "register",
            "outcome" => observability::register_label(&outcome)
        )
        .increment(1);
        Ok(outcome)
    }

    /// Reserve `[from_date, from_date + duration_days)` on a resource.
    ///
    /// Checks run in a fixed order and stop at the first hit: the resource
    /// must exist, it must have a free slot, and the range must not overlap
    /// any held reservation. A full resource answers `NoMoreSpace` without
    /// looking at the dates.
    pub async fn book(
        &self,
        resource_id: ResourceId,
        caller: CallerId,
        from_date: Secs,
        duration_days: i64,
    ) -> Result<BookOutcome, EngineError> {
        let started = Instant::now();
        let span = booking_span(&caller, from_date, duration_days).inspect_err(|_| {
            metrics::counter!(REQUEST_ERRORS_TOTAL, "op" => "book").increment(1);
        })?;

        let Ok(mut guard) = self.store.write(&resource_id).await else {
            return Ok(self.finish_book(started, BookOutcome::UnknownResource, None));
        };

        if !guard.has_space() {
            let event = Event::NoMoreSpace { resource_id, caller };
            return Ok(self.finish_book(started, BookOutcome::NoMoreSpace, Some(event)));
        }

        if let Some(with) = find_conflict(&guard, &span) {
            debug!("booking on {resource_id} by {caller} conflicts with {with}");
            let event = Event::BookConflict { resource_id, caller, span };
            return Ok(self.finish_book(started, BookOutcome::BookConflict { with }, Some(event)));
        }

        let booking_id = self.store.next_booking_id();
        let reservation = Reservation {
            id: booking_id,
            resource_id,
            owner: caller.clone(),
            span,
        };
        if let Err(e) = guard.insert(reservation) {
            error!("invariant violated on {resource_id}: {e}");
            metrics::counter!(INVARIANT_VIOLATIONS_TOTAL).increment(1);
            return Err(e);
        }

        debug!(
            "booked {booking_id} on {resource_id} for {caller}: [{}, {})",
            span.start, span.end
        );
        metrics::gauge!(RESERVATIONS_HELD).increment(1.0);
        let event = Event::BookSuccess {
            resource_id,
            booking_id,
            owner: caller,
            span,
        };
        let outcome = BookOutcome::BookSuccess {
            booking_id,
            from_date: span.start,
            to_date: span.end,
        };
        let outcome = self.finish_book(started, outcome, Some(event));
        drop(guard);
        Ok(outcome)
    }

    /// Release a reservation. Only the caller that booked it may cancel.
    pub async fn cancel(
        &self,
        resource_id: ResourceId,
        booking_id: BookingId,
        caller: CallerId,
    ) -> Result<CancelOutcome, EngineError> {
        let started = Instant::now();
        let outcome = match self.store.write(&resource_id).await {
            Err(_) => CancelOutcome::UnknownBooking,
            Ok(mut guard) => {
                let owned_by_caller = guard.find(booking_id).map(|r| r.owner == caller);
                match owned_by_caller {
                    None => CancelOutcome::UnknownBooking,
                    Some(false) => {
                        debug!("{caller} may not cancel {booking_id} on {resource_id}");
                        self.notify.send(&Event::PermissionDenied {
                            resource_id,
                            booking_id,
                            caller,
                        });
                        CancelOutcome::PermissionDenied
                    }
                    Some(true) => {
                        guard.remove(booking_id);
                        debug!("cancelled {booking_id} on {resource_id}");
                        metrics::gauge!(RESERVATIONS_HELD).decrement(1.0);
                        self.notify.send(&Event::Cancellation {
                            resource_id,
                            booking_id,
                        });
                        CancelOutcome::Cancellation { booking_id }
                    }
                }
            }
        };

        metrics::counter!(
            OPERATIONS_TOTAL,
            "op" => "cancel",
            "outcome" => observability::cancel_label(&outcome)
        )
        .increment(1);
        metrics::histogram!(OPERATION_DURATION_SECONDS, "op" => "cancel")
            .record(started.elapsed().as_secs_f64());
        Ok(outcome)
    }

    fn finish_book(&self, started: Instant, outcome: BookOutcome, event: Option<Event>) -> BookOutcome {
        metrics::counter!(
            OPERATIONS_TOTAL,
            "op" => "book",
            "outcome" => observability::book_label(&outcome)
        )
        .increment(1);
        metrics::histogram!(OPERATION_DURATION_SECONDS, "op" => "book")
            .record(started.elapsed().as_secs_f64());
        if let Some(event) = event {
            self.notify.send(&event);
        }
        outcome
    }
}
