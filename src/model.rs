use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix seconds — the only time type.
pub type Secs = i64;

pub const SECS_PER_DAY: Secs = 86_400;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Secs,
    pub end: Secs,
}

impl Span {
    pub fn new(start: Secs, end: Secs) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    /// `[from, from + days * 86400)`.
    pub fn from_days(from: Secs, days: i64) -> Self {
        Self::new(from, from + days * SECS_PER_DAY)
    }

    pub fn duration_secs(&self) -> Secs {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True while the interval has not fully elapsed at `now`.
    pub fn ends_after(&self, now: Secs) -> bool {
        self.end > now
    }
}

/// Opaque resource handle, assigned by `register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub Ulid);

impl ResourceId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Booking handle from the engine-wide monotonic counter. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub u64);

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identity of whoever submitted a request. Compared byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CallerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CallerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A held date range on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: BookingId,
    pub resource_id: ResourceId,
    pub owner: CallerId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ResourceState {
    pub id: ResourceId,
    /// Max concurrently held reservations. Fixed for the resource's lifetime.
    pub capacity: u32,
    /// Held reservations, sorted by `span.start`.
    pub reservations: Vec<Reservation>,
}

impl ResourceState {
    pub fn new(id: ResourceId, capacity: u32) -> Self {
        Self {
            id,
            capacity,
            reservations: Vec::new(),
        }
    }

    /// Return only reservations whose span overlaps the query window.
    /// Uses binary search to skip reservations starting at or after `query.end`.
    pub fn overlapping(&self, query: &Span) -> impl Iterator<Item = &Reservation> {
        let right_bound = self
            .reservations
            .partition_point(|r| r.span.start < query.end);
        self.reservations[..right_bound]
            .iter()
            .filter(move |r| r.span.end > query.start)
    }
}

// ── Outcomes ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum RegisterOutcome {
    Registered { resource_id: ResourceId },
    InvalidCapacity { requested: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum BookOutcome {
    BookSuccess {
        booking_id: BookingId,
        from_date: Secs,
        to_date: Secs,
    },
    NoMoreSpace,
    /// Carries the held reservation the candidate overlapped.
    BookConflict { with: BookingId },
    UnknownResource,
}

impl BookOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BookOutcome::BookSuccess { .. })
    }

    pub fn booking_id(&self) -> Option<BookingId> {
        match self {
            BookOutcome::BookSuccess { booking_id, .. } => Some(*booking_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum CancelOutcome {
    Cancellation { booking_id: BookingId },
    PermissionDenied,
    UnknownBooking,
}

/// Outcome projected onto a notification record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Event {
    Registered {
        resource_id: ResourceId,
        capacity: u32,
    },
    BookSuccess {
        resource_id: ResourceId,
        booking_id: BookingId,
        owner: CallerId,
        span: Span,
    },
    BookConflict {
        resource_id: ResourceId,
        caller: CallerId,
        span: Span,
    },
    NoMoreSpace {
        resource_id: ResourceId,
        caller: CallerId,
    },
    Cancellation {
        resource_id: ResourceId,
        booking_id: BookingId,
    },
    PermissionDenied {
        resource_id: ResourceId,
        booking_id: BookingId,
        caller: CallerId,
    },
}

impl Event {
    pub fn resource_id(&self) -> ResourceId {
        match self {
            Event::Registered { resource_id, .. }
            | Event::BookSuccess { resource_id, .. }
            | Event::BookConflict { resource_id, .. }
            | Event::NoMoreSpace { resource_id, .. }
            | Event::Cancellation { resource_id, .. }
            | Event::PermissionDenied { resource_id, .. } => *resource_id,
        }
    }
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceInfo {
    pub id: ResourceId,
    pub capacity: u32,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingInfo {
    pub id: BookingId,
    pub resource_id: ResourceId,
    pub owner: CallerId,
    pub from_date: Secs,
    pub to_date: Secs,
}

impl From<&Reservation> for BookingInfo {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id,
            resource_id: r.resource_id,
            owner: r.owner.clone(),
            from_date: r.span.start,
            to_date: r.span.end,
        }
    }
}
