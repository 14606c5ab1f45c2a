use crate::limits::*;
use crate::model::*;

use super::EngineError;

pub fn now_secs() -> Secs {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as Secs)
}

/// Validate raw booking input and build its span.
pub(crate) fn booking_span(
    caller: &CallerId,
    from_date: Secs,
    duration_days: i64,
) -> Result<Span, EngineError> {
    if duration_days < 1 {
        return Err(EngineError::InvalidDuration(duration_days));
    }
    if duration_days > MAX_DURATION_DAYS {
        return Err(EngineError::LimitExceeded("duration too long"));
    }
    if caller.as_str().len() > MAX_CALLER_ID_LEN {
        return Err(EngineError::LimitExceeded("caller id too long"));
    }
    if !(MIN_VALID_TIMESTAMP..=MAX_VALID_TIMESTAMP).contains(&from_date) {
        return Err(EngineError::LimitExceeded("timestamp out of range"));
    }
    let span = Span::from_days(from_date, duration_days);
    if span.end > MAX_VALID_TIMESTAMP {
        return Err(EngineError::LimitExceeded("timestamp out of range"));
    }
    Ok(span)
}

/// First held reservation overlapping `span`, if any.
pub(crate) fn find_conflict(rs: &ResourceState, span: &Span) -> Option<BookingId> {
    rs.overlapping(span).next().map(|r| r.id)
}
