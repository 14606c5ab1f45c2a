use serde::Deserialize;
use serde_json::{Value, json};

use crate::engine::{Engine, EngineError, now_secs};
use crate::model::*;

/// One driver request, decoded from a JSON line keyed by `op`.
#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Register {
        capacity: i64,
    },
    Book {
        resource_id: ResourceId,
        caller: CallerId,
        from_date: Secs,
        duration_days: i64,
    },
    Cancel {
        resource_id: ResourceId,
        booking_id: BookingId,
        caller: CallerId,
    },
    GetCapacity {
        resource_id: ResourceId,
    },
    GetSize {
        resource_id: ResourceId,
    },
    IsEmpty {
        resource_id: ResourceId,
    },
    HasSpace {
        resource_id: ResourceId,
    },
    GetActiveBookingsCount {
        resource_id: ResourceId,
        /// Defaults to the system clock.
        #[serde(default)]
        now: Option<Secs>,
    },
    FindBook {
        resource_id: ResourceId,
        booking_id: BookingId,
    },
    GetDates {
        resource_id: ResourceId,
        booking_id: BookingId,
    },
    GetBookings {
        resource_id: ResourceId,
    },
    BookingsOf {
        caller: CallerId,
    },
    ListResources,
}

impl Command {
    pub fn label(&self) -> &'static str {
        match self {
            Command::Register { .. } => "register",
            Command::Book { .. } => "book",
            Command::Cancel { .. } => "cancel",
            Command::GetCapacity { .. } => "get_capacity",
            Command::GetSize { .. } => "get_size",
            Command::IsEmpty { .. } => "is_empty",
            Command::HasSpace { .. } => "has_space",
            Command::GetActiveBookingsCount { .. } => "get_active_bookings_count",
            Command::FindBook { .. } => "find_book",
            Command::GetDates { .. } => "get_dates",
            Command::GetBookings { .. } => "get_bookings",
            Command::BookingsOf { .. } => "bookings_of",
            Command::ListResources => "list_resources",
        }
    }
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(CommandError::Empty);
    }
    serde_json::from_str(trimmed).map_err(|e| CommandError::Parse(e.to_string()))
}

/// Run a request against the engine and encode its result.
pub async fn execute(engine: &Engine, cmd: Command) -> Result<Value, CommandError> {
    let value = match cmd {
        Command::Register { capacity } => encode(&engine.register(capacity)?)?,
        Command::Book {
            resource_id,
            caller,
            from_date,
            duration_days,
        } => {
            let outcome = engine
                .book(resource_id, caller, from_date, duration_days)
                .await?;
            encode(&outcome)?
        }
        Command::Cancel {
            resource_id,
            booking_id,
            caller,
        } => encode(&engine.cancel(resource_id, booking_id, caller).await?)?,
        Command::GetCapacity { resource_id } => {
            let capacity = engine.get_capacity(resource_id).await?;
            json!({ "capacity": capacity })
        }
        Command::GetSize { resource_id } => {
            let size = engine.get_size(resource_id).await?;
            json!({ "size": size })
        }
        Command::IsEmpty { resource_id } => {
            let is_empty = engine.is_empty(resource_id).await?;
            json!({ "is_empty": is_empty })
        }
        Command::HasSpace { resource_id } => {
            let has_space = engine.has_space(resource_id).await?;
            json!({ "has_space": has_space })
        }
        Command::GetActiveBookingsCount { resource_id, now } => {
            let now = now.unwrap_or_else(now_secs);
            let active = engine.get_active_bookings_count(resource_id, now).await?;
            json!({ "active": active })
        }
        Command::FindBook {
            resource_id,
            booking_id,
        } => {
            let index = engine.find_book(resource_id, booking_id).await?;
            json!({ "index": index })
        }
        Command::GetDates {
            resource_id,
            booking_id,
        } => {
            let span = engine.get_dates(resource_id, booking_id).await?;
            json!({ "from_date": span.start, "to_date": span.end })
        }
        Command::GetBookings { resource_id } => {
            let bookings = engine.get_bookings(resource_id).await?;
            json!({ "bookings": encode(&bookings)? })
        }
        Command::BookingsOf { caller } => {
            let bookings = engine.bookings_of(&caller).await;
            json!({ "bookings": encode(&bookings)? })
        }
        Command::ListResources => {
            let resources = engine.list_resources().await;
            json!({ "resources": encode(&resources)? })
        }
    };
    Ok(value)
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, CommandError> {
    serde_json::to_value(value).map_err(|e| CommandError::Encode(e.to_string()))
}

#[derive(Debug, PartialEq)]
pub enum CommandError {
    Parse(String),
    Empty,
    Engine(EngineError),
    Encode(String),
}

impl From<EngineError> for CommandError {
    fn from(e: EngineError) -> Self {
        CommandError::Engine(e)
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Parse(s) => write!(f, "parse error: {s}"),
            CommandError::Empty => write!(f, "empty request"),
            CommandError::Engine(e) => write!(f, "{e}"),
            CommandError::Encode(s) => write!(f, "encode error: {s}"),
        }
    }
}

impl std::error::Error for CommandError {}
