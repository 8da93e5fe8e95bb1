use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error(
        "Schedule conflict on {date}: slot {first_slot} ends at {first_end} \
         after slot {second_slot} starts at {second_start}"
    )]
    Conflict {
        date: NaiveDate,
        first_slot: String,
        first_end: String,
        second_slot: String,
        second_start: String,
    },

    #[error("Invalid time '{0}': expected HH:MM between 00:00 and 24:00")]
    InvalidTime(String),

    #[error("Invalid time slot: {message}")]
    InvalidSlot { message: String },

    #[error("Invalid availability: {message}")]
    InvalidAvailability { message: String },

    #[error("Invalid provider: {message}")]
    InvalidProvider { message: String },

    #[error("Time slot {slot_id} not found on {date}")]
    SlotNotFound { date: NaiveDate, slot_id: String },

    #[error("Time slot {slot_id} is not available")]
    SlotUnavailable { slot_id: String },

    #[error("Message not found: {0}")]
    MessageNotFound(Uuid),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Delivery task failed: {0}")]
    Delivery(#[from] tokio::task::JoinError),
}

impl ScheduleError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ScheduleError::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ScheduleError::ProviderNotFound(_)
                | ScheduleError::SlotNotFound { .. }
                | ScheduleError::MessageNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
