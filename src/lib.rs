pub mod audit;
pub mod calendar;
pub mod config;
pub mod error;
pub mod logger;
pub mod messaging;
pub mod models;
pub mod scheduler;
pub mod status;
pub mod store;
pub mod time;

pub use config::SchedulerConfig;
pub use error::{Result, ScheduleError};
pub use messaging::{DeliveryStatus, MessageCenter};
pub use models::{
    AvailabilitySettings, BreakTime, DaySchedule, Provider, ProviderSchedule, ScheduleDate,
    ScheduleUpdate, SlotStatus, TimeSlot, WeeklySchedule,
};
pub use scheduler::{Booking, ScheduleEngine};
pub use status::{AllAvailable, KnownBookings, RandomStatus, SlotStatusSource};
pub use store::ProviderDirectory;
pub use time::ClockTime;
