/// Data models for provider scheduling.
///
/// This module defines the core data structures used throughout the system:
/// - SlotStatus: Booking state of a generated time slot
/// - BreakTime / DaySchedule / WeeklySchedule: Recurring availability template
/// - AvailabilitySettings: Template plus blocked dates and slot duration
/// - TimeSlot / ScheduleDate / ProviderSchedule: Concrete calendar output
/// - Provider: A bookable service provider

use crate::error::{Result, ScheduleError};
use crate::time::ClockTime;
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_SLOT_DURATION: u32 = 30;

/// Booking state of a time slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Booked,
    Blocked,
}

impl SlotStatus {
    /// Convert a string to a SlotStatus value.
    pub fn from_string(value: &str) -> Result<Self> {
        match value.to_lowercase().trim() {
            "available" => Ok(SlotStatus::Available),
            "booked" => Ok(SlotStatus::Booked),
            "blocked" => Ok(SlotStatus::Blocked),
            _ => Err(ScheduleError::InvalidSlot {
                message: format!(
                    "Invalid status: '{}'. Must be one of: available, booked, blocked",
                    value
                ),
            }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SlotStatus::Available => "AVAILABLE",
            SlotStatus::Booked => "BOOKED",
            SlotStatus::Blocked => "BLOCKED",
        }
    }
}

/// A pause inside a working day, half-open `[start_time, end_time)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakTime {
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl BreakTime {
    pub fn new(start_time: ClockTime, end_time: ClockTime) -> Result<Self> {
        if end_time <= start_time {
            return Err(ScheduleError::InvalidAvailability {
                message: format!("Break {} - {} must end after it starts", start_time, end_time),
            });
        }
        Ok(BreakTime {
            start_time,
            end_time,
        })
    }

    /// Check if a slot starting at `time` begins inside this break.
    pub fn contains(&self, time: ClockTime) -> bool {
        self.start_time <= time && time < self.end_time
    }
}

/// Working hours for one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub is_available: bool,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[serde(default)]
    pub break_times: Vec<BreakTime>,
}

impl DaySchedule {
    /// A working day without breaks.
    pub fn working(start_time: ClockTime, end_time: ClockTime) -> Self {
        DaySchedule {
            is_available: true,
            start_time,
            end_time,
            break_times: Vec::new(),
        }
    }

    pub fn off() -> Self {
        DaySchedule {
            is_available: false,
            start_time: ClockTime::MIDNIGHT,
            end_time: ClockTime::MIDNIGHT,
            break_times: Vec::new(),
        }
    }

    pub fn with_break(mut self, break_time: BreakTime) -> Self {
        self.break_times.push(break_time);
        self.break_times.sort_by_key(|b| b.start_time);
        self
    }

    /// True when a slot starting at `time` would begin inside a break.
    pub fn is_on_break(&self, time: ClockTime) -> bool {
        self.break_times.iter().any(|b| b.contains(time))
    }

    /// Working hours must be a proper interval and every break must sit inside them.
    pub fn validate(&self, day: Weekday) -> Result<()> {
        if !self.is_available {
            return Ok(());
        }
        if self.end_time <= self.start_time {
            return Err(ScheduleError::InvalidAvailability {
                message: format!(
                    "{}: end time {} must be after start time {}",
                    weekday_name(day),
                    self.end_time,
                    self.start_time
                ),
            });
        }
        for b in &self.break_times {
            if b.end_time <= b.start_time
                || b.start_time < self.start_time
                || b.start_time >= self.end_time
                || b.end_time > self.end_time
            {
                return Err(ScheduleError::InvalidAvailability {
                    message: format!(
                        "{}: break {} - {} is outside working hours {} - {}",
                        weekday_name(day),
                        b.start_time,
                        b.end_time,
                        self.start_time,
                        self.end_time
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Lowercase weekday name as used by the weekly template keys.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Recurring availability, one entry per weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub monday: DaySchedule,
    pub tuesday: DaySchedule,
    pub wednesday: DaySchedule,
    pub thursday: DaySchedule,
    pub friday: DaySchedule,
    pub saturday: DaySchedule,
    pub sunday: DaySchedule,
}

impl WeeklySchedule {
    /// The same working day Monday through Friday, weekends off.
    pub fn weekdays(day: DaySchedule) -> Self {
        WeeklySchedule {
            monday: day.clone(),
            tuesday: day.clone(),
            wednesday: day.clone(),
            thursday: day.clone(),
            friday: day,
            saturday: DaySchedule::off(),
            sunday: DaySchedule::off(),
        }
    }

    pub fn day(&self, weekday: Weekday) -> &DaySchedule {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for weekday in ALL_WEEKDAYS {
            self.day(weekday).validate(weekday)?;
        }
        Ok(())
    }
}

pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl Default for WeeklySchedule {
    /// Monday to Friday 09:00 - 17:00 with a lunch break 12:00 - 13:00.
    fn default() -> Self {
        WeeklySchedule::weekdays(
            DaySchedule::working(ClockTime::at(9, 0), ClockTime::at(17, 0)).with_break(BreakTime {
                start_time: ClockTime::at(12, 0),
                end_time: ClockTime::at(13, 0),
            }),
        )
    }
}

/// Everything the generator needs to know about a provider's availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySettings {
    #[serde(default)]
    pub weekly_schedule: WeeklySchedule,
    #[serde(default)]
    pub blocked_dates: BTreeSet<NaiveDate>,
    #[serde(default = "default_slot_duration")]
    pub default_slot_duration: u32,
}

fn default_slot_duration() -> u32 {
    DEFAULT_SLOT_DURATION
}

impl Default for AvailabilitySettings {
    fn default() -> Self {
        AvailabilitySettings {
            weekly_schedule: WeeklySchedule::default(),
            blocked_dates: BTreeSet::new(),
            default_slot_duration: DEFAULT_SLOT_DURATION,
        }
    }
}

impl AvailabilitySettings {
    pub fn is_blocked(&self, date: NaiveDate) -> bool {
        self.blocked_dates.contains(&date)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_slot_duration == 0 {
            return Err(ScheduleError::InvalidAvailability {
                message: "Slot duration must be positive".to_string(),
            });
        }
        self.weekly_schedule.validate()
    }
}

/// A concrete, bookable interval on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: String,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub status: SlotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TimeSlot {
    /// Create a new available time slot with validation.
    pub fn new(id: String, start_time: ClockTime, end_time: ClockTime) -> Result<Self> {
        if end_time <= start_time {
            return Err(ScheduleError::InvalidSlot {
                message: format!(
                    "End time {} must be after start time {}",
                    end_time, start_time
                ),
            });
        }

        Ok(TimeSlot {
            id,
            start_time,
            end_time,
            status: SlotStatus::Available,
            appointment_id: None,
            patient_id: None,
            notes: None,
        })
    }

    pub fn with_status(mut self, status: SlotStatus) -> Self {
        self.status = status;
        self
    }

    /// Get the duration in minutes.
    pub fn duration_minutes(&self) -> i64 {
        self.start_time.minutes_until(self.end_time)
    }

    /// Check if this time slot overlaps with another.
    pub fn overlaps_with(&self, other: &TimeSlot) -> bool {
        self.start_time < other.end_time && self.end_time > other.start_time
    }

    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }
}

/// Slot id derived from the date and start time, stable across generations.
pub fn slot_id(date: NaiveDate, start_time: ClockTime) -> String {
    format!("{}-{}", date.format("%Y-%m-%d"), start_time)
}

/// One calendar day and its slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDate {
    pub date: NaiveDate,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
}

impl ScheduleDate {
    pub fn new(date: NaiveDate, time_slots: Vec<TimeSlot>) -> Self {
        ScheduleDate { date, time_slots }
    }

    pub fn available_slots(&self) -> Vec<&TimeSlot> {
        self.time_slots.iter().filter(|s| s.is_available()).collect()
    }

    /// Slot intervals without status, for comparing generations.
    pub fn boundaries(&self) -> Vec<(ClockTime, ClockTime)> {
        self.time_slots
            .iter()
            .map(|s| (s.start_time, s.end_time))
            .collect()
    }
}

/// The concrete calendar currently published for a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSchedule {
    #[serde(default)]
    pub dates: Vec<ScheduleDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl ProviderSchedule {
    pub fn date(&self, date: NaiveDate) -> Option<&ScheduleDate> {
        self.dates.iter().find(|d| d.date == date)
    }

    pub fn date_mut(&mut self, date: NaiveDate) -> Option<&mut ScheduleDate> {
        self.dates.iter_mut().find(|d| d.date == date)
    }
}

/// Partial schedule for updates. Fields left `None` are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleUpdate {
    #[serde(default)]
    pub dates: Option<Vec<ScheduleDate>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl ScheduleUpdate {
    pub fn with_dates(dates: Vec<ScheduleDate>) -> Self {
        ScheduleUpdate {
            dates: Some(dates),
            last_updated: None,
        }
    }
}

/// Represents a bookable service provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub availability: AvailabilitySettings,
    #[serde(default)]
    pub schedule: ProviderSchedule,
}

impl Provider {
    /// Create a new provider with validation.
    pub fn new(id: String, name: String, specialty: String) -> Result<Self> {
        let provider = Provider {
            id,
            name,
            specialty,
            availability: AvailabilitySettings::default(),
            schedule: ProviderSchedule::default(),
        };
        provider.validate()?;
        Ok(provider)
    }

    pub fn with_availability(mut self, availability: AvailabilitySettings) -> Self {
        self.availability = availability;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ScheduleError::InvalidProvider {
                message: "Provider ID cannot be empty".to_string(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(ScheduleError::InvalidProvider {
                message: "Provider name cannot be empty".to_string(),
            });
        }
        self.availability.validate()
    }
}
