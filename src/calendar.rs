/// Calendar generation and conflict checks for provider schedules.
///
/// This module turns a provider's recurring weekly template into concrete
/// `ScheduleDate`s and verifies that a candidate list of dates has no
/// overlapping slots.

use crate::models::{slot_id, AvailabilitySettings, DaySchedule, ScheduleDate, TimeSlot};
use crate::status::SlotStatusSource;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Two slots on one date that overlap after sorting by start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConflict {
    pub date: NaiveDate,
    pub first: TimeSlot,
    pub second: TimeSlot,
}

/// Generate time slots for a single day.
///
/// Slots start at the day's start time and step by `slot_duration` minutes
/// while a full slot still fits before the end time. A slot whose start
/// falls inside a break is dropped whole, even if it only partially
/// overlaps the break.
pub fn generate_time_slots_for_day(
    date: NaiveDate,
    day: &DaySchedule,
    slot_duration: u32,
    status_source: &mut dyn SlotStatusSource,
) -> Vec<TimeSlot> {
    let mut slots = Vec::new();
    if slot_duration == 0 {
        warn!("Refusing to generate slots for {} with a zero slot duration", date);
        return slots;
    }

    let mut current = day.start_time;
    while let Some(slot_end) = current.add_minutes(slot_duration) {
        if slot_end > day.end_time {
            break;
        }

        if !day.is_on_break(current) {
            if let Ok(slot) = TimeSlot::new(slot_id(date, current), current, slot_end) {
                let status = status_source.status_for(date, current);
                slots.push(slot.with_status(status));
            }
        }

        current = slot_end;
    }

    slots
}

/// Generate the calendar for every day in `[start_date, end_date]`.
///
/// Days whose template entry is unavailable, and blocked dates, produce no
/// entry. Available days are kept even when every slot fell into a break.
pub fn generate_schedule_dates(
    availability: &AvailabilitySettings,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status_source: &mut dyn SlotStatusSource,
) -> Vec<ScheduleDate> {
    let mut dates = Vec::new();

    for date in start_date.iter_days().take_while(|d| *d <= end_date) {
        let day = availability.weekly_schedule.day(date.weekday());

        if !day.is_available {
            continue;
        }
        if availability.is_blocked(date) {
            debug!("Skipping blocked date {}", date);
            continue;
        }

        let time_slots = generate_time_slots_for_day(
            date,
            day,
            availability.default_slot_duration,
            status_source,
        );
        debug!("Generated {} slots for {} ({})", time_slots.len(), date, date.weekday());
        dates.push(ScheduleDate::new(date, time_slots));
    }

    dates
}

/// Find the first pair of overlapping slots in a candidate schedule.
///
/// Slots are grouped by date first, so entries that repeat a date are
/// checked against each other. Each group is sorted by start time and only
/// adjacent pairs are compared, which is enough to catch any pairwise
/// overlap. Touching slots (`end == next start`) do not conflict.
pub fn find_conflict(dates: &[ScheduleDate]) -> Option<SlotConflict> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&TimeSlot>> = BTreeMap::new();
    for schedule_date in dates {
        by_date
            .entry(schedule_date.date)
            .or_default()
            .extend(schedule_date.time_slots.iter());
    }

    for (date, mut slots) in by_date {
        slots.sort_by_key(|s| s.start_time);

        for pair in slots.windows(2) {
            if pair[0].end_time > pair[1].start_time {
                return Some(SlotConflict {
                    date,
                    first: pair[0].clone(),
                    second: pair[1].clone(),
                });
            }
        }
    }
    None
}

/// Fold entries that share a date into one, keeping first-seen date order.
/// Slots of every date end up sorted by start time.
pub fn merge_dates(dates: Vec<ScheduleDate>) -> Vec<ScheduleDate> {
    let mut merged: Vec<ScheduleDate> = Vec::with_capacity(dates.len());
    for entry in dates {
        match merged.iter_mut().find(|d| d.date == entry.date) {
            Some(existing) => existing.time_slots.extend(entry.time_slots),
            None => merged.push(entry),
        }
    }
    for schedule_date in &mut merged {
        schedule_date.time_slots.sort_by_key(|s| s.start_time);
    }
    merged
}
