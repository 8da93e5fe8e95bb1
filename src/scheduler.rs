/// Provider schedule engine.
///
/// This module provides the ScheduleEngine struct which owns the provider
/// directory, generates concrete calendars from weekly templates, and
/// accepts schedule updates only when they are free of overlapping slots.

use crate::audit::{AuditAction, AuditTrail};
use crate::calendar::{find_conflict, generate_schedule_dates, merge_dates};
use crate::config::SchedulerConfig;
use crate::error::{Result, ScheduleError};
use crate::models::{AvailabilitySettings, ScheduleDate, ScheduleUpdate, SlotStatus, TimeSlot};
use crate::status::{RandomStatus, SlotStatusSource};
use crate::store::ProviderDirectory;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of booking a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub appointment_id: String,
    pub provider_id: String,
    pub patient_id: String,
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

/// Schedule engine for a set of providers.
///
/// Generation is stateless: every call builds a fresh list of dates from
/// the provider's current availability. Only `update_schedule` (and the
/// booking helpers built on the stored schedule) change provider state.
pub struct ScheduleEngine {
    directory: ProviderDirectory,
    status_source: Box<dyn SlotStatusSource>,
    audit: AuditTrail,
}

impl ScheduleEngine {
    /// Initialize the engine.
    pub fn new(directory: ProviderDirectory, status_source: Box<dyn SlotStatusSource>) -> Self {
        ScheduleEngine {
            directory,
            status_source,
            audit: AuditTrail::new(),
        }
    }

    /// Build the engine from validated configuration.
    pub fn from_config(config: &SchedulerConfig) -> Result<Self> {
        let directory = ProviderDirectory::from_providers(config.providers.iter().cloned())?;
        let status = RandomStatus::new(config.engine.seed, config.engine.available_ratio);
        info!(
            "Schedule engine ready with {} providers (seed: {:?})",
            directory.len(),
            config.engine.seed
        );
        Ok(Self::new(directory, Box::new(status)))
    }

    pub fn directory(&self) -> &ProviderDirectory {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut ProviderDirectory {
        &mut self.directory
    }

    pub fn audit_trail(&self) -> &AuditTrail {
        &self.audit
    }

    /// Swap the source used to assign slot status on generation.
    pub fn set_status_source(&mut self, status_source: Box<dyn SlotStatusSource>) {
        self.status_source = status_source;
    }

    /// Drop all providers and audit history.
    pub fn reset(&mut self) {
        self.directory.clear();
        self.audit.clear();
    }

    /// Generate a provider's calendar for `[start_date, end_date]`.
    pub fn generate_schedule(
        &mut self,
        provider_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<ScheduleDate>> {
        let provider = self.directory.require(provider_id)?;

        let dates = generate_schedule_dates(
            &provider.availability,
            start_date,
            end_date,
            self.status_source.as_mut(),
        );

        debug!(
            "Generated {} schedule dates for {} between {} and {}",
            dates.len(),
            provider_id,
            start_date,
            end_date
        );
        Ok(dates)
    }

    /// Apply a partial schedule to a provider.
    ///
    /// Supplied `dates` are checked for overlapping slots first; on conflict
    /// nothing is changed. Entries that repeat a date are stored as one.
    /// Each supplied field replaces the stored one.
    pub fn update_schedule(&mut self, provider_id: &str, update: ScheduleUpdate) -> Result<()> {
        let provider = self.directory.require_mut(provider_id)?;

        if let Some(dates) = &update.dates {
            if let Some(conflict) = find_conflict(dates) {
                warn!(
                    "Rejected schedule update for {}: {} overlaps {} on {}",
                    provider_id, conflict.first.id, conflict.second.id, conflict.date
                );
                return Err(ScheduleError::Conflict {
                    date: conflict.date,
                    first_slot: conflict.first.id,
                    first_end: conflict.first.end_time.to_string(),
                    second_slot: conflict.second.id,
                    second_start: conflict.second.start_time.to_string(),
                });
            }
        }

        let dates = update.dates.map(merge_dates);
        let date_count = dates.as_ref().map(Vec::len);
        if let Some(dates) = dates {
            provider.schedule.dates = dates;
        }
        provider.schedule.last_updated = Some(update.last_updated.unwrap_or_else(Utc::now));

        let details = match date_count {
            Some(n) => format!("Schedule replaced with {} dates", n),
            None => "Schedule metadata updated".to_string(),
        };
        info!("{} for {}", details, provider_id);
        self.audit
            .record(AuditAction::ScheduleUpdated, provider_id, details);
        Ok(())
    }

    /// Generate a calendar and store it as the provider's schedule.
    pub fn publish_schedule(
        &mut self,
        provider_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<ScheduleDate>> {
        let dates = self.generate_schedule(provider_id, start_date, end_date)?;
        self.update_schedule(provider_id, ScheduleUpdate::with_dates(dates.clone()))?;
        Ok(dates)
    }

    /// Replace a provider's availability settings as a whole.
    pub fn update_availability(
        &mut self,
        provider_id: &str,
        availability: AvailabilitySettings,
    ) -> Result<()> {
        availability.validate()?;
        let provider = self.directory.require_mut(provider_id)?;
        provider.availability = availability;

        info!("Availability updated for {}", provider_id);
        self.audit.record(
            AuditAction::AvailabilityUpdated,
            provider_id,
            "Weekly schedule and blocked dates replaced",
        );
        Ok(())
    }

    /// Block a date. Returns false when it was already blocked.
    pub fn block_date(&mut self, provider_id: &str, date: NaiveDate) -> Result<bool> {
        let provider = self.directory.require_mut(provider_id)?;
        let added = provider.availability.blocked_dates.insert(date);
        if added {
            self.audit
                .record(AuditAction::DateBlocked, provider_id, date.to_string());
        }
        Ok(added)
    }

    /// Unblock a date. Returns false when it was not blocked.
    pub fn unblock_date(&mut self, provider_id: &str, date: NaiveDate) -> Result<bool> {
        let provider = self.directory.require_mut(provider_id)?;
        let removed = provider.availability.blocked_dates.remove(&date);
        if removed {
            self.audit
                .record(AuditAction::DateUnblocked, provider_id, date.to_string());
        }
        Ok(removed)
    }

    /// Available slots of the stored schedule on one date.
    pub fn available_slots(&self, provider_id: &str, date: NaiveDate) -> Result<Vec<TimeSlot>> {
        let provider = self.directory.require(provider_id)?;
        Ok(provider
            .schedule
            .date(date)
            .map(|d| d.available_slots().into_iter().cloned().collect())
            .unwrap_or_default())
    }

    /// Book an available slot of the stored schedule for a patient.
    pub fn book_slot(
        &mut self,
        provider_id: &str,
        date: NaiveDate,
        slot_id: &str,
        patient_id: &str,
    ) -> Result<Booking> {
        let slot = self.stored_slot_mut(provider_id, date, slot_id)?;
        if !slot.is_available() {
            return Err(ScheduleError::SlotUnavailable {
                slot_id: slot_id.to_string(),
            });
        }

        let appointment_id = Uuid::new_v4().to_string();
        slot.status = SlotStatus::Booked;
        slot.appointment_id = Some(appointment_id.clone());
        slot.patient_id = Some(patient_id.to_string());
        let slot = slot.clone();

        info!(
            "Booked {} with {} for patient {}",
            slot.id, provider_id, patient_id
        );
        self.audit.record(
            AuditAction::SlotBooked,
            provider_id,
            format!("Slot {} booked as appointment {}", slot.id, appointment_id),
        );

        Ok(Booking {
            appointment_id,
            provider_id: provider_id.to_string(),
            patient_id: patient_id.to_string(),
            date,
            slot,
        })
    }

    /// Free a booked slot so it can be booked again.
    pub fn release_slot(&mut self, provider_id: &str, date: NaiveDate, slot_id: &str) -> Result<()> {
        let slot = self.stored_slot_mut(provider_id, date, slot_id)?;
        if slot.status != SlotStatus::Booked {
            return Err(ScheduleError::InvalidSlot {
                message: format!("Time slot {} is not booked", slot_id),
            });
        }

        slot.status = SlotStatus::Available;
        slot.appointment_id = None;
        slot.patient_id = None;

        info!("Released {} with {}", slot_id, provider_id);
        self.audit.record(
            AuditAction::SlotReleased,
            provider_id,
            format!("Slot {} released", slot_id),
        );
        Ok(())
    }

    fn stored_slot_mut(
        &mut self,
        provider_id: &str,
        date: NaiveDate,
        slot_id: &str,
    ) -> Result<&mut TimeSlot> {
        let not_found = || ScheduleError::SlotNotFound {
            date,
            slot_id: slot_id.to_string(),
        };

        self.directory
            .require_mut(provider_id)?
            .schedule
            .date_mut(date)
            .ok_or_else(not_found)?
            .time_slots
            .iter_mut()
            .find(|s| s.id == slot_id)
            .ok_or_else(not_found)
    }
}

impl std::fmt::Display for ScheduleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ScheduleEngine(providers={}, audit_events={})",
            self.directory.len(),
            self.audit.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;
    use crate::status::AllAvailable;
    use crate::time::ClockTime;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn engine() -> ScheduleEngine {
        let provider =
            Provider::new("p1".to_string(), "Dr. Demo".to_string(), "General".to_string()).unwrap();
        let directory = ProviderDirectory::from_providers(vec![provider]).unwrap();
        ScheduleEngine::new(directory, Box::new(AllAvailable))
    }

    fn slot(id: &str, start: &str, end: &str) -> TimeSlot {
        TimeSlot::new(
            id.to_string(),
            start.parse::<ClockTime>().unwrap(),
            end.parse::<ClockTime>().unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_provider_is_distinguishable() {
        let mut engine = engine();
        let err = engine
            .generate_schedule("nobody", monday(), monday())
            .unwrap_err();
        assert!(matches!(err, ScheduleError::ProviderNotFound(_)));

        let err = engine
            .update_schedule("nobody", ScheduleUpdate::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_conflicting_update_leaves_schedule_untouched() {
        let mut engine = engine();
        engine.publish_schedule("p1", monday(), monday()).unwrap();
        let before = engine.directory().get("p1").unwrap().schedule.clone();
        let events_before = engine.audit_trail().len();

        let bad = ScheduleUpdate::with_dates(vec![ScheduleDate::new(
            monday(),
            vec![slot("a", "09:00", "09:30"), slot("b", "09:15", "09:45")],
        )]);
        let err = engine.update_schedule("p1", bad).unwrap_err();
        assert!(err.is_conflict());

        assert_eq!(engine.directory().get("p1").unwrap().schedule, before);
        assert_eq!(engine.audit_trail().len(), events_before);
    }

    #[test]
    fn test_repeated_date_entries_are_checked_and_stored_together() {
        let mut engine = engine();

        let overlapping = ScheduleUpdate::with_dates(vec![
            ScheduleDate::new(monday(), vec![slot("a", "09:00", "09:30")]),
            ScheduleDate::new(monday(), vec![slot("b", "09:15", "09:45")]),
        ]);
        let err = engine.update_schedule("p1", overlapping).unwrap_err();
        assert!(err.is_conflict());
        assert!(engine.directory().get("p1").unwrap().schedule.dates.is_empty());

        let split = ScheduleUpdate::with_dates(vec![
            ScheduleDate::new(monday(), vec![slot("b", "09:30", "10:00")]),
            ScheduleDate::new(monday(), vec![slot("a", "09:00", "09:30")]),
        ]);
        engine.update_schedule("p1", split).unwrap();
        let stored = &engine.directory().get("p1").unwrap().schedule;
        assert_eq!(stored.dates.len(), 1);
        assert_eq!(stored.dates[0].time_slots[0].id, "a");

        let booking = engine.book_slot("p1", monday(), "b", "patient-9").unwrap();
        assert_eq!(booking.slot.id, "b");
        assert_eq!(engine.available_slots("p1", monday()).unwrap().len(), 1);
    }

    #[test]
    fn test_update_without_dates_keeps_dates() {
        let mut engine = engine();
        engine.publish_schedule("p1", monday(), monday()).unwrap();
        engine
            .update_schedule("p1", ScheduleUpdate::default())
            .unwrap();
        assert_eq!(engine.directory().get("p1").unwrap().schedule.dates.len(), 1);
    }

    #[test]
    fn test_book_and_release() {
        let mut engine = engine();
        engine.publish_schedule("p1", monday(), monday()).unwrap();

        let open = engine.available_slots("p1", monday()).unwrap();
        assert_eq!(open.len(), 14);

        let booking = engine
            .book_slot("p1", monday(), &open[0].id, "patient-7")
            .unwrap();
        assert_eq!(booking.slot.status, SlotStatus::Booked);
        assert_eq!(booking.slot.patient_id.as_deref(), Some("patient-7"));
        assert_eq!(engine.available_slots("p1", monday()).unwrap().len(), 13);

        let again = engine.book_slot("p1", monday(), &open[0].id, "patient-8");
        assert!(matches!(again, Err(ScheduleError::SlotUnavailable { .. })));

        engine.release_slot("p1", monday(), &open[0].id).unwrap();
        assert_eq!(engine.available_slots("p1", monday()).unwrap().len(), 14);
        assert!(engine.release_slot("p1", monday(), &open[0].id).is_err());

        let missing = engine.book_slot("p1", monday(), "no-such-slot", "patient-7");
        assert!(matches!(missing, Err(ScheduleError::SlotNotFound { .. })));
    }

    #[test]
    fn test_block_and_unblock_date() {
        let mut engine = engine();
        assert!(engine.block_date("p1", monday()).unwrap());
        assert!(!engine.block_date("p1", monday()).unwrap());
        assert!(engine.generate_schedule("p1", monday(), monday()).unwrap().is_empty());

        assert!(engine.unblock_date("p1", monday()).unwrap());
        assert_eq!(engine.generate_schedule("p1", monday(), monday()).unwrap().len(), 1);
    }

    #[test]
    fn test_update_availability_validates() {
        let mut engine = engine();
        let mut settings = AvailabilitySettings::default();
        settings.default_slot_duration = 0;
        assert!(engine.update_availability("p1", settings).is_err());

        let mut settings = AvailabilitySettings::default();
        settings.default_slot_duration = 60;
        engine.update_availability("p1", settings).unwrap();
        let dates = engine.generate_schedule("p1", monday(), monday()).unwrap();
        // 09-12 and 13-17 in hour slots.
        assert_eq!(dates[0].time_slots.len(), 7);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut engine = engine();
        engine.block_date("p1", monday()).unwrap();
        engine.reset();
        assert!(engine.directory().is_empty());
        assert!(engine.audit_trail().is_empty());
    }
}
