/// Audit trail for schedule changes.
///
/// Events are kept in memory and mirrored to the `audit` tracing target.
/// Nothing is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    ScheduleUpdated,
    AvailabilityUpdated,
    DateBlocked,
    DateUnblocked,
    SlotBooked,
    SlotReleased,
}

impl AuditAction {
    pub fn name(&self) -> &str {
        match self {
            AuditAction::ScheduleUpdated => "SCHEDULE_UPDATED",
            AuditAction::AvailabilityUpdated => "AVAILABILITY_UPDATED",
            AuditAction::DateBlocked => "DATE_BLOCKED",
            AuditAction::DateUnblocked => "DATE_UNBLOCKED",
            AuditAction::SlotBooked => "SLOT_BOOKED",
            AuditAction::SlotReleased => "SLOT_RELEASED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub provider_id: String,
    pub details: String,
}

#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    events: Vec<AuditEvent>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: AuditAction, provider_id: &str, details: impl Into<String>) {
        let event = AuditEvent {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action,
            provider_id: provider_id.to_string(),
            details: details.into(),
        };

        tracing::info!(
            target: "audit",
            action = event.action.name(),
            provider_id = %event.provider_id,
            "{}",
            event.details
        );
        self.events.push(event);
    }

    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    pub fn events_for(&self, provider_id: &str) -> Vec<&AuditEvent> {
        self.events
            .iter()
            .filter(|e| e.provider_id == provider_id)
            .collect()
    }

    pub fn last(&self) -> Option<&AuditEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
