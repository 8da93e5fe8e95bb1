/// Secure messaging between patients and providers.
///
/// Messages are stored in memory. Delivery is simulated: `send` stores the
/// message as `Sent` and spawns a task that flips it to `Delivered` after the
/// configured delay. The caller can await that task through the returned
/// receipt or watch all deliveries through `subscribe`.

use crate::config::MessagingConfig;
use crate::error::{Result, ScheduleError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Read,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureMessage {
    pub id: Uuid,
    pub sender_id: String,
    pub recipient_id: String,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub status: DeliveryStatus,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryEvent {
    pub message_id: Uuid,
    pub recipient_id: String,
    pub status: DeliveryStatus,
}

/// Handle on a pending delivery.
#[derive(Debug)]
pub struct DeliveryReceipt {
    pub message_id: Uuid,
    task: JoinHandle<Result<DeliveryStatus>>,
}

impl DeliveryReceipt {
    /// Wait until the simulated delivery has run.
    pub async fn wait(self) -> Result<DeliveryStatus> {
        self.task.await?
    }
}

#[derive(Clone)]
pub struct MessageCenter {
    messages: Arc<Mutex<HashMap<Uuid, SecureMessage>>>,
    events: broadcast::Sender<DeliveryEvent>,
    delivery_delay: Duration,
}

impl MessageCenter {
    pub fn new(delivery_delay: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        MessageCenter {
            messages: Arc::new(Mutex::new(HashMap::new())),
            events,
            delivery_delay,
        }
    }

    pub fn from_config(config: &MessagingConfig) -> Self {
        Self::new(Duration::from_millis(config.delivery_delay_ms))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryEvent> {
        self.events.subscribe()
    }

    /// Store a message and schedule its delivery. Must run inside a tokio runtime.
    pub async fn send(
        &self,
        sender_id: &str,
        recipient_id: &str,
        subject: &str,
        body: &str,
    ) -> DeliveryReceipt {
        let message = SecureMessage {
            id: Uuid::new_v4(),
            sender_id: sender_id.to_string(),
            recipient_id: recipient_id.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            sent_at: Utc::now(),
            status: DeliveryStatus::Sent,
            delivered_at: None,
        };
        let message_id = message.id;

        self.messages.lock().await.insert(message_id, message);
        tracing::debug!("Message {} queued for {}", message_id, recipient_id);

        let task = tokio::spawn(deliver_after(
            Arc::clone(&self.messages),
            self.events.clone(),
            message_id,
            self.delivery_delay,
        ));

        DeliveryReceipt { message_id, task }
    }

    pub async fn message(&self, message_id: Uuid) -> Option<SecureMessage> {
        self.messages.lock().await.get(&message_id).cloned()
    }

    /// Messages addressed to a recipient, oldest first.
    pub async fn inbox(&self, recipient_id: &str) -> Vec<SecureMessage> {
        let mut inbox: Vec<SecureMessage> = self
            .messages
            .lock()
            .await
            .values()
            .filter(|m| m.recipient_id == recipient_id)
            .cloned()
            .collect();
        inbox.sort_by_key(|m| m.sent_at);
        inbox
    }

    pub async fn mark_read(&self, message_id: Uuid) -> Result<()> {
        let mut messages = self.messages.lock().await;
        let message = messages
            .get_mut(&message_id)
            .ok_or(ScheduleError::MessageNotFound(message_id))?;
        if message.delivered_at.is_none() {
            message.delivered_at = Some(Utc::now());
        }
        message.status = DeliveryStatus::Read;
        Ok(())
    }

    pub async fn unread_count(&self, recipient_id: &str) -> usize {
        self.messages
            .lock()
            .await
            .values()
            .filter(|m| m.recipient_id == recipient_id && m.status != DeliveryStatus::Read)
            .count()
    }
}

async fn deliver_after(
    messages: Arc<Mutex<HashMap<Uuid, SecureMessage>>>,
    events: broadcast::Sender<DeliveryEvent>,
    message_id: Uuid,
    delay: Duration,
) -> Result<DeliveryStatus> {
    tokio::time::sleep(delay).await;

    let mut messages = messages.lock().await;
    let message = messages
        .get_mut(&message_id)
        .ok_or(ScheduleError::MessageNotFound(message_id))?;

    // A message read before the timer fired stays read.
    if message.status == DeliveryStatus::Sent {
        message.status = DeliveryStatus::Delivered;
        message.delivered_at = Some(Utc::now());
    }
    let status = message.status;

    // No subscribers is fine.
    let _ = events.send(DeliveryEvent {
        message_id,
        recipient_id: message.recipient_id.clone(),
        status,
    });
    tracing::debug!("Message {} delivered", message_id);
    Ok(status)
}
