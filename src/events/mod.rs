use tokio::sync::broadcast;

use crate::models::appointment::AppointmentStatus;
use crate::models::message::MessageStatus;
use crate::models::user::UserRole;

/// Domain events pushed whenever the store changes. Live feeds subscribe to
/// these to re-deliver fresh snapshots to the UI layer.
#[derive(Debug, Clone)]
pub enum SystemEvent {
    MessageAppended {
        message_id: String,
        chat_id: String,
        sender_id: String,
        sender_role: UserRole,
        timestamp: String, // ISO 8601
    },
    MessageStatusUpdated {
        message_id: String,
        chat_id: String,
        status: MessageStatus,
        timestamp: String, // ISO 8601
    },
    ChatRead {
        chat_id: String,
        reader_role: UserRole,
        timestamp: String, // ISO 8601
    },
    AppointmentCreated {
        appointment_id: String,
        student_id: String,
        professional_id: String,
        timestamp: String, // ISO 8601
    },
    AppointmentStatusChanged {
        appointment_id: String,
        student_id: String,
        old_status: AppointmentStatus,
        new_status: AppointmentStatus,
        actor_id: String,
        timestamp: String, // ISO 8601
    },
}

/// Event bus for publishing and subscribing to system events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SystemEvent>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all subscribers (non-blocking, fire-and-forget)
    pub fn publish(&self, event: SystemEvent) {
        // Fire-and-forget - with no subscribers the send fails, which is fine
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("Event dropped (no subscribers): {}", e);
        }
    }

    /// Subscribe to events (returns a receiver)
    pub fn subscribe(&self) -> broadcast::Receiver<SystemEvent> {
        self.tx.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus_creation() {
        let bus = EventBus::new(100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_event_publish_subscribe() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        bus.publish(SystemEvent::ChatRead {
            chat_id: "chat-1".to_string(),
            reader_role: UserRole::Professional,
            timestamp: "2026-01-12T10:00:00Z".to_string(),
        });

        let received = rx.recv().await.unwrap();
        match received {
            SystemEvent::ChatRead { chat_id, .. } => {
                assert_eq!(chat_id, "chat-1");
            }
            _ => panic!("Unexpected event type"),
        }
    }

    #[tokio::test]
    async fn test_status_change_event_carries_transition() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(SystemEvent::AppointmentStatusChanged {
            appointment_id: "apt-1".to_string(),
            student_id: "s1".to_string(),
            old_status: AppointmentStatus::Pending,
            new_status: AppointmentStatus::Confirmed,
            actor_id: "p1".to_string(),
            timestamp: "2026-01-12T10:00:00Z".to_string(),
        });

        match rx.recv().await.unwrap() {
            SystemEvent::AppointmentStatusChanged {
                old_status,
                new_status,
                ..
            } => {
                assert_eq!(old_status, AppointmentStatus::Pending);
                assert_eq!(new_status, AppointmentStatus::Confirmed);
            }
            _ => panic!("Unexpected event type"),
        }
    }
}
