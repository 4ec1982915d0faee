use tokio::sync::broadcast;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::events::{EventBus, SystemEvent};
use crate::models::{Chat, Message, MessageStatus, UserRole};
use crate::utils::now_rfc3339;

#[derive(Clone)]
pub struct ChatService {
    db: Database,
    event_bus: EventBus,
}

impl ChatService {
    pub fn new(db: Database, event_bus: EventBus) -> Self {
        Self { db, event_bus }
    }

    /// All chats the caller participates in, most recently active first.
    pub async fn get_user_chats(&self, user_id: &str, role: UserRole) -> ApiResult<Vec<Chat>> {
        self.db.list_chats_for_user(user_id, role).await
    }

    /// Get-or-create the thread for a (student, professional) pair. The id is
    /// derived from the pair, so concurrent callers converge on one row and
    /// the operation is idempotent.
    pub async fn create_chat(&self, student_id: &str, professional_id: &str) -> ApiResult<Chat> {
        let student = self
            .db
            .get_user_by_id(student_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", student_id)))?;
        if student.role != UserRole::Student {
            return Err(ApiError::BadRequest(format!(
                "User {} is not a student",
                student_id
            )));
        }

        let professional = self
            .db
            .get_user_by_id(professional_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User {} not found", professional_id)))?;
        if professional.role != UserRole::Professional {
            return Err(ApiError::BadRequest(format!(
                "User {} is not a professional",
                professional_id
            )));
        }

        // Names are copied once at creation; later profile renames do not
        // propagate to existing threads.
        let chat = Chat::new(
            student.id,
            professional.id,
            student.display_name,
            professional.display_name,
        );

        let chat = self.db.create_chat_if_absent(&chat).await?;

        tracing::debug!("Chat ready: id={}", chat.id);

        Ok(chat)
    }

    pub async fn get_chat(&self, chat_id: &str) -> ApiResult<Chat> {
        self.db
            .get_chat_by_id(chat_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Chat {} not found", chat_id)))
    }

    /// Append a message. The insert, the chat preview/timestamp update and
    /// the counterpart's unread increment commit in one transaction.
    pub async fn send_message(
        &self,
        chat_id: &str,
        sender_id: &str,
        sender_role: UserRole,
        body: &str,
    ) -> ApiResult<Message> {
        Message::validate_body(body).map_err(ApiError::BadRequest)?;

        // Distinct not-found before any write
        let _chat = self.get_chat(chat_id).await?;

        let message = Message::new(
            chat_id.to_string(),
            sender_id.to_string(),
            sender_role,
            body.trim().to_string(),
        );

        self.db.append_message(&message).await?;

        tracing::info!(
            "Message appended: id={}, chat_id={}",
            message.id,
            message.chat_id
        );

        self.event_bus.publish(SystemEvent::MessageAppended {
            message_id: message.id.clone(),
            chat_id: message.chat_id.clone(),
            sender_id: message.sender_id.clone(),
            sender_role: message.sender_role,
            timestamp: message.created_at.clone(),
        });

        Ok(message)
    }

    /// One-shot full history, send order ascending.
    pub async fn get_chat_messages(&self, chat_id: &str) -> ApiResult<Vec<Message>> {
        let _chat = self.get_chat(chat_id).await?;
        self.db.list_messages(chat_id).await
    }

    /// Live variant: returns a feed that re-delivers the full ordered list
    /// whenever the chat's messages change. Dropping the feed unsubscribes.
    pub async fn subscribe_chat_messages(&self, chat_id: &str) -> ApiResult<MessageFeed> {
        let _chat = self.get_chat(chat_id).await?;
        Ok(MessageFeed {
            db: self.db.clone(),
            chat_id: chat_id.to_string(),
            rx: self.event_bus.subscribe(),
        })
    }

    /// Reset the reader's unread counter to zero. Idempotent; message status
    /// flags are untouched.
    pub async fn mark_chat_as_read(&self, chat_id: &str, reader_role: UserRole) -> ApiResult<()> {
        self.db.reset_unread(chat_id, reader_role).await?;

        self.event_bus.publish(SystemEvent::ChatRead {
            chat_id: chat_id.to_string(),
            reader_role,
            timestamp: now_rfc3339(),
        });

        Ok(())
    }

    /// Advisory delivery-flag walk: sent -> delivered -> read, never back.
    pub async fn update_message_status(
        &self,
        message_id: &str,
        status: MessageStatus,
    ) -> ApiResult<()> {
        let message = self
            .db
            .get_message_by_id(message_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Message {} not found", message_id)))?;

        if message.status == status {
            return Ok(());
        }
        if !message.status.can_become(status) {
            return Err(ApiError::BadRequest(format!(
                "Message status cannot move from {} to {}",
                message.status, status
            )));
        }

        self.db.update_message_status(message_id, status).await?;

        self.event_bus.publish(SystemEvent::MessageStatusUpdated {
            message_id: message_id.to_string(),
            chat_id: message.chat_id,
            status,
            timestamp: now_rfc3339(),
        });

        Ok(())
    }
}

/// Push-based subscription over one chat's message list. Each `next()`
/// resolves when the underlying collection changes and yields a fresh
/// full-history snapshot, so a lagged receiver loses nothing: the snapshot
/// query covers whatever events were missed.
pub struct MessageFeed {
    db: Database,
    chat_id: String,
    rx: broadcast::Receiver<SystemEvent>,
}

impl MessageFeed {
    /// Current snapshot without waiting for a change.
    pub async fn initial(&self) -> ApiResult<Vec<Message>> {
        self.db.list_messages(&self.chat_id).await
    }

    /// Adapt the feed into a `Stream` of snapshots for callers that prefer
    /// combinator-style consumption.
    pub fn into_stream(self) -> impl futures::Stream<Item = ApiResult<Vec<Message>>> {
        futures::stream::unfold(self, |mut feed| async move {
            let snapshot = feed.next().await;
            Some((snapshot, feed))
        })
    }

    /// Wait for the next change to this chat and return the new snapshot.
    pub async fn next(&mut self) -> ApiResult<Vec<Message>> {
        loop {
            match self.rx.recv().await {
                Ok(SystemEvent::MessageAppended { chat_id, .. })
                | Ok(SystemEvent::MessageStatusUpdated { chat_id, .. })
                    if chat_id == self.chat_id =>
                {
                    return self.db.list_messages(&self.chat_id).await;
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "Message feed for chat {} lagged by {} events; resnapshotting",
                        self.chat_id,
                        skipped
                    );
                    return self.db.list_messages(&self.chat_id).await;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(ApiError::Internal("Event bus closed".to_string()));
                }
            }
        }
    }
}
