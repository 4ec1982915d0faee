use serde_json::json;
use tokio::sync::broadcast;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::events::{EventBus, SystemEvent};
use crate::models::{
    Appointment, AppointmentFilters, AppointmentStatus, AuditAction, AuditEntry, AuditResource,
    CreateAppointmentRequest, UserRole,
};
use crate::services::audit_service;
use crate::services::state_machine::{validate_transition, TransitionError};
use crate::utils::now_rfc3339;

#[derive(Clone)]
pub struct AppointmentService {
    db: Database,
    event_bus: EventBus,
}

impl AppointmentService {
    pub fn new(db: Database, event_bus: EventBus) -> Self {
        Self { db, event_bus }
    }

    /// Book an appointment. Validation runs before any write; a booking that
    /// would double-book a non-cancelled (professional, date, slot) tuple is
    /// rejected with a conflict. The read-then-write guard leaves a small
    /// race window; see DESIGN.md.
    pub async fn create_appointment(
        &self,
        request: &CreateAppointmentRequest,
        actor_id: &str,
        actor_role: UserRole,
    ) -> ApiResult<Appointment> {
        request.validate().map_err(ApiError::BadRequest)?;

        let conflicts = self
            .db
            .count_slot_conflicts(&request.professional_id, request.date.trim(), request.slot_start.trim())
            .await?;
        if conflicts > 0 {
            return Err(ApiError::Conflict(
                "This slot is already booked".to_string(),
            ));
        }

        let appointment = Appointment::from_request(request);
        self.db.create_appointment(&appointment).await?;

        tracing::info!(
            "Appointment created: id={}, student_id={}, professional_id={}, date={} {}",
            appointment.id,
            appointment.student_id,
            appointment.professional_id,
            appointment.date,
            appointment.slot_start
        );

        audit_service::record(
            &self.db,
            AuditEntry::new(
                AuditAction::Create,
                AuditResource::Appointment,
                appointment.id.clone(),
                actor_id.to_string(),
                actor_role,
                json!({
                    "date": appointment.date,
                    "slot_start": appointment.slot_start,
                    "status": appointment.status.as_str(),
                }),
            ),
        )
        .await;

        self.event_bus.publish(SystemEvent::AppointmentCreated {
            appointment_id: appointment.id.clone(),
            student_id: appointment.student_id.clone(),
            professional_id: appointment.professional_id.clone(),
            timestamp: appointment.created_at.clone(),
        });

        Ok(appointment)
    }

    pub async fn get_appointment(&self, id: &str) -> ApiResult<Appointment> {
        self.db
            .get_appointment_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Appointment {} not found", id)))
    }

    /// Student view, date then slot ascending.
    pub async fn get_student_appointments(&self, student_id: &str) -> ApiResult<Vec<Appointment>> {
        self.db.list_student_appointments(student_id).await
    }

    /// Live variant of the student view.
    pub fn subscribe_student_appointments(&self, student_id: &str) -> AppointmentFeed {
        AppointmentFeed {
            db: self.db.clone(),
            student_id: student_id.to_string(),
            rx: self.event_bus.subscribe(),
        }
    }

    pub async fn get_professional_appointments(
        &self,
        professional_id: &str,
        filters: &AppointmentFilters,
    ) -> ApiResult<Vec<Appointment>> {
        self.db
            .list_professional_appointments(professional_id, filters)
            .await
    }

    /// Move an appointment through the status machine. Transition legality
    /// and role legality are both enforced here, not left to callers. Every
    /// change lands one audit entry carrying the before/after pair.
    pub async fn update_appointment_status(
        &self,
        id: &str,
        new_status: AppointmentStatus,
        actor_id: &str,
        actor_role: UserRole,
    ) -> ApiResult<Appointment> {
        let current = self.get_appointment(id).await?;

        self.check_transition(&current, new_status, actor_id, actor_role)?;

        if current.status == new_status {
            return Ok(current);
        }

        let now = now_rfc3339();
        self.db.set_appointment_status(id, new_status, &now).await?;

        tracing::info!(
            "Appointment {} status changed {} -> {}",
            id,
            current.status,
            new_status
        );

        audit_service::record(
            &self.db,
            AuditEntry::new(
                AuditAction::Update,
                AuditResource::Appointment,
                id.to_string(),
                actor_id.to_string(),
                actor_role,
                json!({
                    "previous_status": current.status.as_str(),
                    "new_status": new_status.as_str(),
                }),
            ),
        )
        .await;

        self.publish_status_change(&current, new_status, actor_id, &now);

        self.get_appointment(id).await
    }

    /// Cancellation specialization: also records who cancelled and why.
    pub async fn cancel_appointment(
        &self,
        id: &str,
        actor_id: &str,
        actor_role: UserRole,
        reason: Option<&str>,
    ) -> ApiResult<Appointment> {
        let current = self.get_appointment(id).await?;

        self.check_transition(&current, AppointmentStatus::Cancelled, actor_id, actor_role)?;

        let now = now_rfc3339();
        self.db
            .set_appointment_cancelled(id, actor_id, actor_role, reason, &now)
            .await?;

        tracing::info!("Appointment {} cancelled by {}", id, actor_id);

        audit_service::record(
            &self.db,
            AuditEntry::new(
                AuditAction::Cancel,
                AuditResource::Appointment,
                id.to_string(),
                actor_id.to_string(),
                actor_role,
                json!({
                    "previous_status": current.status.as_str(),
                    "reason": reason,
                }),
            ),
        )
        .await;

        self.publish_status_change(&current, AppointmentStatus::Cancelled, actor_id, &now);

        self.get_appointment(id).await
    }

    fn check_transition(
        &self,
        current: &Appointment,
        new_status: AppointmentStatus,
        actor_id: &str,
        actor_role: UserRole,
    ) -> ApiResult<()> {
        // Students act only on their own appointments.
        if actor_role == UserRole::Student && current.student_id != actor_id {
            return Err(ApiError::Forbidden(
                "Students may only act on their own appointments".to_string(),
            ));
        }

        validate_transition(current.status, new_status, actor_role).map_err(|e| match e {
            TransitionError::RoleNotAllowed { .. } => ApiError::Forbidden(e.to_string()),
            TransitionError::InvalidTransition { .. } => ApiError::BadRequest(e.to_string()),
        })
    }

    fn publish_status_change(
        &self,
        previous: &Appointment,
        new_status: AppointmentStatus,
        actor_id: &str,
        timestamp: &str,
    ) {
        self.event_bus.publish(SystemEvent::AppointmentStatusChanged {
            appointment_id: previous.id.clone(),
            student_id: previous.student_id.clone(),
            old_status: previous.status,
            new_status,
            actor_id: actor_id.to_string(),
            timestamp: timestamp.to_string(),
        });
    }
}

/// Push-based subscription over a student's appointment list; same snapshot
/// contract as the message feed.
pub struct AppointmentFeed {
    db: Database,
    student_id: String,
    rx: broadcast::Receiver<SystemEvent>,
}

impl AppointmentFeed {
    pub async fn initial(&self) -> ApiResult<Vec<Appointment>> {
        self.db.list_student_appointments(&self.student_id).await
    }

    pub fn into_stream(self) -> impl futures::Stream<Item = ApiResult<Vec<Appointment>>> {
        futures::stream::unfold(self, |mut feed| async move {
            let snapshot = feed.next().await;
            Some((snapshot, feed))
        })
    }

    pub async fn next(&mut self) -> ApiResult<Vec<Appointment>> {
        loop {
            match self.rx.recv().await {
                Ok(SystemEvent::AppointmentCreated { student_id, .. })
                | Ok(SystemEvent::AppointmentStatusChanged { student_id, .. })
                    if student_id == self.student_id =>
                {
                    return self.db.list_student_appointments(&self.student_id).await;
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "Appointment feed for student {} lagged by {} events; resnapshotting",
                        self.student_id,
                        skipped
                    );
                    return self.db.list_student_appointments(&self.student_id).await;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(ApiError::Internal("Event bus closed".to_string()));
                }
            }
        }
    }
}
