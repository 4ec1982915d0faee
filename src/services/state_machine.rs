use thiserror::Error;

use crate::models::appointment::AppointmentStatus;
use crate::models::user::UserRole;

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    #[error("Role {role:?} may not transition an appointment to {to:?}")]
    RoleNotAllowed {
        role: UserRole,
        to: AppointmentStatus,
    },
}

/// Validates whether `role` may move an appointment from `from` to `to`.
///
/// The machine:
/// - pending -> confirmed | cancelled
/// - confirmed -> completed | cancelled
/// - any -> pending (manual reactivation, an intentional escape hatch)
///
/// Confirm, complete and reactivate are professional-only. A professional may
/// cancel from any status; a student may cancel only from pending (ownership
/// of the appointment is the caller's check, not this one's).
pub fn validate_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
    role: UserRole,
) -> Result<(), TransitionError> {
    use AppointmentStatus::*;

    // Same state is a no-op
    if from == to {
        return Ok(());
    }

    match to {
        Pending => {
            // Reactivation from anywhere, professionals only
            if role != UserRole::Professional {
                return Err(TransitionError::RoleNotAllowed { role, to });
            }
            Ok(())
        }
        Confirmed => {
            if role != UserRole::Professional {
                return Err(TransitionError::RoleNotAllowed { role, to });
            }
            match from {
                Pending => Ok(()),
                _ => Err(TransitionError::InvalidTransition { from, to }),
            }
        }
        Completed => {
            if role != UserRole::Professional {
                return Err(TransitionError::RoleNotAllowed { role, to });
            }
            match from {
                Confirmed => Ok(()),
                _ => Err(TransitionError::InvalidTransition { from, to }),
            }
        }
        Cancelled => match role {
            UserRole::Professional => Ok(()),
            UserRole::Student => match from {
                Pending => Ok(()),
                _ => Err(TransitionError::InvalidTransition { from, to }),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;
    use UserRole::*;

    #[test]
    fn test_professional_confirms_pending() {
        assert!(validate_transition(Pending, Confirmed, Professional).is_ok());
    }

    #[test]
    fn test_student_cannot_confirm() {
        let result = validate_transition(Pending, Confirmed, Student);
        assert!(matches!(
            result.unwrap_err(),
            TransitionError::RoleNotAllowed { .. }
        ));
    }

    #[test]
    fn test_professional_completes_confirmed_only() {
        assert!(validate_transition(Confirmed, Completed, Professional).is_ok());
        assert!(matches!(
            validate_transition(Pending, Completed, Professional).unwrap_err(),
            TransitionError::InvalidTransition { .. }
        ));
    }

    #[test]
    fn test_student_cancels_pending_only() {
        assert!(validate_transition(Pending, Cancelled, Student).is_ok());
        assert!(validate_transition(Confirmed, Cancelled, Student).is_err());
        assert!(validate_transition(Completed, Cancelled, Student).is_err());
    }

    #[test]
    fn test_professional_cancels_from_any_state() {
        for from in [Pending, Confirmed, Completed] {
            assert!(validate_transition(from, Cancelled, Professional).is_ok());
        }
    }

    #[test]
    fn test_reactivate_professional_only() {
        for from in [Confirmed, Cancelled, Completed] {
            assert!(validate_transition(from, Pending, Professional).is_ok());
            assert!(validate_transition(from, Pending, Student).is_err());
        }
    }

    #[test]
    fn test_same_state_is_noop() {
        assert!(validate_transition(Pending, Pending, Student).is_ok());
        assert!(validate_transition(Completed, Completed, Professional).is_ok());
    }

    #[test]
    fn test_cancelled_cannot_be_confirmed() {
        assert!(validate_transition(Cancelled, Confirmed, Professional).is_err());
        assert!(validate_transition(Cancelled, Completed, Professional).is_err());
    }
}
