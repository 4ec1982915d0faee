use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::{Availability, SetAvailabilityRequest};

#[derive(Clone)]
pub struct AvailabilityService {
    db: Database,
}

impl AvailabilityService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Upsert the recurring window for a (professional, center) pair. The
    /// second write for the same pair replaces the first; there is never more
    /// than one row per pair.
    pub async fn set_availability(
        &self,
        professional_id: &str,
        request: &SetAvailabilityRequest,
    ) -> ApiResult<Availability> {
        request.validate().map_err(ApiError::BadRequest)?;

        let availability = Availability::new(professional_id.to_string(), request);
        let stored = self.db.upsert_availability(&availability).await?;

        tracing::info!(
            "Availability set: professional_id={}, center_id={}, {} slots",
            stored.professional_id,
            stored.center_id,
            stored.slots.len()
        );

        Ok(stored)
    }

    pub async fn get_availability(
        &self,
        professional_id: &str,
        center_id: &str,
    ) -> ApiResult<Option<Availability>> {
        self.db.get_availability(professional_id, center_id).await
    }

    /// Bookable slot starts for a date: the recurring window for that
    /// weekday minus slots already held by non-cancelled appointments.
    pub async fn get_bookable_slots(
        &self,
        professional_id: &str,
        center_id: &str,
        date: &str,
    ) -> ApiResult<Vec<String>> {
        let availability = match self.db.get_availability(professional_id, center_id).await? {
            Some(availability) => availability,
            None => return Ok(Vec::new()),
        };

        if !availability.covers_date(date) {
            return Ok(Vec::new());
        }

        let taken = self.db.list_taken_slots(professional_id, date).await?;

        Ok(availability
            .slots
            .into_iter()
            .filter(|slot| !taken.contains(slot))
            .collect())
    }
}
