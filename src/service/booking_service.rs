use std::sync::Arc;

use uuid::Uuid;

use crate::{
    domain::{Booking, BookingStatus, CreateBookingRequest},
    error::{AppError, Result},
    repository::BookingRepository,
};

pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
}

impl BookingService {
    pub fn new(repo: Arc<dyn BookingRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, request: CreateBookingRequest) -> Result<Booking> {
        if request.guest_email.trim().is_empty() {
            return Err(AppError::Validation("guest_email is required".to_string()));
        }
        if request.club.trim().is_empty() {
            return Err(AppError::Validation("club is required".to_string()));
        }
        if let Some(percentage) = request.deposit_percentage {
            if !(1..=100).contains(&percentage) {
                return Err(AppError::Validation(
                    "deposit_percentage must be between 1 and 100".to_string(),
                ));
            }
        }

        let booking = self.repo.create(request).await?;
        tracing::info!(
            "Booking {} created for {} at {} on {}",
            booking.booking_ref,
            booking.guest_email,
            booking.club,
            booking.date
        );
        Ok(booking)
    }

    pub async fn get(&self, id: Uuid) -> Result<Booking> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    pub async fn list_by_club(&self, club: &str, limit: i64, offset: i64) -> Result<Vec<Booking>> {
        self.repo.list_by_club(club, limit, offset).await
    }

    /// Delete a booking; its payment records go with it.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete(id).await?;
        tracing::info!("Booking {} deleted", id);
        Ok(())
    }

    /// Move a booking along the staff board; the board only moves forward.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        updated_by: &str,
    ) -> Result<Booking> {
        let current = self.get(id).await?;

        if !current.status.can_transition_to(&status) {
            return Err(AppError::InvalidTransition(format!(
                "Booking {} cannot move from {:?} to {:?}",
                current.booking_ref, current.status, status
            )));
        }

        self.repo.update_status(id, status, updated_by).await
    }
}
