use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    domain::{CreateWaitlistRequest, UpdateWaitlistRequest, WaitlistEntry},
    error::{AppError, Result},
    repository::WaitlistRepository,
};

pub struct WaitlistService {
    repo: Arc<dyn WaitlistRepository>,
}

impl WaitlistService {
    pub fn new(repo: Arc<dyn WaitlistRepository>) -> Self {
        Self { repo }
    }

    /// Add a guest to the waitlist. The repository enforces the one-active-
    /// entry-per-triple invariant atomically.
    pub async fn add(&self, request: CreateWaitlistRequest) -> Result<WaitlistEntry> {
        if !request.opt_in_confirmed {
            return Err(AppError::Validation(
                "Guest has not confirmed the waitlist opt-in".to_string(),
            ));
        }
        if request.guest_email.trim().is_empty() {
            return Err(AppError::Validation("guest_email is required".to_string()));
        }
        if request.club.trim().is_empty() {
            return Err(AppError::Validation("club is required".to_string()));
        }

        let entry = self.repo.create(request).await?;
        tracing::info!(
            "Waitlist entry {} created for {} at {} on {}",
            entry.waitlist_id,
            entry.guest_email,
            entry.club,
            entry.requested_date
        );
        Ok(entry)
    }

    /// Active entries for a guest at a club; read-only.
    pub async fn check(
        &self,
        email: &str,
        club: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<WaitlistEntry>> {
        self.repo.find_active(email, club, date).await
    }

    pub async fn update(
        &self,
        waitlist_id: &str,
        update: UpdateWaitlistRequest,
    ) -> Result<WaitlistEntry> {
        let current = self.repo.find_by_waitlist_id(waitlist_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Waitlist entry {} not found", waitlist_id))
        })?;

        if let Some(next) = &update.status {
            if !current.status.can_transition_to(next) {
                return Err(AppError::InvalidTransition(format!(
                    "Waitlist entry {} cannot move from {:?} to {:?}",
                    waitlist_id, current.status, next
                )));
            }
        }

        self.repo.update(waitlist_id, update).await
    }

    /// Strict removal: deleting an unknown id is NotFound, so repeated
    /// removals report the second call as an error rather than a no-op.
    pub async fn remove(&self, waitlist_id: &str) -> Result<()> {
        self.repo.delete(waitlist_id).await?;
        tracing::info!("Waitlist entry {} removed", waitlist_id);
        Ok(())
    }

    /// Waiting entries that could take a freed (date, club) slot, highest
    /// priority first, earlier requests winning ties.
    pub async fn matches(&self, date: NaiveDate, club: &str) -> Result<Vec<WaitlistEntry>> {
        self.repo.find_matches(date, club).await
    }
}
