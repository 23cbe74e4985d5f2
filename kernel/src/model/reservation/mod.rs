use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::model::{id::ReservationId, space::SpaceSnapshot, user::{User, UserSnapshot}};
use shared::error::{AppError, AppResult};

pub mod event;
pub mod period;
pub mod query;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl ReservationStatus {
    /// Active reservations are the only ones that participate in conflict
    /// checks; rejected and cancelled ones may overlap freely.
    pub fn is_active(self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Approved)
    }
}

#[derive(Debug, Clone)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub space: SpaceSnapshot,
    pub created_by: UserSnapshot,
    pub title: String,
    pub description: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: ReservationStatus,
    pub approved_by: Option<UserSnapshot>,
    pub decision_at: Option<DateTime<Utc>>,
    pub decision_note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// A reservation may be cancelled by its creator or by an admin, and
    /// only while it is still active. Rejected and cancelled reservations
    /// are terminal.
    pub fn ensure_cancellable_by(&self, actor: &User) -> AppResult<()> {
        if !actor.is_admin() && self.created_by.user_id != actor.user_id {
            return Err(AppError::ForbiddenOperation);
        }
        if !self.status.is_active() {
            return Err(AppError::InvalidTransition(format!(
                "cannot cancel a reservation in status {}",
                self.status
            )));
        }
        Ok(())
    }

    /// Approve and reject are admin-only and accept pending reservations
    /// exclusively. The role check runs first: a non-admin always gets the
    /// authorization failure, never a transition error.
    pub fn ensure_decidable_by(&self, actor: &User) -> AppResult<()> {
        if !actor.is_admin() {
            return Err(AppError::ForbiddenOperation);
        }
        if self.status != ReservationStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "only pending reservations can be decided, current status is {}",
                self.status
            )));
        }
        Ok(())
    }

    /// Field edits are admin-only and limited to active reservations.
    pub fn ensure_editable_by(&self, actor: &User) -> AppResult<()> {
        if !actor.is_admin() {
            return Err(AppError::ForbiddenOperation);
        }
        if !self.status.is_active() {
            return Err(AppError::InvalidTransition(format!(
                "cannot edit a reservation in status {}",
                self.status
            )));
        }
        Ok(())
    }
}
