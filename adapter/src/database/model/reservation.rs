use std::str::FromStr;

use chrono::{DateTime, Utc};
use kernel::model::{
    id::{ReservationId, SpaceId, UserId},
    reservation::{query::BusyBlock, Reservation, ReservationStatus},
    space::SpaceSnapshot,
    user::UserSnapshot,
};
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct ReservationRow {
    pub reservation_id: ReservationId,
    pub space_id: SpaceId,
    pub space_name: String,
    pub space_location: String,
    pub space_description: String,
    pub created_by_id: UserId,
    pub created_by_email: String,
    pub created_by_first_name: String,
    pub created_by_last_name: String,
    pub title: String,
    pub description: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: String,
    pub approved_by_id: Option<UserId>,
    pub approved_by_email: Option<String>,
    pub approved_by_first_name: Option<String>,
    pub approved_by_last_name: Option<String>,
    pub decision_at: Option<DateTime<Utc>>,
    pub decision_note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = AppError;

    fn try_from(value: ReservationRow) -> Result<Self, Self::Error> {
        let ReservationRow {
            reservation_id,
            space_id,
            space_name,
            space_location,
            space_description,
            created_by_id,
            created_by_email,
            created_by_first_name,
            created_by_last_name,
            title,
            description,
            start_at,
            end_at,
            status,
            approved_by_id,
            approved_by_email,
            approved_by_first_name,
            approved_by_last_name,
            decision_at,
            decision_note,
            created_at,
            updated_at,
        } = value;
        let status = ReservationStatus::from_str(&status)?;
        // The approver snapshot is present exactly when the id column is.
        let approved_by = approved_by_id.map(|user_id| UserSnapshot {
            user_id,
            email: approved_by_email.unwrap_or_default(),
            first_name: approved_by_first_name.unwrap_or_default(),
            last_name: approved_by_last_name.unwrap_or_default(),
        });
        Ok(Reservation {
            reservation_id,
            space: SpaceSnapshot {
                space_id,
                name: space_name,
                location: space_location,
                description: space_description,
            },
            created_by: UserSnapshot {
                user_id: created_by_id,
                email: created_by_email,
                first_name: created_by_first_name,
                last_name: created_by_last_name,
            },
            title,
            description,
            start_at,
            end_at,
            status,
            approved_by,
            decision_at,
            decision_note,
            created_at,
            updated_at,
        })
    }
}

// Slim row used while holding locks: just enough to decide a conflict.
#[derive(sqlx::FromRow)]
pub struct ActivePeriodRow {
    pub reservation_id: ReservationId,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
pub struct BusyBlockRow {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl From<BusyBlockRow> for BusyBlock {
    fn from(value: BusyBlockRow) -> Self {
        let BusyBlockRow { start_at, end_at } = value;
        BusyBlock { start_at, end_at }
    }
}

#[derive(sqlx::FromRow)]
pub struct ReportCountRow {
    pub space_id: SpaceId,
    pub space_name: String,
    pub status: String,
    pub count: i64,
}
