use chrono::{DateTime, Utc};
use derive_new::new;

use crate::model::{
    id::ReservationId,
    space::SpaceSnapshot,
    user::{User, UserSnapshot},
};

#[derive(new, Debug)]
pub struct CreateReservation {
    pub space: SpaceSnapshot,
    pub created_by: UserSnapshot,
    pub title: String,
    pub description: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

// None fields keep their current value.
#[derive(new, Debug)]
pub struct UpdateReservation {
    pub reservation_id: ReservationId,
    pub requested_by: User,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
}

#[derive(new, Debug)]
pub struct CancelReservation {
    pub reservation_id: ReservationId,
    pub requested_by: User,
}

#[derive(new, Debug)]
pub struct DecideReservation {
    pub reservation_id: ReservationId,
    pub decided_by: User,
    pub note: Option<String>,
}
