use async_trait::async_trait;

use crate::model::{
    id::{ReservationId, SpaceId, UserId},
    reservation::{
        event::{CancelReservation, CreateReservation, DecideReservation, UpdateReservation},
        query::{BusyBlock, ListFilter, ListWindow, ReportFilter, ReservationReport},
        Reservation,
    },
    user::User,
};
use shared::error::AppResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Creates a pending reservation. The duration check, the conflict
    /// check and the insert run as one atomic unit per space.
    async fn create(&self, event: CreateReservation) -> AppResult<Reservation>;
    /// Admin-only field edit; revalidates duration and conflicts
    /// (excluding the edited row) when the interval changes.
    async fn update(&self, event: UpdateReservation) -> AppResult<Reservation>;
    /// Creator-or-admin cancellation; clears decision metadata.
    async fn cancel(&self, event: CancelReservation) -> AppResult<Reservation>;
    async fn approve(&self, event: DecideReservation) -> AppResult<Reservation>;
    async fn reject(&self, event: DecideReservation) -> AppResult<Reservation>;
    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Reservation>;
    /// Reservations overlapping the window. Non-admin actors only see
    /// active ones.
    async fn find_in_window(&self, actor: &User, filter: ListFilter) -> AppResult<Vec<Reservation>>;
    /// All reservations created by the user, any status; windowed only
    /// when a window is given.
    async fn find_created_by(
        &self,
        user_id: UserId,
        window: Option<ListWindow>,
    ) -> AppResult<Vec<Reservation>>;
    /// Occupied intervals of active reservations for a space, ordered by
    /// start time.
    async fn busy_blocks(&self, space_id: SpaceId, window: ListWindow) -> AppResult<Vec<BusyBlock>>;
    /// Per-space, per-status aggregation for the report collaborator.
    async fn report(&self, filter: ReportFilter) -> AppResult<ReservationReport>;
}
