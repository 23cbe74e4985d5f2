use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use garde::Validate;
use kernel::model::{
    id::ReservationId,
    reservation::{
        event::{CancelReservation, CreateReservation, DecideReservation, UpdateReservation},
        query::{ListFilter, ListWindow, ReportFilter},
        ReservationStatus,
    },
    user::UserSnapshot,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::reservation::{
        BusyBlocksResponse, BusyQuery, CreateReservationRequest, DecisionRequest,
        ListReservationsQuery, MineQuery, PublicReservationsResponse, ReportQuery, ReportResponse,
        ReservationResponse, ReservationsResponse, UpdateReservationRequest,
    },
};

pub async fn create_reservation(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateReservationRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate(&())?;

    // The remote round-trip (if any) happens here, before any local
    // transaction is opened.
    let space = registry
        .space_resolver()
        .resolve(req.space_id, &user.access_token)
        .await?;

    let event = CreateReservation::new(
        space,
        UserSnapshot::from(&user.user),
        req.title,
        req.description.unwrap_or_default(),
        req.start_at,
        req.end_at,
    );
    let reservation = registry.reservation_repository().create(event).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationResponse::from(reservation)),
    ))
}

pub async fn show_reservation_list(
    user: AuthorizedUser,
    Query(query): Query<ListReservationsQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Response> {
    let window = ListWindow::for_list(Utc::now(), query.start, query.end)?;
    let reservations = registry
        .reservation_repository()
        .find_in_window(&user.user, ListFilter::new(window, query.space_id))
        .await?;

    // Admins get the full representation; everyone else the reduced one.
    if user.is_admin() {
        Ok(Json(ReservationsResponse::from(reservations)).into_response())
    } else {
        Ok(Json(PublicReservationsResponse::from(reservations)).into_response())
    }
}

pub async fn show_reservation(
    _user: AuthorizedUser,
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationResponse>> {
    registry
        .reservation_repository()
        .find_by_id(reservation_id)
        .await
        .map(ReservationResponse::from)
        .map(Json)
}

pub async fn show_my_reservations(
    user: AuthorizedUser,
    Query(query): Query<MineQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationsResponse>> {
    let window = ListWindow::for_mine(Utc::now(), query.start, query.end);
    registry
        .reservation_repository()
        .find_created_by(user.id(), window)
        .await
        .map(ReservationsResponse::from)
        .map(Json)
}

pub async fn update_reservation(
    user: AuthorizedUser,
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateReservationRequest>,
) -> AppResult<Json<ReservationResponse>> {
    req.validate(&())?;

    let event = UpdateReservation::new(
        reservation_id,
        user.user,
        req.title,
        req.description,
        req.start_at,
        req.end_at,
    );
    registry
        .reservation_repository()
        .update(event)
        .await
        .map(ReservationResponse::from)
        .map(Json)
}

pub async fn cancel_reservation(
    user: AuthorizedUser,
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationResponse>> {
    let event = CancelReservation::new(reservation_id, user.user);
    registry
        .reservation_repository()
        .cancel(event)
        .await
        .map(ReservationResponse::from)
        .map(Json)
}

pub async fn approve_reservation(
    user: AuthorizedUser,
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
    body: Option<Json<DecisionRequest>>,
) -> AppResult<Json<ReservationResponse>> {
    let note = body.and_then(|Json(req)| req.note);
    let event = DecideReservation::new(reservation_id, user.user, note);
    registry
        .reservation_repository()
        .approve(event)
        .await
        .map(ReservationResponse::from)
        .map(Json)
}

pub async fn reject_reservation(
    user: AuthorizedUser,
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
    body: Option<Json<DecisionRequest>>,
) -> AppResult<Json<ReservationResponse>> {
    let note = body.and_then(|Json(req)| req.note);
    let event = DecideReservation::new(reservation_id, user.user, note);
    registry
        .reservation_repository()
        .reject(event)
        .await
        .map(ReservationResponse::from)
        .map(Json)
}

pub async fn show_busy_blocks(
    _user: AuthorizedUser,
    Query(query): Query<BusyQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BusyBlocksResponse>> {
    let window = ListWindow::for_list(Utc::now(), query.start, query.end)?;
    registry
        .reservation_repository()
        .busy_blocks(query.space_id, window)
        .await
        .map(BusyBlocksResponse::from)
        .map(Json)
}

pub async fn show_reservations_report(
    user: AuthorizedUser,
    Query(query): Query<ReportQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReportResponse>> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }
    if let (Some(start), Some(end)) = (query.start, query.end) {
        if start >= end {
            return Err(AppError::InvalidTimeRange);
        }
    }

    let statuses = parse_status_filter(query.status.as_deref());
    let filter = ReportFilter::new(query.start, query.end, query.space_id, statuses);
    registry
        .reservation_repository()
        .report(filter)
        .await
        .map(ReportResponse::from)
        .map(Json)
}

// Comma-separated list; unknown names and "all" mean no status filter.
fn parse_status_filter(raw: Option<&str>) -> Option<Vec<ReservationStatus>> {
    let raw = raw?;
    if raw.eq_ignore_ascii_case("all") {
        return None;
    }
    let statuses: Vec<ReservationStatus> = raw
        .split(',')
        .filter_map(|part| ReservationStatus::from_str(part.trim()).ok())
        .collect();
    if statuses.is_empty() {
        None
    } else {
        Some(statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_parsing() {
        assert_eq!(parse_status_filter(None), None);
        assert_eq!(parse_status_filter(Some("all")), None);
        assert_eq!(parse_status_filter(Some("bogus")), None);
        assert_eq!(
            parse_status_filter(Some("PENDING,approved")),
            Some(vec![
                ReservationStatus::Pending,
                ReservationStatus::Approved
            ])
        );
        assert_eq!(
            parse_status_filter(Some(" rejected , nope ")),
            Some(vec![ReservationStatus::Rejected])
        );
    }
}
