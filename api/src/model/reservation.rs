use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    id::{ReservationId, SpaceId, UserId},
    reservation::{
        query::{BusyBlock, ReservationReport, SpaceReportEntry},
        Reservation, ReservationStatus,
    },
    space::SpaceSnapshot,
    user::UserSnapshot,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(skip)]
    #[serde(default)]
    pub description: Option<String>,
    #[garde(skip)]
    pub start_at: DateTime<Utc>,
    #[garde(skip)]
    pub end_at: DateTime<Utc>,
    #[garde(skip)]
    #[serde(default)]
    pub space_id: Option<SpaceId>,
}

// Absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
    #[garde(inner(length(min = 1)))]
    #[serde(default)]
    pub title: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub description: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[garde(skip)]
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReservationsQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(alias = "space", alias = "space_id")]
    pub space_id: Option<SpaceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MineQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusyQuery {
    #[serde(alias = "space_id")]
    pub space_id: SpaceId,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(alias = "space", alias = "space_id")]
    pub space_id: Option<SpaceId>,
    pub status: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationsResponse {
    pub items: Vec<ReservationResponse>,
}

impl From<Vec<Reservation>> for ReservationsResponse {
    fn from(value: Vec<Reservation>) -> Self {
        Self {
            items: value.into_iter().map(ReservationResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub reservation_id: ReservationId,
    pub space: ReservationSpaceResponse,
    pub created_by: ReservationUserResponse,
    pub title: String,
    pub description: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: ReservationStatus,
    pub approved_by: Option<ReservationUserResponse>,
    pub decision_at: Option<DateTime<Utc>>,
    pub decision_note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(value: Reservation) -> Self {
        let Reservation {
            reservation_id,
            space,
            created_by,
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
        } = value;
        Self {
            reservation_id,
            space: space.into(),
            created_by: created_by.into(),
            title,
            description,
            start_at,
            end_at,
            status,
            approved_by: approved_by.map(ReservationUserResponse::from),
            decision_at,
            decision_note,
            created_at,
            updated_at,
        }
    }
}

/// Reduced shape served to non-admin listings: no description, no creator
/// or approver identity.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicReservationsResponse {
    pub items: Vec<PublicReservationResponse>,
}

impl From<Vec<Reservation>> for PublicReservationsResponse {
    fn from(value: Vec<Reservation>) -> Self {
        Self {
            items: value
                .into_iter()
                .map(PublicReservationResponse::from)
                .collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicReservationResponse {
    pub reservation_id: ReservationId,
    pub space: ReservationSpaceResponse,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: ReservationStatus,
    pub label: String,
}

impl From<Reservation> for PublicReservationResponse {
    fn from(value: Reservation) -> Self {
        let Reservation {
            reservation_id,
            space,
            start_at,
            end_at,
            status,
            ..
        } = value;
        Self {
            reservation_id,
            space: space.into(),
            start_at,
            end_at,
            status,
            label: "Ocupado".to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSpaceResponse {
    pub space_id: SpaceId,
    pub name: String,
    pub location: String,
    pub description: String,
}

impl From<SpaceSnapshot> for ReservationSpaceResponse {
    fn from(value: SpaceSnapshot) -> Self {
        let SpaceSnapshot {
            space_id,
            name,
            location,
            description,
        } = value;
        Self {
            space_id,
            name,
            location,
            description,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationUserResponse {
    pub user_id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<UserSnapshot> for ReservationUserResponse {
    fn from(value: UserSnapshot) -> Self {
        let UserSnapshot {
            user_id,
            email,
            first_name,
            last_name,
        } = value;
        Self {
            user_id,
            email,
            first_name,
            last_name,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusyBlocksResponse {
    pub items: Vec<BusyBlockResponse>,
}

impl From<Vec<BusyBlock>> for BusyBlocksResponse {
    fn from(value: Vec<BusyBlock>) -> Self {
        Self {
            items: value.into_iter().map(BusyBlockResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusyBlockResponse {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl From<BusyBlock> for BusyBlockResponse {
    fn from(value: BusyBlock) -> Self {
        let BusyBlock { start_at, end_at } = value;
        Self { start_at, end_at }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub total: i64,
    pub spaces: Vec<SpaceReportResponse>,
}

impl From<ReservationReport> for ReportResponse {
    fn from(value: ReservationReport) -> Self {
        let ReservationReport { total, spaces } = value;
        Self {
            total,
            spaces: spaces.into_iter().map(SpaceReportResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceReportResponse {
    pub space_id: SpaceId,
    pub space_name: String,
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub cancelled: i64,
}

impl From<SpaceReportEntry> for SpaceReportResponse {
    fn from(value: SpaceReportEntry) -> Self {
        let SpaceReportEntry {
            space_id,
            space_name,
            total,
            pending,
            approved,
            rejected,
            cancelled,
        } = value;
        Self {
            space_id,
            space_name,
            total,
            pending,
            approved,
            rejected,
            cancelled,
        }
    }
}
