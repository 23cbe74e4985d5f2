use chrono::{DateTime, Duration, Utc};
use derive_new::new;

use crate::model::{id::SpaceId, reservation::ReservationStatus};
use shared::error::{AppError, AppResult};

/// A resolved `[start, end)` window for read queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ListWindow {
    /// Window for the general listing. Missing bounds default to
    /// now → now + 30 days.
    pub fn for_list(
        now: DateTime<Utc>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AppResult<Self> {
        let start = start.unwrap_or(now);
        let end = end.unwrap_or(now + Duration::days(30));
        if start >= end {
            return Err(AppError::InvalidTimeRange);
        }
        Ok(Self { start, end })
    }

    /// Window for "my reservations". No filter at all when neither bound is
    /// given; a single bound widens the other to a year away from now. The
    /// asymmetry with the listing default is intentional.
    pub fn for_mine(
        now: DateTime<Utc>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        if start.is_none() && end.is_none() {
            return None;
        }
        Some(Self {
            start: start.unwrap_or(now - Duration::days(365)),
            end: end.unwrap_or(now + Duration::days(365)),
        })
    }
}

#[derive(new, Debug)]
pub struct ListFilter {
    pub window: ListWindow,
    pub space_id: Option<SpaceId>,
}

/// Filter for report extraction. Unlike the listing window, the report
/// bounds are optional and inclusive on both sides.
#[derive(new, Debug, Default)]
pub struct ReportFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub space_id: Option<SpaceId>,
    pub statuses: Option<Vec<ReservationStatus>>,
}

/// Occupied interval of a space, as consumed by the availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyBlock {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Per-space grouping with per-status counts; rendering is left to the
/// report collaborator.
#[derive(Debug, PartialEq, Eq)]
pub struct ReservationReport {
    pub total: i64,
    pub spaces: Vec<SpaceReportEntry>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct SpaceReportEntry {
    pub space_id: SpaceId,
    pub space_name: String,
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub cancelled: i64,
}

impl SpaceReportEntry {
    pub fn empty(space_id: SpaceId, space_name: String) -> Self {
        Self {
            space_id,
            space_name,
            total: 0,
            pending: 0,
            approved: 0,
            rejected: 0,
            cancelled: 0,
        }
    }

    pub fn add(&mut self, status: ReservationStatus, count: i64) {
        match status {
            ReservationStatus::Pending => self.pending += count,
            ReservationStatus::Approved => self.approved += count,
            ReservationStatus::Rejected => self.rejected += count,
            ReservationStatus::Cancelled => self.cancelled += count,
        }
        self.total += count;
    }
}
