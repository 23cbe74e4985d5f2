use chrono::{DateTime, Duration, Utc};

use shared::error::{AppError, AppResult};

/// Configured duration bounds for a single reservation.
#[derive(Debug, Clone, Copy)]
pub struct DurationLimits {
    min: Duration,
    max: Duration,
}

impl DurationLimits {
    pub fn new(min_minutes: i64, max_hours: i64) -> Self {
        Self {
            min: Duration::minutes(min_minutes),
            max: Duration::hours(max_hours),
        }
    }

    pub fn min_minutes(&self) -> i64 {
        self.min.num_minutes()
    }

    pub fn max_hours(&self) -> i64 {
        self.max.num_hours()
    }
}

/// Checks internal validity and duration bounds of a proposed interval.
/// Must run before every create and before every update that changes
/// either timestamp.
pub fn validate_period(
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    limits: DurationLimits,
) -> AppResult<()> {
    if start_at >= end_at {
        return Err(AppError::InvalidTimeRange);
    }
    let duration = end_at - start_at;
    if duration < limits.min {
        return Err(AppError::ReservationTooShort(limits.min_minutes()));
    }
    if duration > limits.max {
        return Err(AppError::ReservationTooLong(limits.max_hours()));
    }
    Ok(())
}

/// Half-open interval overlap: `[s1, e1)` and `[s2, e2)` collide iff
/// `s1 < e2 && s2 < e1`. Touching endpoints do not count.
pub fn periods_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> DurationLimits {
        DurationLimits::new(30, 4)
    }

    #[test]
    fn accepts_durations_within_bounds() {
        let start = Utc::now();
        assert!(validate_period(start, start + Duration::minutes(30), limits()).is_ok());
        assert!(validate_period(start, start + Duration::hours(2), limits()).is_ok());
        assert!(validate_period(start, start + Duration::hours(4), limits()).is_ok());
    }

    #[test]
    fn rejects_inverted_and_empty_ranges() {
        let start = Utc::now();
        assert!(matches!(
            validate_period(start, start, limits()),
            Err(AppError::InvalidTimeRange)
        ));
        assert!(matches!(
            validate_period(start, start - Duration::hours(1), limits()),
            Err(AppError::InvalidTimeRange)
        ));
    }

    #[test]
    fn rejects_durations_outside_bounds() {
        let start = Utc::now();
        assert!(matches!(
            validate_period(start, start + Duration::minutes(29), limits()),
            Err(AppError::ReservationTooShort(30))
        ));
        assert!(matches!(
            validate_period(start, start + Duration::hours(4) + Duration::minutes(1), limits()),
            Err(AppError::ReservationTooLong(4))
        ));
    }

    #[test]
    fn overlap_is_half_open() {
        let t = Utc::now();
        let h = Duration::hours(1);
        // [t, t+2h) vs [t+1h, t+3h) collide
        assert!(periods_overlap(t, t + h * 2, t + h, t + h * 3));
        // containment collides
        assert!(periods_overlap(t, t + h * 3, t + h, t + h * 2));
        // touching endpoints do not
        assert!(!periods_overlap(t, t + h, t + h, t + h * 2));
        assert!(!periods_overlap(t + h, t + h * 2, t, t + h));
        // disjoint intervals do not
        assert!(!periods_overlap(t, t + h, t + h * 2, t + h * 3));
    }
}
