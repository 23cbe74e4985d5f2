use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_new::new;
use kernel::model::{
    id::{ReservationId, SpaceId, UserId},
    reservation::{
        event::{CancelReservation, CreateReservation, DecideReservation, UpdateReservation},
        period::{periods_overlap, validate_period, DurationLimits},
        query::{BusyBlock, ListFilter, ListWindow, ReportFilter, ReservationReport, SpaceReportEntry},
        Reservation, ReservationStatus,
    },
    user::User,
};
use kernel::repository::reservation::ReservationRepository;
use shared::error::{AppError, AppResult};

use crate::database::{
    model::reservation::{ActivePeriodRow, BusyBlockRow, ReportCountRow, ReservationRow},
    ConnectionPool,
};

const RESERVATION_COLUMNS: &str = r#"
    reservation_id,
    space_id, space_name, space_location, space_description,
    created_by_id, created_by_email, created_by_first_name, created_by_last_name,
    title, description, start_at, end_at, status,
    approved_by_id, approved_by_email, approved_by_first_name, approved_by_last_name,
    decision_at, decision_note, created_at, updated_at
"#;

// Serialization failures and exclusion violations are races on the same
// space; the caller sees them as the conflict it can retry.
fn is_conflict_code(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db)
            if matches!(db.code().as_deref(), Some("40001") | Some("23P01"))
    )
}

fn map_query_error(e: sqlx::Error) -> AppError {
    if is_conflict_code(&e) {
        AppError::OverlapConflict
    } else {
        AppError::SpecificOperationError(e)
    }
}

fn map_commit_error(e: sqlx::Error) -> AppError {
    if is_conflict_code(&e) {
        AppError::OverlapConflict
    } else {
        AppError::TransactionError(e)
    }
}

#[derive(new)]
pub struct ReservationRepositoryImpl {
    db: ConnectionPool,
    limits: DurationLimits,
}

#[async_trait]
impl ReservationRepository for ReservationRepositoryImpl {
    async fn create(&self, event: CreateReservation) -> AppResult<Reservation> {
        validate_period(event.start_at, event.end_at, self.limits)?;

        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;
        self.lock_and_check_overlap(&mut tx, event.space.space_id, event.start_at, event.end_at, None)
            .await?;

        let row: ReservationRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO reservations
            (space_id, space_name, space_location, space_description,
             created_by_id, created_by_email, created_by_first_name, created_by_last_name,
             title, description, start_at, end_at, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'PENDING')
            RETURNING {RESERVATION_COLUMNS}
            "#
        ))
        .bind(event.space.space_id)
        .bind(&event.space.name)
        .bind(&event.space.location)
        .bind(&event.space.description)
        .bind(event.created_by.user_id)
        .bind(&event.created_by.email)
        .bind(&event.created_by.first_name)
        .bind(&event.created_by.last_name)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_at)
        .bind(event.end_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_query_error)?;

        tx.commit().await.map_err(map_commit_error)?;

        row.try_into()
    }

    async fn update(&self, event: UpdateReservation) -> AppResult<Reservation> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let current: Reservation = self
            .find_for_update(&mut tx, event.reservation_id)
            .await?
            .try_into()?;
        current.ensure_editable_by(&event.requested_by)?;

        let start_at = event.start_at.unwrap_or(current.start_at);
        let end_at = event.end_at.unwrap_or(current.end_at);
        let period_changed = start_at != current.start_at || end_at != current.end_at;
        if period_changed {
            validate_period(start_at, end_at, self.limits)?;
            self.lock_and_check_overlap(
                &mut tx,
                current.space.space_id,
                start_at,
                end_at,
                Some(current.reservation_id),
            )
            .await?;
        }

        let title = event.title.unwrap_or(current.title);
        let description = event.description.unwrap_or(current.description);

        let row: ReservationRow = sqlx::query_as(&format!(
            r#"
            UPDATE reservations
            SET title = $2,
                description = $3,
                start_at = $4,
                end_at = $5,
                updated_at = now()
            WHERE reservation_id = $1
            RETURNING {RESERVATION_COLUMNS}
            "#
        ))
        .bind(event.reservation_id)
        .bind(&title)
        .bind(&description)
        .bind(start_at)
        .bind(end_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_query_error)?;

        tx.commit().await.map_err(map_commit_error)?;

        row.try_into()
    }

    async fn cancel(&self, event: CancelReservation) -> AppResult<Reservation> {
        let mut tx = self.db.begin().await?;

        let current: Reservation = self
            .find_for_update(&mut tx, event.reservation_id)
            .await?
            .try_into()?;
        current.ensure_cancellable_by(&event.requested_by)?;

        // Cancellation clears the decision snapshot and keeps only the
        // instant at which it happened.
        let row: ReservationRow = sqlx::query_as(&format!(
            r#"
            UPDATE reservations
            SET status = 'CANCELLED',
                approved_by_id = NULL,
                approved_by_email = NULL,
                approved_by_first_name = NULL,
                approved_by_last_name = NULL,
                decision_at = now(),
                decision_note = '',
                updated_at = now()
            WHERE reservation_id = $1
            RETURNING {RESERVATION_COLUMNS}
            "#
        ))
        .bind(event.reservation_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_query_error)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        row.try_into()
    }

    async fn approve(&self, event: DecideReservation) -> AppResult<Reservation> {
        self.decide(event, ReservationStatus::Approved).await
    }

    async fn reject(&self, event: DecideReservation) -> AppResult<Reservation> {
        self.decide(event, ReservationStatus::Rejected).await
    }

    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Reservation> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM reservations
            WHERE reservation_id = $1
            "#
        ))
        .bind(reservation_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        row.ok_or_else(|| {
            AppError::EntityNotFound(format!("reservation ({reservation_id}) was not found"))
        })?
        .try_into()
    }

    async fn find_in_window(
        &self,
        actor: &User,
        filter: ListFilter,
    ) -> AppResult<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = sqlx::query_as(&format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM reservations
            WHERE start_at < $1
              AND end_at > $2
              AND ($3::BIGINT IS NULL OR space_id = $3)
              AND ($4::BOOLEAN OR status IN ('PENDING', 'APPROVED'))
            ORDER BY start_at DESC
            "#
        ))
        .bind(filter.window.end)
        .bind(filter.window.start)
        .bind(filter.space_id)
        .bind(actor.is_admin())
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn find_created_by(
        &self,
        user_id: UserId,
        window: Option<ListWindow>,
    ) -> AppResult<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = sqlx::query_as(&format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM reservations
            WHERE created_by_id = $1
              AND ($2::TIMESTAMPTZ IS NULL OR start_at < $2)
              AND ($3::TIMESTAMPTZ IS NULL OR end_at > $3)
            ORDER BY start_at DESC
            "#
        ))
        .bind(user_id)
        .bind(window.map(|w| w.end))
        .bind(window.map(|w| w.start))
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn busy_blocks(
        &self,
        space_id: SpaceId,
        window: ListWindow,
    ) -> AppResult<Vec<BusyBlock>> {
        let rows: Vec<BusyBlockRow> = sqlx::query_as(
            r#"
            SELECT start_at, end_at
            FROM reservations
            WHERE space_id = $1
              AND status IN ('PENDING', 'APPROVED')
              AND start_at < $2
              AND end_at > $3
            ORDER BY start_at ASC
            "#,
        )
        .bind(space_id)
        .bind(window.end)
        .bind(window.start)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(BusyBlock::from).collect())
    }

    async fn report(&self, filter: ReportFilter) -> AppResult<ReservationReport> {
        let statuses = filter
            .statuses
            .map(|statuses| statuses.iter().map(ToString::to_string).collect::<Vec<_>>());
        let rows: Vec<ReportCountRow> = sqlx::query_as(
            r#"
            SELECT space_id, space_name, status, COUNT(*) AS count
            FROM reservations
            WHERE ($1::TIMESTAMPTZ IS NULL OR end_at >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR start_at <= $2)
              AND ($3::BIGINT IS NULL OR space_id = $3)
              AND ($4::TEXT[] IS NULL OR status = ANY($4))
            GROUP BY space_id, space_name, status
            "#,
        )
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.space_id)
        .bind(statuses)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let mut by_space: BTreeMap<(String, SpaceId), SpaceReportEntry> = BTreeMap::new();
        let mut total = 0;
        for row in rows {
            let status = ReservationStatus::from_str(&row.status)?;
            by_space
                .entry((row.space_name.clone(), row.space_id))
                .or_insert_with(|| SpaceReportEntry::empty(row.space_id, row.space_name))
                .add(status, row.count);
            total += row.count;
        }

        Ok(ReservationReport {
            total,
            spaces: by_space.into_values().collect(),
        })
    }
}

impl ReservationRepositoryImpl {
    // Serializable isolation closes the window left open when the locked
    // candidate set is empty and two writers insert at once.
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    // Locks every active reservation of the space, then decides the
    // overlap in memory. The lock set and the subsequent write commit or
    // fail together with the surrounding transaction.
    async fn lock_and_check_overlap(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        space_id: SpaceId,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
        exclude: Option<ReservationId>,
    ) -> AppResult<()> {
        let locked: Vec<ActivePeriodRow> = sqlx::query_as(
            r#"
            SELECT reservation_id, start_at, end_at
            FROM reservations
            WHERE space_id = $1
              AND status IN ('PENDING', 'APPROVED')
            FOR UPDATE
            "#,
        )
        .bind(space_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(map_query_error)?;

        let conflict = locked.iter().any(|row| {
            exclude != Some(row.reservation_id)
                && periods_overlap(start_at, end_at, row.start_at, row.end_at)
        });
        if conflict {
            return Err(AppError::OverlapConflict);
        }
        Ok(())
    }

    async fn find_for_update(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        reservation_id: ReservationId,
    ) -> AppResult<ReservationRow> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM reservations
            WHERE reservation_id = $1
            FOR UPDATE
            "#
        ))
        .bind(reservation_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_query_error)?;

        row.ok_or_else(|| {
            AppError::EntityNotFound(format!("reservation ({reservation_id}) was not found"))
        })
    }

    async fn decide(
        &self,
        event: DecideReservation,
        status: ReservationStatus,
    ) -> AppResult<Reservation> {
        let mut tx = self.db.begin().await?;

        let current: Reservation = self
            .find_for_update(&mut tx, event.reservation_id)
            .await?
            .try_into()?;
        current.ensure_decidable_by(&event.decided_by)?;

        let decided_by = &event.decided_by;
        let row: ReservationRow = sqlx::query_as(&format!(
            r#"
            UPDATE reservations
            SET status = $2,
                approved_by_id = $3,
                approved_by_email = $4,
                approved_by_first_name = $5,
                approved_by_last_name = $6,
                decision_at = now(),
                decision_note = $7,
                updated_at = now()
            WHERE reservation_id = $1
            RETURNING {RESERVATION_COLUMNS}
            "#
        ))
        .bind(event.reservation_id)
        .bind(status.to_string())
        .bind(decided_by.user_id)
        .bind(&decided_by.email)
        .bind(&decided_by.first_name)
        .bind(&decided_by.last_name)
        .bind(event.note.unwrap_or_default())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_query_error)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        row.try_into()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use kernel::model::{role::Role, space::SpaceSnapshot, user::UserSnapshot};
    use sqlx::PgPool;

    use super::*;
    use crate::database::model::{space::SpaceRow, user::UserRow};

    fn repo(pool: PgPool) -> ReservationRepositoryImpl {
        ReservationRepositoryImpl::new(ConnectionPool::new(pool), DurationLimits::new(30, 4))
    }

    async fn seed_space(pool: &PgPool, name: &str) -> SpaceSnapshot {
        let row: SpaceRow = sqlx::query_as(
            r#"
            INSERT INTO spaces (space_name, location, description, is_active)
            VALUES ($1, 'Biblioteca', '', TRUE)
            RETURNING space_id, space_name, location, description, is_active
            "#,
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();
        row.into()
    }

    async fn seed_user(pool: &PgPool, email: &str, role: Role) -> User {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (email, first_name, last_name, role)
            VALUES ($1, 'Test', 'User', $2)
            RETURNING user_id, email, first_name, last_name, role
            "#,
        )
        .bind(email)
        .bind(role.to_string())
        .fetch_one(pool)
        .await
        .unwrap();
        row.try_into().unwrap()
    }

    fn create_event(
        space: &SpaceSnapshot,
        user: &User,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> CreateReservation {
        CreateReservation::new(
            space.clone(),
            UserSnapshot::from(user),
            "Clase".into(),
            "".into(),
            start_at,
            end_at,
        )
    }

    fn base_time() -> DateTime<Utc> {
        Utc::now() + Duration::days(1)
    }

    #[sqlx::test]
    async fn create_rejects_overlap_and_allows_touching(pool: PgPool) {
        let space = seed_space(&pool, "Módulo 3").await;
        let other_space = seed_space(&pool, "Módulo 4").await;
        let teacher = seed_user(&pool, "teacher@fesc.edu", Role::Teacher).await;
        let repo = repo(pool);
        let t = base_time();
        let h = Duration::hours(1);

        let created = repo
            .create(create_event(&space, &teacher, t + h, t + h * 2))
            .await
            .unwrap();
        assert_eq!(created.status, ReservationStatus::Pending);
        assert_eq!(created.space.space_id, space.space_id);
        assert_eq!(created.created_by.user_id, teacher.user_id);
        assert!(created.approved_by.is_none());

        // Overlapping interval on the same space is rejected.
        let err = repo
            .create(create_event(
                &space,
                &teacher,
                t + h + Duration::minutes(30),
                t + h * 2 + Duration::minutes(30),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OverlapConflict));

        // Touching at the boundary is not an overlap.
        repo.create(create_event(&space, &teacher, t + h * 2, t + h * 3))
            .await
            .unwrap();

        // Other spaces are unaffected.
        repo.create(create_event(&other_space, &teacher, t + h, t + h * 2))
            .await
            .unwrap();
    }

    #[sqlx::test]
    async fn create_validates_the_period(pool: PgPool) {
        let space = seed_space(&pool, "Módulo 3").await;
        let teacher = seed_user(&pool, "teacher@fesc.edu", Role::Teacher).await;
        let repo = repo(pool);
        let t = base_time();

        let err = repo
            .create(create_event(&space, &teacher, t, t))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTimeRange));

        let err = repo
            .create(create_event(&space, &teacher, t, t + Duration::minutes(15)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ReservationTooShort(30)));

        let err = repo
            .create(create_event(&space, &teacher, t, t + Duration::hours(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ReservationTooLong(4)));
    }

    #[sqlx::test]
    async fn update_excludes_itself_but_not_others(pool: PgPool) {
        let space = seed_space(&pool, "Módulo 3").await;
        let teacher = seed_user(&pool, "teacher@fesc.edu", Role::Teacher).await;
        let admin = seed_user(&pool, "admin@fesc.edu", Role::Admin).await;
        let repo = repo(pool);
        let t = base_time();
        let h = Duration::hours(1);

        let first = repo
            .create(create_event(&space, &teacher, t + h, t + h * 2))
            .await
            .unwrap();
        repo.create(create_event(&space, &teacher, t + h * 3, t + h * 4))
            .await
            .unwrap();

        // Shifting within the reservation's own interval must not
        // conflict with itself.
        let moved = repo
            .update(UpdateReservation::new(
                first.reservation_id,
                admin.clone(),
                None,
                None,
                Some(t + h + Duration::minutes(30)),
                Some(t + h * 2 + Duration::minutes(30)),
            ))
            .await
            .unwrap();
        assert_eq!(moved.start_at, t + h + Duration::minutes(30));

        // Moving onto the second reservation is a conflict.
        let err = repo
            .update(UpdateReservation::new(
                first.reservation_id,
                admin.clone(),
                None,
                None,
                Some(t + h * 3),
                Some(t + h * 4),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OverlapConflict));

        // Editing is admin-only, even for the creator.
        let err = repo
            .update(UpdateReservation::new(
                first.reservation_id,
                teacher.clone(),
                Some("New title".into()),
                None,
                None,
                None,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ForbiddenOperation));

        // Title-only edits skip the period checks entirely.
        let renamed = repo
            .update(UpdateReservation::new(
                first.reservation_id,
                admin,
                Some("New title".into()),
                Some("Updated".into()),
                None,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(renamed.title, "New title");
        assert_eq!(renamed.description, "Updated");
    }

    #[sqlx::test]
    async fn approving_is_admin_only_and_terminal(pool: PgPool) {
        let space = seed_space(&pool, "Módulo 3").await;
        let teacher = seed_user(&pool, "teacher@fesc.edu", Role::Teacher).await;
        let admin = seed_user(&pool, "admin@fesc.edu", Role::Admin).await;
        let repo = repo(pool);
        let t = base_time();
        let h = Duration::hours(1);

        let created = repo
            .create(create_event(&space, &teacher, t + h, t + h * 2))
            .await
            .unwrap();

        let err = repo
            .approve(DecideReservation::new(
                created.reservation_id,
                teacher.clone(),
                Some("ok".into()),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ForbiddenOperation));

        let approved = repo
            .approve(DecideReservation::new(
                created.reservation_id,
                admin.clone(),
                Some("ok".into()),
            ))
            .await
            .unwrap();
        assert_eq!(approved.status, ReservationStatus::Approved);
        assert_eq!(
            approved.approved_by.as_ref().map(|u| u.user_id),
            Some(admin.user_id)
        );
        assert_eq!(approved.decision_note, "ok");
        assert!(approved.decision_at.is_some());

        // A decided reservation cannot be decided again.
        let err = repo
            .reject(DecideReservation::new(
                created.reservation_id,
                admin,
                Some("change".into()),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[sqlx::test]
    async fn cancelling_clears_decision_metadata(pool: PgPool) {
        let space = seed_space(&pool, "Módulo 3").await;
        let teacher = seed_user(&pool, "teacher@fesc.edu", Role::Teacher).await;
        let other = seed_user(&pool, "other@fesc.edu", Role::Teacher).await;
        let admin = seed_user(&pool, "admin@fesc.edu", Role::Admin).await;
        let repo = repo(pool);
        let t = base_time();
        let h = Duration::hours(1);

        let created = repo
            .create(create_event(&space, &teacher, t + h, t + h * 2))
            .await
            .unwrap();
        repo.approve(DecideReservation::new(
            created.reservation_id,
            admin,
            Some("ok".into()),
        ))
        .await
        .unwrap();

        // Another teacher cannot cancel someone else's reservation.
        let err = repo
            .cancel(CancelReservation::new(created.reservation_id, other))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ForbiddenOperation));

        // The creator can, even after approval.
        let cancelled = repo
            .cancel(CancelReservation::new(created.reservation_id, teacher.clone()))
            .await
            .unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
        assert!(cancelled.approved_by.is_none());
        assert_eq!(cancelled.decision_note, "");
        assert!(cancelled.decision_at.is_some());

        // Terminal states stay terminal.
        let err = repo
            .cancel(CancelReservation::new(created.reservation_id, teacher))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[sqlx::test]
    async fn cancelled_intervals_are_free_again(pool: PgPool) {
        let space = seed_space(&pool, "Módulo 3").await;
        let teacher = seed_user(&pool, "teacher@fesc.edu", Role::Teacher).await;
        let repo = repo(pool);
        let t = base_time();
        let h = Duration::hours(1);

        let created = repo
            .create(create_event(&space, &teacher, t + h, t + h * 2))
            .await
            .unwrap();
        repo.cancel(CancelReservation::new(created.reservation_id, teacher.clone()))
            .await
            .unwrap();

        // The exact same interval can be booked again.
        repo.create(create_event(&space, &teacher, t + h, t + h * 2))
            .await
            .unwrap();
    }

    #[sqlx::test]
    async fn concurrent_creates_admit_exactly_one(pool: PgPool) {
        let space = seed_space(&pool, "Módulo 3").await;
        let teacher = seed_user(&pool, "teacher@fesc.edu", Role::Teacher).await;
        let repo = Arc::new(repo(pool));
        let t = base_time();
        let h = Duration::hours(1);

        let (first, second) = tokio::join!(
            repo.create(create_event(&space, &teacher, t + h, t + h * 2)),
            repo.create(create_event(&space, &teacher, t + h, t + h * 2)),
        );

        let results = [first, second];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one of the two writers may win");
        for result in results {
            if let Err(err) = result {
                assert!(matches!(err, AppError::OverlapConflict));
            }
        }
    }

    #[sqlx::test]
    async fn listing_is_role_scoped(pool: PgPool) {
        let space = seed_space(&pool, "Módulo 3").await;
        let teacher = seed_user(&pool, "teacher@fesc.edu", Role::Teacher).await;
        let admin = seed_user(&pool, "admin@fesc.edu", Role::Admin).await;
        let repo = repo(pool);
        let t = base_time();
        let h = Duration::hours(1);

        let kept = repo
            .create(create_event(&space, &teacher, t + h, t + h * 2))
            .await
            .unwrap();
        let cancelled = repo
            .create(create_event(&space, &teacher, t + h * 3, t + h * 4))
            .await
            .unwrap();
        repo.cancel(CancelReservation::new(cancelled.reservation_id, teacher.clone()))
            .await
            .unwrap();

        let window = ListWindow::for_list(Utc::now(), None, Some(t + Duration::days(2))).unwrap();

        let seen_by_teacher = repo
            .find_in_window(&teacher, ListFilter::new(window, None))
            .await
            .unwrap();
        assert_eq!(seen_by_teacher.len(), 1);
        assert_eq!(seen_by_teacher[0].reservation_id, kept.reservation_id);

        let seen_by_admin = repo
            .find_in_window(&admin, ListFilter::new(window, None))
            .await
            .unwrap();
        assert_eq!(seen_by_admin.len(), 2);

        // Most recent start first.
        assert_eq!(seen_by_admin[0].reservation_id, cancelled.reservation_id);
    }

    #[sqlx::test]
    async fn mine_spans_all_statuses_of_the_creator(pool: PgPool) {
        let space = seed_space(&pool, "Módulo 3").await;
        let teacher = seed_user(&pool, "teacher@fesc.edu", Role::Teacher).await;
        let other = seed_user(&pool, "other@fesc.edu", Role::Teacher).await;
        let repo = repo(pool);
        let t = base_time();
        let h = Duration::hours(1);

        let first = repo
            .create(create_event(&space, &teacher, t + h, t + h * 2))
            .await
            .unwrap();
        repo.cancel(CancelReservation::new(first.reservation_id, teacher.clone()))
            .await
            .unwrap();
        repo.create(create_event(&space, &teacher, t + h * 3, t + h * 4))
            .await
            .unwrap();
        repo.create(create_event(&space, &other, t + h * 5, t + h * 6))
            .await
            .unwrap();

        let mine = repo.find_created_by(teacher.user_id, None).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|r| r.created_by.user_id == teacher.user_id));

        // A window cuts the result down.
        let window = ListWindow {
            start: t + h * 3,
            end: t + h * 4,
        };
        let mine = repo
            .find_created_by(teacher.user_id, Some(window))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[sqlx::test]
    async fn busy_blocks_are_ordered_and_skip_inactive(pool: PgPool) {
        let space = seed_space(&pool, "Módulo 3").await;
        let teacher = seed_user(&pool, "teacher@fesc.edu", Role::Teacher).await;
        let repo = repo(pool);
        let t = base_time();
        let h = Duration::hours(1);

        repo.create(create_event(&space, &teacher, t + h * 3, t + h * 4))
            .await
            .unwrap();
        repo.create(create_event(&space, &teacher, t + h, t + h * 2))
            .await
            .unwrap();
        let cancelled = repo
            .create(create_event(&space, &teacher, t + h * 5, t + h * 6))
            .await
            .unwrap();
        repo.cancel(CancelReservation::new(cancelled.reservation_id, teacher))
            .await
            .unwrap();

        let window = ListWindow {
            start: t,
            end: t + Duration::days(1),
        };
        let blocks = repo.busy_blocks(space.space_id, window).await.unwrap();
        assert_eq!(
            blocks,
            vec![
                BusyBlock {
                    start_at: t + h,
                    end_at: t + h * 2
                },
                BusyBlock {
                    start_at: t + h * 3,
                    end_at: t + h * 4
                },
            ]
        );

        // A window ending exactly at a block's start excludes it.
        let window = ListWindow {
            start: t,
            end: t + h,
        };
        let blocks = repo.busy_blocks(space.space_id, window).await.unwrap();
        assert!(blocks.is_empty());
    }

    #[sqlx::test]
    async fn report_groups_by_space_with_status_counts(pool: PgPool) {
        let space = seed_space(&pool, "Módulo 3").await;
        let annex = seed_space(&pool, "Anexo").await;
        let teacher = seed_user(&pool, "teacher@fesc.edu", Role::Teacher).await;
        let admin = seed_user(&pool, "admin@fesc.edu", Role::Admin).await;
        let repo = repo(pool);
        let t = base_time();
        let h = Duration::hours(1);

        let first = repo
            .create(create_event(&space, &teacher, t + h, t + h * 2))
            .await
            .unwrap();
        repo.approve(DecideReservation::new(first.reservation_id, admin, None))
            .await
            .unwrap();
        repo.create(create_event(&space, &teacher, t + h * 3, t + h * 4))
            .await
            .unwrap();
        repo.create(create_event(&annex, &teacher, t + h, t + h * 2))
            .await
            .unwrap();

        let report = repo.report(ReportFilter::default()).await.unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.spaces.len(), 2);
        // BTreeMap ordering puts "Anexo" before "Módulo 3".
        assert_eq!(report.spaces[0].space_name, "Anexo");
        assert_eq!(report.spaces[1].space_name, "Módulo 3");
        assert_eq!(report.spaces[1].approved, 1);
        assert_eq!(report.spaces[1].pending, 1);

        let report = repo
            .report(ReportFilter::new(
                None,
                None,
                None,
                Some(vec![ReservationStatus::Approved]),
            ))
            .await
            .unwrap();
        assert_eq!(report.total, 1);
        assert_eq!(report.spaces.len(), 1);
        assert_eq!(report.spaces[0].approved, 1);
    }

    #[sqlx::test]
    async fn missing_reservations_are_not_found(pool: PgPool) {
        let repo = repo(pool);
        let err = repo
            .find_by_id(ReservationId::new(4040))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));
    }
}
