use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("start_at must be before end_at")]
    InvalidTimeRange,
    #[error("reservation must last at least {0} minutes")]
    ReservationTooShort(i64),
    #[error("reservation cannot exceed {0} hours")]
    ReservationTooLong(i64),
    #[error("the requested time range is already reserved")]
    OverlapConflict,
    #[error("space ({0}) was not found")]
    SpaceNotFound(i64),
    #[error("space ({0}) is not active")]
    SpaceInactive(i64),
    #[error("spaces service is unavailable: {0}")]
    SpaceUnavailable(String),
    #[error("illegal status transition: {0}")]
    InvalidTransition(String),
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error(transparent)]
    ValidationError(#[from] garde::Report),
    #[error("failed to run the transaction")]
    TransactionError(#[source] sqlx::Error),
    #[error("an error happened during a database operation")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("no rows affected: {0}")]
    NoRowsAffectedError(String),
    #[error("failed to access the key-value store")]
    KeyValueStoreError(#[from] redis::RedisError),
    #[error("authentication is required")]
    UnauthenticatedError,
    #[error("the operation is not permitted for this user")]
    ForbiddenOperation,
    #[error(transparent)]
    ConversionEntityError(#[from] strum::ParseError),
    #[error(transparent)]
    ConvertToIdError(#[from] std::num::ParseIntError),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::UnauthenticatedError => StatusCode::UNAUTHORIZED,
            AppError::ForbiddenOperation => StatusCode::FORBIDDEN,
            AppError::EntityNotFound(_) | AppError::SpaceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTimeRange
            | AppError::ReservationTooShort(_)
            | AppError::ReservationTooLong(_)
            | AppError::SpaceInactive(_)
            | AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::OverlapConflict | AppError::InvalidTransition(_) => StatusCode::CONFLICT,
            AppError::SpaceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            e @ (AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::KeyValueStoreError(_)
            | AppError::ConversionEntityError(_)
            | AppError::ConvertToIdError(_)) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "unexpected error happened"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status_code, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
