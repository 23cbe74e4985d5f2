use std::time::Duration;

use async_trait::async_trait;
use derive_new::new;
use kernel::model::{auth::AccessToken, id::SpaceId, space::SpaceSnapshot};
use kernel::repository::space::SpaceResolver;
use serde::Deserialize;
use shared::config::SpacesConfig;
use shared::error::{AppError, AppResult};

use crate::database::{model::space::SpaceRow, ConnectionPool};

// Singleton used when a request does not name a space.
const DEFAULT_SPACE_NAME: &str = "Módulo 3";
const DEFAULT_SPACE_DESCRIPTION: &str = "Espacio único de Biblioteca FESC";

#[derive(new)]
pub struct LocalSpaceResolverImpl {
    db: ConnectionPool,
}

#[async_trait]
impl SpaceResolver for LocalSpaceResolverImpl {
    async fn resolve(
        &self,
        space_id: Option<SpaceId>,
        _credential: &AccessToken,
    ) -> AppResult<SpaceSnapshot> {
        let row = match space_id {
            Some(space_id) => {
                let row: Option<SpaceRow> = sqlx::query_as(
                    r#"
                    SELECT space_id, space_name, location, description, is_active
                    FROM spaces
                    WHERE space_id = $1
                    "#,
                )
                .bind(space_id)
                .fetch_optional(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;
                row.ok_or(AppError::SpaceNotFound(space_id.raw()))?
            }
            None => self.default_space().await?,
        };
        if !row.is_active {
            return Err(AppError::SpaceInactive(row.space_id.raw()));
        }
        Ok(row.into())
    }
}

impl LocalSpaceResolverImpl {
    // Creates the well-known default space on first use. The no-op update
    // on conflict makes RETURNING yield the existing row.
    async fn default_space(&self) -> AppResult<SpaceRow> {
        sqlx::query_as(
            r#"
            INSERT INTO spaces (space_name, location, description, is_active)
            VALUES ($1, '', $2, TRUE)
            ON CONFLICT (space_name)
            DO UPDATE SET space_name = EXCLUDED.space_name
            RETURNING space_id, space_name, location, description, is_active
            "#,
        )
        .bind(DEFAULT_SPACE_NAME)
        .bind(DEFAULT_SPACE_DESCRIPTION)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)
    }
}

/// Payload returned by the spaces service.
#[derive(Deserialize)]
struct RemoteSpace {
    id: i64,
    name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_true")]
    is_active: bool,
}

fn default_true() -> bool {
    true
}

pub struct RemoteSpaceResolverImpl {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteSpaceResolverImpl {
    pub fn new(config: &SpacesConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::SpaceUnavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SpaceResolver for RemoteSpaceResolverImpl {
    // One remote round-trip per resolution, always before any local
    // transaction is opened. Timeouts count as transport failure.
    async fn resolve(
        &self,
        space_id: Option<SpaceId>,
        credential: &AccessToken,
    ) -> AppResult<SpaceSnapshot> {
        let Some(space_id) = space_id else {
            return Err(AppError::UnprocessableEntity(
                "space_id is required".into(),
            ));
        };
        let url = format!("{}/spaces/{}", self.base_url, space_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&credential.0)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error.message = %e, %url, "spaces service request failed");
                AppError::SpaceUnavailable(e.to_string())
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::SpaceNotFound(space_id.raw()));
        }
        if !response.status().is_success() {
            return Err(AppError::SpaceUnavailable(format!(
                "spaces service returned {}",
                response.status()
            )));
        }

        let space: RemoteSpace = response
            .json()
            .await
            .map_err(|e| AppError::SpaceUnavailable(e.to_string()))?;
        if !space.is_active {
            return Err(AppError::SpaceInactive(space.id));
        }
        Ok(SpaceSnapshot {
            space_id: SpaceId::new(space.id),
            name: space.name,
            location: space.location,
            description: space.description,
        })
    }
}
