use async_trait::async_trait;

use crate::model::{auth::AccessToken, id::SpaceId, space::SpaceSnapshot};
use shared::error::AppResult;

/// Obtains canonical space data, either from the shared datastore or from
/// the spaces service over HTTP. The credential is the caller's own token
/// and is only used by the remote variant.
#[async_trait]
pub trait SpaceResolver: Send + Sync {
    async fn resolve(
        &self,
        space_id: Option<SpaceId>,
        credential: &AccessToken,
    ) -> AppResult<SpaceSnapshot>;
}
