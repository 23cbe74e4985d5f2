use async_trait::async_trait;

use crate::model::{auth::AccessToken, id::UserId, user::User};
use shared::error::AppResult;

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn fetch_user_id_from_token(
        &self,
        access_token: &AccessToken,
    ) -> AppResult<Option<UserId>>;
    async fn fetch_user_by_id(&self, user_id: UserId) -> AppResult<Option<User>>;
}
