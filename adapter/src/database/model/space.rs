use kernel::model::{id::SpaceId, space::SpaceSnapshot};

#[derive(sqlx::FromRow)]
pub struct SpaceRow {
    pub space_id: SpaceId,
    pub space_name: String,
    pub location: String,
    pub description: String,
    pub is_active: bool,
}

impl From<SpaceRow> for SpaceSnapshot {
    fn from(value: SpaceRow) -> Self {
        let SpaceRow {
            space_id,
            space_name,
            location,
            description,
            is_active: _,
        } = value;
        SpaceSnapshot {
            space_id,
            name: space_name,
            location,
            description,
        }
    }
}
