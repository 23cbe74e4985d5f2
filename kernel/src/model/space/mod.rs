use crate::model::id::SpaceId;

/// Canonical space data as resolved at booking time. Like the creator
/// identity, it is embedded into the reservation and never refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceSnapshot {
    pub space_id: SpaceId,
    pub name: String,
    pub location: String,
    pub description: String,
}
