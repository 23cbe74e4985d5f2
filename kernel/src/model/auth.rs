/// Opaque bearer credential presented by the caller. It is kept around so
/// that outbound collaborator calls can propagate it unchanged.
pub struct AccessToken(pub String);
