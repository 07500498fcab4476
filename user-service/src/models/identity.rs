use uuid::Uuid;

use crate::models::AccessLevel;

/// Identity reconstructed from a validated access token's claims.
///
/// Lives only for the duration of one request, carried in request
/// extensions; never persisted.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub id: Uuid,
    pub email: String,
    pub level: AccessLevel,
}
