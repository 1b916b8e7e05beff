/// Authenticated-request context
///
/// After bearer-token validation the API layer inserts an [`AuthContext`]
/// into the request extensions; handlers extract it with Axum's
/// `Extension` extractor. The context carries identity resolved from the
/// token's named claims, never by position in a claims list.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;

/// Identity of the authenticated caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// The caller's user ID (the token's `uid` claim)
    pub user_id: Uuid,

    /// The caller's email (the token's `sub` claim)
    pub email: String,
}

impl AuthContext {
    /// Builds the context from validated token claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.uid,
            email: claims.sub.clone(),
        }
    }
}
