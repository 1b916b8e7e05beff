/// Per-tier resource limits
///
/// The FREE tier caps how many lists a user may own; PRO is uncapped.
/// Enforcement happens at list creation; existing data is never touched
/// when a user drops back to FREE.
///
/// # Limits by tier
///
/// - **FREE**: 5 owned lists
/// - **PRO**: unlimited

use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

use crate::models::role::{Role, Tier};
use crate::models::todo_list::TodoList;

/// Quota enforcement error
#[derive(Debug)]
pub enum QuotaError {
    /// Tier limit reached
    LimitExceeded { limit: u32, current: u32 },

    /// Database error
    DatabaseError(sqlx::Error),
}

impl fmt::Display for QuotaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaError::LimitExceeded { limit, current } => {
                write!(f, "Owned-list limit exceeded ({}/{})", current, limit)
            }
            QuotaError::DatabaseError(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for QuotaError {}

impl From<sqlx::Error> for QuotaError {
    fn from(err: sqlx::Error) -> Self {
        QuotaError::DatabaseError(err)
    }
}

/// Limits for a tier
#[derive(Debug, Clone, Copy)]
pub struct QuotaLimits {
    /// Maximum owned lists (None = unlimited)
    pub owned_lists: Option<u32>,
}

impl QuotaLimits {
    /// Gets the limits for a tier
    pub fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Free => QuotaLimits {
                owned_lists: Some(5),
            },
            Tier::Pro => QuotaLimits { owned_lists: None },
        }
    }
}

/// Checks list-creation quota against the user's tier
pub struct QuotaEnforcer {
    db: PgPool,
}

impl QuotaEnforcer {
    pub fn new(db: PgPool) -> Self {
        QuotaEnforcer { db }
    }

    /// Errors with [`QuotaError::LimitExceeded`] when creating one more
    /// list would pass the user's tier limit.
    pub async fn enforce_list_create(&self, user_id: Uuid) -> Result<(), QuotaError> {
        let tier = Role::tier_for_user(&self.db, user_id).await?;
        let limits = QuotaLimits::for_tier(tier);

        let Some(limit) = limits.owned_lists else {
            return Ok(());
        };

        let current = TodoList::count_owned(&self.db, user_id).await? as u32;

        if current >= limit {
            return Err(QuotaError::LimitExceeded { limit, current });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_limits_free() {
        let limits = QuotaLimits::for_tier(Tier::Free);
        assert_eq!(limits.owned_lists, Some(5));
    }

    #[test]
    fn test_quota_limits_pro() {
        let limits = QuotaLimits::for_tier(Tier::Pro);
        assert_eq!(limits.owned_lists, None);
    }

    #[test]
    fn test_quota_error_display() {
        let err = QuotaError::LimitExceeded {
            limit: 5,
            current: 5,
        };
        assert_eq!(err.to_string(), "Owned-list limit exceeded (5/5)");
    }
}
