//! UserProfileReader port for read-only profile access.

use async_trait::async_trait;

use crate::domain::decision::UserProfile;
use crate::domain::foundation::{DomainError, UserId};

/// Query operations for user health profiles.
#[async_trait]
pub trait UserProfileReader: Send + Sync {
    /// Returns the profile snapshot, `None` if the user has no profile.
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError>;
}
