//! In-memory UserProfileReader for tests and the CLI.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::decision::UserProfile;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::UserProfileReader;

#[derive(Debug, Default)]
pub struct InMemoryProfileReader {
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryProfileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(user_id: UserId, profile: UserProfile) -> Self {
        Self {
            profiles: RwLock::new(HashMap::from([(user_id, profile)])),
        }
    }

    pub async fn insert(&self, user_id: UserId, profile: UserProfile) {
        self.profiles.write().await.insert(user_id, profile);
    }
}

#[async_trait]
impl UserProfileReader for InMemoryProfileReader {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }
}
