//! PostgreSQL adapter for UserProfileReader
//!
//! Profiles live as one JSONB document per user in `user_profiles`, with
//! the same camelCase layout the profile snapshot serializes to.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::decision::UserProfile;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::UserProfileReader;

/// PostgreSQL implementation of UserProfileReader
pub struct PgUserProfileReader {
    pool: PgPool,
}

impl PgUserProfileReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_profile(user_id: &UserId, document: serde_json::Value) -> Result<UserProfile, DomainError> {
    serde_json::from_value(document).map_err(|e| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Malformed profile document: {}", e),
        )
        .with_detail("user_id", user_id.as_str())
    })
}

#[async_trait]
impl UserProfileReader for PgUserProfileReader {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT profile
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::new(ErrorCode::DatabaseError, format!("Database error: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let document: serde_json::Value = row
            .try_get("profile")
            .map_err(|e| DomainError::new(ErrorCode::DatabaseError, format!("Database error: {}", e)))?;

        parse_profile(user_id, document).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decision::ExposureLevel;
    use serde_json::json;

    #[test]
    fn parses_partial_camel_case_document() {
        let user_id = UserId::new("user-1").unwrap();
        let document = json!({
            "skin": { "sensitive": true, "acneProne": true },
            "preferences": { "fragranceFree": true },
            "environment": { "sunExposure": "high" }
        });

        let profile = parse_profile(&user_id, document).unwrap();
        assert!(profile.skin.sensitive);
        assert!(profile.skin.acne_prone);
        assert!(profile.preferences.fragrance_free);
        assert_eq!(profile.environment.sun_exposure, ExposureLevel::High);
        assert!(profile.allergies.known_intolerances.is_empty());
    }

    #[test]
    fn malformed_document_is_internal_error() {
        let user_id = UserId::new("user-1").unwrap();
        let err = parse_profile(&user_id, json!({ "skin": "oily" })).unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.details.get("user_id").map(String::as_str), Some("user-1"));
    }
}
