//! Chemical Source Port - Interface for external chemical databases.
//!
//! Each adapter wraps one database (PubChem, CosIng, ToxVal, ...) and serves
//! one or more [`SourceDomain`]s. Adapters never fail past this boundary:
//! transport and parse problems come back as [`SourceOutcome::Failed`] so
//! the caller can fall through to the next source.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct FixedSource;
//!
//! #[async_trait]
//! impl ChemicalSource for FixedSource {
//!     fn name(&self) -> &str { "fixed" }
//!     fn domains(&self) -> &[SourceDomain] { &[SourceDomain::Identity] }
//!     async fn lookup(&self, _domain: SourceDomain, _name: &str) -> SourceOutcome {
//!         SourceOutcome::NotFound
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::identity::{DomainRecord, SourceDomain};

/// Port for a single external chemical database.
#[async_trait]
pub trait ChemicalSource: Send + Sync {
    /// Short, stable name recorded in `sources_checked` / `sources_used`.
    fn name(&self) -> &str;

    /// Domains this source can answer.
    fn domains(&self) -> &[SourceDomain];

    /// Looks up an ingredient by name for one domain.
    async fn lookup(&self, domain: SourceDomain, name: &str) -> SourceOutcome;

    /// True when the source queues its requests behind its own rate limit
    /// and bounds each request once it leaves that queue. Callers must not
    /// put a deadline around the whole lookup, or queue time counts against it.
    fn bounds_own_requests(&self) -> bool {
        false
    }

    /// True when the source serves the domain.
    fn serves(&self, domain: SourceDomain) -> bool {
        self.domains().contains(&domain)
    }
}

/// Result of one source attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    /// The source produced a record for the requested domain.
    Found(DomainRecord),
    /// The source ran but knows nothing about the name.
    NotFound,
    /// The source could not answer.
    Failed(SourceError),
}

impl SourceOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SourceOutcome::Found(_))
    }
}

/// Errors a source can report for a single attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Transport failure (connection refused, DNS, database down).
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// Request exceeded its time budget.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Remote answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Response could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// The source does not serve the requested domain.
    #[error("domain {0} not supported")]
    UnsupportedDomain(SourceDomain),
}

impl From<SourceError> for DomainError {
    fn from(err: SourceError) -> Self {
        DomainError::new(ErrorCode::SourceUnavailable, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_context() {
        assert_eq!(
            SourceError::Timeout(Duration::from_secs(10)).to_string(),
            "request timed out after 10s"
        );
        assert_eq!(
            SourceError::Timeout(Duration::from_millis(1_500)).to_string(),
            "request timed out after 1.5s"
        );
        assert_eq!(
            SourceError::Timeout(Duration::from_millis(500)).to_string(),
            "request timed out after 500ms"
        );
        assert_eq!(
            SourceError::Http {
                status: 503,
                message: "Service Unavailable".to_string()
            }
            .to_string(),
            "HTTP 503: Service Unavailable"
        );
        assert_eq!(
            SourceError::UnsupportedDomain(SourceDomain::Regulatory).to_string(),
            "domain regulatory not supported"
        );
    }

    #[test]
    fn converts_to_source_unavailable() {
        let err: DomainError = SourceError::Timeout(Duration::from_secs(5)).into();
        assert_eq!(err.code, ErrorCode::SourceUnavailable);
    }

    #[test]
    fn only_found_is_found() {
        assert!(!SourceOutcome::NotFound.is_found());
        assert!(!SourceOutcome::Failed(SourceError::Parse("x".into())).is_found());
    }
}
