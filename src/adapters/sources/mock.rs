//! Mock chemical source for testing.
//!
//! Answers lookups from a fixed table of outcomes keyed by domain and
//! name, so mapper and pipeline tests run without network or database.
//!
//! # Features
//!
//! - Scripted outcomes per (domain, name), `NotFound` otherwise
//! - Simulated latency for timeout testing
//! - Shared request throttle for rate-limit testing
//! - Panic injection for batch isolation testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let source = MockChemicalSource::new("mock", &[SourceDomain::Identity])
//!     .with_record("aqua", DomainRecord::Identity(record))
//!     .with_delay(Duration::from_millis(50));
//!
//! assert!(source.lookup(SourceDomain::Identity, "Aqua").await.is_found());
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use super::RequestThrottle;
use crate::domain::identity::{DomainRecord, SourceDomain};
use crate::ports::{ChemicalSource, SourceError, SourceOutcome};

type OutcomeKey = (SourceDomain, String);

fn key(domain: SourceDomain, name: &str) -> OutcomeKey {
    (domain, name.trim().to_lowercase())
}

/// Scripted chemical source.
#[derive(Debug, Clone)]
pub struct MockChemicalSource {
    name: String,
    domains: Vec<SourceDomain>,
    outcomes: Arc<Mutex<HashMap<OutcomeKey, SourceOutcome>>>,
    delay: Duration,
    /// Throttle plus the number of requests each lookup sends through it.
    throttle: Option<(Arc<RequestThrottle>, usize)>,
    panic_on: Option<String>,
    calls: Arc<Mutex<Vec<OutcomeKey>>>,
}

impl MockChemicalSource {
    pub fn new(name: impl Into<String>, domains: &[SourceDomain]) -> Self {
        Self {
            name: name.into(),
            domains: domains.to_vec(),
            outcomes: Arc::new(Mutex::new(HashMap::new())),
            delay: Duration::ZERO,
            throttle: None,
            panic_on: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answers `name` in the record's domain with the record.
    pub fn with_record(self, name: &str, record: DomainRecord) -> Self {
        let domain = record.domain();
        self.with_outcome(domain, name, SourceOutcome::Found(record))
    }

    /// Answers `name` in `domain` with a failure.
    pub fn with_failure(self, domain: SourceDomain, name: &str, error: SourceError) -> Self {
        self.with_outcome(domain, name, SourceOutcome::Failed(error))
    }

    pub fn with_outcome(self, domain: SourceDomain, name: &str, outcome: SourceOutcome) -> Self {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key(domain, name), outcome);
        self
    }

    /// Simulated latency per lookup.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sends `requests` throttled requests per lookup, like a rate-limited
    /// web source. The source then bounds its own requests.
    pub fn with_throttle(mut self, throttle: Arc<RequestThrottle>, requests: usize) -> Self {
        self.throttle = Some((throttle, requests));
        self
    }

    /// Panics on any lookup for `name`.
    pub fn panicking_on(mut self, name: &str) -> Self {
        self.panic_on = Some(name.trim().to_lowercase());
        self
    }

    /// Number of lookups received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Lookups received for one domain, as normalized names.
    pub fn calls_for(&self, domain: SourceDomain) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(d, _)| *d == domain)
            .map(|(_, name)| name.clone())
            .collect()
    }
}

#[async_trait]
impl ChemicalSource for MockChemicalSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn domains(&self) -> &[SourceDomain] {
        &self.domains
    }

    fn bounds_own_requests(&self) -> bool {
        self.throttle.is_some()
    }

    async fn lookup(&self, domain: SourceDomain, name: &str) -> SourceOutcome {
        let key = key(domain, name);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key.clone());

        if let Some((throttle, requests)) = &self.throttle {
            for _ in 0..*requests {
                throttle.acquire().await;
            }
        }
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        if self.panic_on.as_deref() == Some(key.1.as_str()) {
            panic!("mock source {} told to panic on {}", self.name, key.1);
        }
        if !self.serves(domain) {
            return SourceOutcome::Failed(SourceError::UnsupportedDomain(domain));
        }

        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
            .unwrap_or(SourceOutcome::NotFound)
    }
}
