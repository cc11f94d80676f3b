//! IdentityMapper - resolves ingredient names across the four data domains.
//!
//! For one name the four domain collectors run concurrently. Each collector
//! walks its source chain in priority order and stops at the first hit;
//! failures become error strings on the record and never abort the mapping.
//!
//! Sources without their own rate limit get a deadline per lookup. Rate
//! limited sources bound each request after it leaves their queue instead.
//!
//! Batches run in fixed-size chunks of concurrently mapped names with a
//! pause between chunks. A panicking lookup degrades to a `found = false`
//! record for that name only.

use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::adapters::sources::SourceRegistry;
use crate::config::MapperConfig;
use crate::domain::identity::{ComprehensiveRecord, DomainCollection, SourceDomain};
use crate::ports::{SourceError, SourceOutcome};

/// Concurrent multi-source ingredient mapper.
#[derive(Debug, Clone)]
pub struct IdentityMapper {
    registry: Arc<SourceRegistry>,
    batch_size: usize,
    batch_pause: Duration,
    source_timeout: Duration,
}

impl IdentityMapper {
    pub fn new(registry: SourceRegistry, config: &MapperConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            batch_size: config.batch_size.max(1),
            batch_pause: config.batch_pause(),
            source_timeout: config.source_timeout(),
        }
    }

    pub fn with_source_timeout(mut self, source_timeout: Duration) -> Self {
        self.source_timeout = source_timeout;
        self
    }

    pub fn with_batch_pause(mut self, batch_pause: Duration) -> Self {
        self.batch_pause = batch_pause;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Maps one ingredient name.
    pub async fn map(&self, name: &str) -> ComprehensiveRecord {
        let name = name.trim();
        if name.is_empty() {
            return ComprehensiveRecord::failed(name, "empty ingredient name");
        }

        let started = Instant::now();
        let (identity, toxicology, regulatory, physical_chemical) = tokio::join!(
            self.collect(SourceDomain::Identity, name),
            self.collect(SourceDomain::Toxicology, name),
            self.collect(SourceDomain::Regulatory, name),
            self.collect(SourceDomain::PhysicalChemical, name),
        );

        let record = ComprehensiveRecord::assemble(
            name,
            vec![identity, toxicology, regulatory, physical_chemical],
        );

        info!(
            ingredient = name,
            found = record.found,
            completeness = record.data_completeness,
            sources = ?record.sources_used,
            errors = record.errors.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ingredient mapped"
        );
        record
    }

    /// Maps every name, in input order.
    pub async fn map_batch(&self, names: &[String]) -> Vec<ComprehensiveRecord> {
        self.run_batch(names, None).await
    }

    /// Like [`map_batch`](Self::map_batch) but stops starting new chunks
    /// once `shutdown` turns `true`. The chunk in flight completes, so the
    /// result may be shorter than `names`.
    pub async fn map_batch_until(
        &self,
        names: &[String],
        shutdown: watch::Receiver<bool>,
    ) -> Vec<ComprehensiveRecord> {
        self.run_batch(names, Some(shutdown)).await
    }

    async fn run_batch(
        &self,
        names: &[String],
        mut shutdown: Option<watch::Receiver<bool>>,
    ) -> Vec<ComprehensiveRecord> {
        let mut records = Vec::with_capacity(names.len());
        let chunks: Vec<&[String]> = names.chunks(self.batch_size).collect();

        for (index, chunk) in chunks.iter().enumerate() {
            if shutdown.as_ref().is_some_and(|rx| *rx.borrow()) {
                info!(
                    mapped = records.len(),
                    remaining = names.len() - records.len(),
                    "batch mapping stopped by shutdown"
                );
                break;
            }

            records.extend(self.map_chunk(chunk).await);

            let is_last = index + 1 == chunks.len();
            if !is_last && self.pause(&mut shutdown).await {
                info!(
                    mapped = records.len(),
                    remaining = names.len() - records.len(),
                    "batch mapping stopped by shutdown"
                );
                break;
            }
        }

        records
    }

    async fn map_chunk(&self, chunk: &[String]) -> Vec<ComprehensiveRecord> {
        let handles: Vec<_> = chunk
            .iter()
            .map(|name| {
                let mapper = self.clone();
                let name = name.clone();
                tokio::spawn(async move { mapper.map(&name).await })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(chunk)
            .map(|(joined, name)| match joined {
                Ok(record) => record,
                Err(e) => {
                    warn!(ingredient = %name, error = %e, "ingredient mapping task failed");
                    ComprehensiveRecord::failed(name.trim(), format!("mapping failed: {}", e))
                }
            })
            .collect()
    }

    /// Sleeps between chunks. Returns true when shutdown was requested.
    async fn pause(&self, shutdown: &mut Option<watch::Receiver<bool>>) -> bool {
        let delay = sleep(self.batch_pause);
        let Some(rx) = shutdown else {
            delay.await;
            return false;
        };

        tokio::pin!(delay);
        loop {
            tokio::select! {
                _ = &mut delay => return *rx.borrow(),
                changed = rx.changed() => {
                    if changed.is_err() {
                        (&mut delay).await;
                        return *rx.borrow();
                    }
                    if *rx.borrow() {
                        return true;
                    }
                }
            }
        }
    }

    /// Walks the domain's source chain until one source finds the name.
    async fn collect(&self, domain: SourceDomain, name: &str) -> DomainCollection {
        let mut collection = DomainCollection::empty(domain);

        for source in self.registry.chain(domain) {
            collection.sources_checked.push(source.name().to_string());
            debug!(source = source.name(), domain = %domain, ingredient = name, "querying source");

            // Rate-limited sources time each request after its queue wait.
            let lookup = source.lookup(domain, name);
            let outcome = if source.bounds_own_requests() {
                lookup.await
            } else {
                match timeout(self.source_timeout, lookup).await {
                    Ok(outcome) => outcome,
                    Err(_) => SourceOutcome::Failed(SourceError::Timeout(self.source_timeout)),
                }
            };

            match outcome {
                SourceOutcome::Found(record) => {
                    collection.record = Some(record);
                    break;
                }
                SourceOutcome::NotFound => {
                    debug!(source = source.name(), domain = %domain, ingredient = name, "not found");
                }
                SourceOutcome::Failed(err) => {
                    warn!(
                        source = source.name(),
                        domain = %domain,
                        ingredient = name,
                        error = %err,
                        "source lookup failed"
                    );
                    collection.errors.push(format!("{}: {}", source.name(), err));
                }
            }
        }

        collection
    }
}
