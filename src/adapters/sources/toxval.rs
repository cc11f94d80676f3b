//! EPA ToxVal source backed by a PostgreSQL copy of the database.
//!
//! Lookup resolves the name to the first matching chemical (DTXSID), then
//! reads skin/eye classifications, the cancer summary and dermal toxicity
//! values for that substance.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::domain::identity::{DomainRecord, SourceDomain, ToxicityEntry, ToxicologyRecord};
use crate::ports::{ChemicalSource, SourceError, SourceOutcome};

pub const TOXVAL_SOURCE: &str = "toxval";
const TOXVAL_CONFIDENCE: f64 = 0.8;

const DOMAINS: &[SourceDomain] = &[SourceDomain::Toxicology];

/// One row of `mv_skin_eye`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkinEyeRow {
    pub endpoint: Option<String>,
    pub result_text: Option<String>,
}

/// One row of `toxval` restricted to dermal exposure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToxValRow {
    pub toxval_type: Option<String>,
    pub toxval_numeric: Option<f64>,
    pub toxval_units: Option<String>,
    pub exposure_route: Option<String>,
    pub species: Option<String>,
    pub effect: Option<String>,
}

pub struct ToxValSource {
    pool: PgPool,
}

impl ToxValSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_dtxsid(&self, name: &str) -> Result<Option<String>, SourceError> {
        let row = sqlx::query(
            r#"
            SELECT dtxsid
            FROM chemical
            WHERE name ILIKE $1
            ORDER BY length(name)
            LIMIT 1
            "#,
        )
        .bind(format!("%{}%", name.trim()))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(|r| r.try_get::<String, _>("dtxsid"))
            .transpose()
            .map_err(db_error)
    }

    async fn skin_eye(&self, dtxsid: &str) -> Result<Vec<SkinEyeRow>, SourceError> {
        let rows = sqlx::query("SELECT endpoint, result_text FROM mv_skin_eye WHERE dtxsid = $1")
            .bind(dtxsid)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.iter()
            .map(|row| {
                Ok(SkinEyeRow {
                    endpoint: row.try_get("endpoint")?,
                    result_text: row.try_get("result_text")?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(db_error)
    }

    async fn cancer_call(&self, dtxsid: &str) -> Result<Option<String>, SourceError> {
        let row = sqlx::query("SELECT cancer_call FROM mv_cancer_summary WHERE dtxsid = $1 LIMIT 1")
            .bind(dtxsid)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        match row {
            Some(row) => row.try_get::<Option<String>, _>("cancer_call").map_err(db_error),
            None => Ok(None),
        }
    }

    async fn dermal_values(&self, dtxsid: &str) -> Result<Vec<ToxValRow>, SourceError> {
        let rows = sqlx::query(
            r#"
            SELECT
                toxval_type,
                toxval_numeric::float8 AS toxval_numeric,
                toxval_units,
                exposure_route,
                species_original,
                toxicological_effect
            FROM toxval
            WHERE dtxsid = $1
              AND (exposure_route ILIKE '%dermal%'
                OR exposure_route ILIKE '%cutaneous%'
                OR exposure_route_original ILIKE '%dermal%'
                OR exposure_route_original ILIKE '%cutaneous%')
            "#,
        )
        .bind(dtxsid)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(toxval_row).collect::<Result<_, _>>().map_err(db_error)
    }

    async fn toxicology(&self, name: &str) -> Result<Option<ToxicologyRecord>, SourceError> {
        let Some(dtxsid) = self.find_dtxsid(name).await? else {
            return Ok(None);
        };

        let skin_eye = self.skin_eye(&dtxsid).await?;
        let carcinogenicity = self.cancer_call(&dtxsid).await?;
        let values = self.dermal_values(&dtxsid).await?;
        debug!(
            name,
            dtxsid = %dtxsid,
            skin_eye = skin_eye.len(),
            dermal_values = values.len(),
            "toxval substance resolved"
        );

        Ok(Some(ToxicologyRecord {
            inci_name: name.to_string(),
            irritation_potential: irritation_potential(&skin_eye),
            sensitization_risk: sensitization_risk(&skin_eye),
            carcinogenicity,
            dermal_toxicity_entries: toxicity_entries(&values),
            dtxsid: Some(dtxsid),
            source: TOXVAL_SOURCE.to_string(),
            confidence: TOXVAL_CONFIDENCE,
            ..Default::default()
        }))
    }
}

#[async_trait]
impl ChemicalSource for ToxValSource {
    fn name(&self) -> &str {
        TOXVAL_SOURCE
    }

    fn domains(&self) -> &[SourceDomain] {
        DOMAINS
    }

    async fn lookup(&self, domain: SourceDomain, name: &str) -> SourceOutcome {
        if domain != SourceDomain::Toxicology {
            return SourceOutcome::Failed(SourceError::UnsupportedDomain(domain));
        }
        match self.toxicology(name).await {
            Ok(Some(record)) => SourceOutcome::Found(DomainRecord::Toxicology(record)),
            Ok(None) => SourceOutcome::NotFound,
            Err(err) => SourceOutcome::Failed(err),
        }
    }
}

fn db_error(e: sqlx::Error) -> SourceError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::PoolClosed => {
            SourceError::Unavailable(e.to_string())
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) => {
            SourceError::Parse(e.to_string())
        }
        other => SourceError::Unavailable(format!("database error: {}", other)),
    }
}

fn toxval_row(row: &PgRow) -> Result<ToxValRow, sqlx::Error> {
    Ok(ToxValRow {
        toxval_type: row.try_get("toxval_type")?,
        toxval_numeric: row.try_get("toxval_numeric")?,
        toxval_units: row.try_get("toxval_units")?,
        exposure_route: row.try_get("exposure_route")?,
        species: row.try_get("species_original")?,
        effect: row.try_get("toxicological_effect")?,
    })
}

fn first_result_for(rows: &[SkinEyeRow], needles: &[&str]) -> Option<String> {
    rows.iter()
        .find(|row| {
            row.endpoint
                .as_deref()
                .map(str::to_lowercase)
                .is_some_and(|endpoint| needles.iter().any(|n| endpoint.contains(n)))
        })
        .and_then(|row| row.result_text.clone())
}

/// Result text of the first skin/eye endpoint about irritation.
pub fn irritation_potential(rows: &[SkinEyeRow]) -> Option<String> {
    first_result_for(rows, &["irritation"])
}

/// Result text of the first skin/eye endpoint about sensitisation.
pub fn sensitization_risk(rows: &[SkinEyeRow]) -> Option<String> {
    first_result_for(rows, &["sensitisation", "sensitization"])
}

/// Converts dermal ToxVal rows into toxicity entries.
///
/// Rows missing a type, value, unit or species carry nothing usable and
/// are dropped.
pub fn toxicity_entries(rows: &[ToxValRow]) -> Vec<ToxicityEntry> {
    rows.iter()
        .filter_map(|row| {
            let entry = ToxicityEntry::new(
                row.toxval_type.as_deref()?.trim(),
                row.toxval_numeric?,
                row.toxval_units.as_deref()?.trim(),
                row.exposure_route.as_deref().unwrap_or("dermal").trim(),
                row.species.as_deref()?.trim(),
            );
            Some(match row.effect.as_deref().map(str::trim) {
                Some(effect) if !effect.is_empty() => entry.with_effect(effect),
                _ => entry,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skin_eye(endpoint: &str, result: &str) -> SkinEyeRow {
        SkinEyeRow {
            endpoint: Some(endpoint.to_string()),
            result_text: Some(result.to_string()),
        }
    }

    #[test]
    fn picks_first_matching_skin_eye_endpoint() {
        let rows = vec![
            skin_eye("Eye Irritation", "Category 2A"),
            skin_eye("Skin Sensitisation", "Sensitiser"),
            skin_eye("Skin Irritation", "Not irritating"),
        ];
        assert_eq!(irritation_potential(&rows).as_deref(), Some("Category 2A"));
        assert_eq!(sensitization_risk(&rows).as_deref(), Some("Sensitiser"));
    }

    #[test]
    fn american_spelling_counts_as_sensitisation() {
        let rows = vec![skin_eye("skin sensitization (LLNA)", "Positive")];
        assert_eq!(sensitization_risk(&rows).as_deref(), Some("Positive"));
        assert_eq!(irritation_potential(&rows), None);
    }

    #[test]
    fn converts_complete_toxval_rows() {
        let rows = vec![
            ToxValRow {
                toxval_type: Some("NOAEL".into()),
                toxval_numeric: Some(1000.0),
                toxval_units: Some("mg/kg-day".into()),
                exposure_route: Some("dermal".into()),
                species: Some("rat".into()),
                effect: Some(" systemic ".into()),
            },
            ToxValRow {
                toxval_type: Some("LD50".into()),
                toxval_numeric: None,
                toxval_units: Some("mg/kg".into()),
                exposure_route: Some("dermal".into()),
                species: Some("rabbit".into()),
                effect: None,
            },
            ToxValRow {
                toxval_type: Some("LOAEL".into()),
                toxval_numeric: Some(50.0),
                toxval_units: Some("mg/kg".into()),
                exposure_route: None,
                species: Some("rabbit".into()),
                effect: Some("".into()),
            },
        ];

        let entries = toxicity_entries(&rows);
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            ToxicityEntry::new("NOAEL", 1000.0, "mg/kg-day", "dermal", "rat").with_effect("systemic")
        );
        assert_eq!(entries[1].route, "dermal");
        assert_eq!(entries[1].effect, None);
    }

    #[test]
    fn pool_failures_are_unavailable() {
        assert!(matches!(
            db_error(sqlx::Error::PoolTimedOut),
            SourceError::Unavailable(_)
        ));
        assert!(matches!(
            db_error(sqlx::Error::PoolClosed),
            SourceError::Unavailable(_)
        ));
    }
}
