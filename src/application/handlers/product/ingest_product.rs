//! IngestProductHandler - Maps a product's ingredients and writes them to the graph.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::handlers::mapping::IdentityMapper;
use crate::domain::foundation::{DomainError, IngredientKey, ProductId, Timestamp};
use crate::domain::identity::ComprehensiveRecord;
use crate::domain::toxicology::{derive_hazards, ingredient_key, HedAssessmentNode, ToxicologyIntegrator};
use crate::ports::{GraphGateway, IngredientNode};

/// Command to ingest a product's ingredient list.
#[derive(Debug, Clone)]
pub struct IngestProductCommand {
    pub product_id: ProductId,
    /// Ingredient names in label order.
    pub ingredient_names: Vec<String>,
}

/// What was stored for one ingredient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestedIngredient {
    pub inci: String,
    pub ingredient_key: IngredientKey,
    pub found: bool,
    pub data_completeness: f64,
    pub hazards: usize,
    pub hed_available: bool,
    pub safe_concentration_percent: Option<f64>,
    pub errors: Vec<String>,
}

/// Result of a product ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestProductResult {
    pub product_id: ProductId,
    pub ingredients: Vec<IngestedIngredient>,
    pub ingested_at: Timestamp,
}

impl IngestProductResult {
    pub fn found_count(&self) -> usize {
        self.ingredients.iter().filter(|i| i.found).count()
    }
}

/// Handler for product ingestion.
///
/// Names that no source recognises are still linked to the product as
/// bare `inci:` ingredients, so name-based rules keep applying to them.
pub struct IngestProductHandler {
    mapper: IdentityMapper,
    integrator: ToxicologyIntegrator,
    graph: Arc<dyn GraphGateway>,
}

impl IngestProductHandler {
    pub fn new(
        mapper: IdentityMapper,
        integrator: ToxicologyIntegrator,
        graph: Arc<dyn GraphGateway>,
    ) -> Self {
        Self {
            mapper,
            integrator,
            graph,
        }
    }

    pub async fn handle(&self, cmd: IngestProductCommand) -> Result<IngestProductResult, DomainError> {
        let names: Vec<String> = cmd
            .ingredient_names
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        // 1. Resolve identities and toxicology
        let records = self.mapper.map_batch(&names).await;

        // 2. Store each ingredient with its hazards and HED assessment
        let mut ingredients = Vec::with_capacity(records.len());
        for record in &records {
            ingredients.push(self.store_ingredient(record).await?);
        }

        // 3. Link the product to its ingredients
        let keys: Vec<IngredientKey> = ingredients.iter().map(|i| i.ingredient_key.clone()).collect();
        self.graph.upsert_product(&cmd.product_id, &keys).await?;

        let result = IngestProductResult {
            product_id: cmd.product_id,
            ingredients,
            ingested_at: Timestamp::now(),
        };
        info!(
            product_id = result.product_id.as_str(),
            ingredients = result.ingredients.len(),
            found = result.found_count(),
            "product ingested"
        );
        Ok(result)
    }

    async fn store_ingredient(
        &self,
        record: &ComprehensiveRecord,
    ) -> Result<IngestedIngredient, DomainError> {
        let key = ingredient_key(
            record.identity.as_ref(),
            record.toxicology.as_ref(),
            &record.inci_name,
        );
        self.graph
            .upsert_ingredient(&key, &IngredientNode::from_record(record))
            .await?;

        let mut stored = IngestedIngredient {
            inci: record.inci_name.clone(),
            ingredient_key: key.clone(),
            found: record.found,
            data_completeness: record.data_completeness,
            hazards: 0,
            hed_available: false,
            safe_concentration_percent: None,
            errors: record.errors.clone(),
        };
        if !record.found {
            return Ok(stored);
        }

        if let Some(tox) = &record.toxicology {
            let hazards = derive_hazards(tox);
            for hazard in &hazards {
                self.graph.upsert_hazard(&key, hazard).await?;
            }
            stored.hazards = hazards.len();
        }

        let outcome = self
            .integrator
            .process(record.toxicity_entries(), &record.inci_name);
        for note in &outcome.notes {
            warn!(ingredient = %record.inci_name, note = %note, "toxicity entry skipped");
        }
        let dtxsid = record.toxicology.as_ref().and_then(|t| t.dtxsid.as_deref());
        let assessment = HedAssessmentNode::from_outcome(&outcome, dtxsid);
        self.graph.upsert_hed_assessment(&key, &assessment).await?;

        stored.hed_available = outcome.calculated;
        stored.safe_concentration_percent = outcome.safety.map(|s| s.safe_concentration_percent);
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::graph::InMemoryGraphGateway;
    use crate::adapters::sources::{MockChemicalSource, SourceRegistry};
    use crate::config::MapperConfig;
    use crate::domain::hed::SafetyCategory;
    use crate::domain::identity::{DomainRecord, IdentityRecord, SourceDomain, ToxicityEntry, ToxicologyRecord};

    fn mapper(source: MockChemicalSource) -> IdentityMapper {
        let config = MapperConfig {
            batch_size: 5,
            batch_pause_ms: 0,
            source_timeout_secs: 5,
        };
        IdentityMapper::new(SourceRegistry::new().register_all(Arc::new(source)), &config)
    }

    fn source() -> MockChemicalSource {
        MockChemicalSource::new("mock", &[SourceDomain::Identity, SourceDomain::Toxicology])
            .with_record(
                "Aqua",
                DomainRecord::Identity(IdentityRecord {
                    inci_name: "Aqua".to_string(),
                    cas_number: Some("7732-18-5".to_string()),
                    source: "mock".to_string(),
                    confidence: 0.9,
                    ..Default::default()
                }),
            )
            .with_record(
                "Aqua",
                DomainRecord::Toxicology(ToxicologyRecord {
                    inci_name: "Aqua".to_string(),
                    irritation_potential: Some("Not irritating".to_string()),
                    dermal_toxicity_entries: vec![
                        ToxicityEntry::new("NOEL", 1000.0, "mg/kg-day", "oral", "rat"),
                    ],
                    source: "mock".to_string(),
                    confidence: 0.8,
                    ..Default::default()
                }),
            )
    }

    #[tokio::test]
    async fn stores_ingredients_hazards_and_hed_assessment() {
        let graph = Arc::new(InMemoryGraphGateway::new());
        let handler = IngestProductHandler::new(
            mapper(source()),
            ToxicologyIntegrator::default(),
            graph.clone(),
        );
        let product_id = ProductId::new("cream-1").unwrap();

        let result = handler
            .handle(IngestProductCommand {
                product_id: product_id.clone(),
                ingredient_names: vec!["Aqua".to_string(), "Parfum".to_string(), " ".to_string()],
            })
            .await
            .unwrap();

        assert_eq!(result.ingredients.len(), 2);
        assert_eq!(result.found_count(), 1);

        let aqua = &result.ingredients[0];
        assert_eq!(aqua.ingredient_key, IngredientKey::from_cas("7732-18-5"));
        assert_eq!(aqua.hazards, 1);
        assert!(aqua.hed_available);
        assert_eq!(
            graph
                .hed_assessment(&aqua.ingredient_key)
                .await
                .and_then(|a| a.risk_assessment()),
            Some(SafetyCategory::RequiresCarefulFormulation)
        );

        let parfum = &result.ingredients[1];
        assert_eq!(parfum.ingredient_key, IngredientKey::from_inci("parfum"));
        assert!(!parfum.found);
        assert!(graph.hed_assessment(&parfum.ingredient_key).await.is_none());

        assert_eq!(
            graph.product(&product_id).await,
            Some(vec![aqua.ingredient_key.clone(), parfum.ingredient_key.clone()])
        );
    }
}
