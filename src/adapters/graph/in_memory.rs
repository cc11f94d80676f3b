//! In-memory graph gateway.
//!
//! Keeps nodes and relationships in hash maps and answers
//! `assess_ingredients` by joining them in process: product → ingredients
//! (in list order) → route-filtered hazards, plus each ingredient's HED
//! assessment.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::decision::{IngredientFacts, UserProfile};
use crate::domain::foundation::{DomainError, ErrorCode, IngredientKey, ProductId, UserId};
use crate::domain::toxicology::{Hazard, HedAssessmentNode};
use crate::ports::{GraphGateway, IngredientNode};

#[derive(Debug, Clone)]
struct UserNode {
    profile: UserProfile,
    conditions: Vec<String>,
}

#[derive(Debug, Default)]
struct GraphState {
    ingredients: HashMap<IngredientKey, IngredientNode>,
    hazards: HashMap<IngredientKey, Vec<Hazard>>,
    assessments: HashMap<IngredientKey, HedAssessmentNode>,
    products: HashMap<ProductId, Vec<IngredientKey>>,
    users: HashMap<UserId, UserNode>,
}

/// Graph gateway backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryGraphGateway {
    state: RwLock<GraphState>,
}

impl InMemoryGraphGateway {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    pub async fn ingredient(&self, key: &IngredientKey) -> Option<IngredientNode> {
        self.state.read().await.ingredients.get(key).cloned()
    }

    pub async fn hazards(&self, key: &IngredientKey) -> Vec<Hazard> {
        self.state
            .read()
            .await
            .hazards
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn hed_assessment(&self, key: &IngredientKey) -> Option<HedAssessmentNode> {
        self.state.read().await.assessments.get(key).cloned()
    }

    pub async fn product(&self, product_id: &ProductId) -> Option<Vec<IngredientKey>> {
        self.state.read().await.products.get(product_id).cloned()
    }

    pub async fn user_conditions(&self, user_id: &UserId) -> Option<Vec<String>> {
        self.state
            .read()
            .await
            .users
            .get(user_id)
            .map(|u| u.conditions.clone())
    }

    pub async fn ingredient_count(&self) -> usize {
        self.state.read().await.ingredients.len()
    }
}

fn display_name(key: &IngredientKey, node: Option<&IngredientNode>) -> String {
    match node {
        Some(node) => node.inci.clone(),
        None => key
            .as_str()
            .strip_prefix("inci:")
            .unwrap_or(key.as_str())
            .to_string(),
    }
}

#[async_trait]
impl GraphGateway for InMemoryGraphGateway {
    async fn upsert_ingredient(
        &self,
        key: &IngredientKey,
        node: &IngredientNode,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let entry = state
            .ingredients
            .entry(key.clone())
            .or_insert_with(|| IngredientNode::named(node.inci.clone()));

        entry.inci = node.inci.clone();
        entry.updated_at = node.updated_at;
        if node.cas.is_some() {
            entry.cas = node.cas.clone();
        }
        if node.inchi_key.is_some() {
            entry.inchi_key = node.inchi_key.clone();
        }
        if node.dtxsid.is_some() {
            entry.dtxsid = node.dtxsid.clone();
        }
        Ok(())
    }

    async fn upsert_hazard(&self, key: &IngredientKey, hazard: &Hazard) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.ingredients.contains_key(key) {
            return Err(DomainError::new(
                ErrorCode::IngredientNotFound,
                format!("Ingredient {} not found", key),
            ));
        }

        let hazards = state.hazards.entry(key.clone()).or_default();
        let merge_key = hazard.merge_key();
        match hazards.iter_mut().find(|h| h.merge_key() == merge_key) {
            Some(existing) => *existing = hazard.clone(),
            None => hazards.push(hazard.clone()),
        }
        Ok(())
    }

    async fn upsert_hed_assessment(
        &self,
        key: &IngredientKey,
        assessment: &HedAssessmentNode,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.ingredients.contains_key(key) {
            return Err(DomainError::new(
                ErrorCode::IngredientNotFound,
                format!("Ingredient {} not found", key),
            ));
        }
        state.assessments.insert(key.clone(), assessment.clone());
        Ok(())
    }

    async fn upsert_product(
        &self,
        product_id: &ProductId,
        ingredient_keys: &[IngredientKey],
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let mut ordered: Vec<IngredientKey> = Vec::with_capacity(ingredient_keys.len());
        for key in ingredient_keys {
            if !ordered.contains(key) {
                ordered.push(key.clone());
            }
        }
        state.products.insert(product_id.clone(), ordered);
        Ok(())
    }

    async fn upsert_user_profile(
        &self,
        user_id: &UserId,
        profile: &UserProfile,
        conditions: &[String],
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        state.users.insert(
            user_id.clone(),
            UserNode {
                profile: profile.clone(),
                conditions: conditions.to_vec(),
            },
        );
        Ok(())
    }

    async fn assess_ingredients(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        routes: &[String],
    ) -> Result<Vec<IngredientFacts>, DomainError> {
        let state = self.state.read().await;
        let keys = state.products.get(product_id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::ProductNotFound,
                format!("Product {} not found", product_id.as_str()),
            )
        })?;
        if let Some(user) = state.users.get(user_id) {
            tracing::debug!(
                user_id = user_id.as_str(),
                conditions = user.conditions.len(),
                fragrance_free = user.profile.preferences.fragrance_free,
                "assessing product for stored user"
            );
        }

        let routes: Vec<String> = routes.iter().map(|r| r.trim().to_lowercase()).collect();
        let facts = keys
            .iter()
            .map(|key| {
                let hazards = state
                    .hazards
                    .get(key)
                    .map(|hazards| {
                        hazards
                            .iter()
                            .filter(|h| routes.contains(&h.route.to_lowercase()))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();

                IngredientFacts {
                    ingredient_key: key.clone(),
                    inci: display_name(key, state.ingredients.get(key)),
                    hazards,
                    hed_risk_assessment: state
                        .assessments
                        .get(key)
                        .and_then(HedAssessmentNode::risk_assessment)
                        .map(|category| category.as_str().to_string()),
                }
            })
            .collect();

        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::toxicology::Severity;

    fn product() -> ProductId {
        ProductId::new("cream-1").unwrap()
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn oral(hazard_type: &str, effect: &str) -> Hazard {
        Hazard {
            route: "oral".to_string(),
            ..Hazard::dermal(hazard_type, "10", effect, Severity::Medium)
        }
    }

    #[tokio::test]
    async fn assess_joins_hazards_filtered_by_route() {
        let graph = InMemoryGraphGateway::new();
        let key = IngredientKey::from_inci("linalool");
        graph
            .upsert_ingredient(&key, &IngredientNode::named("Linalool"))
            .await
            .unwrap();
        graph
            .upsert_hazard(&key, &Hazard::dermal("sensitization", "1B", "skin sensitization", Severity::Medium))
            .await
            .unwrap();
        graph
            .upsert_hazard(&key, &oral("NOAEL", "liver toxicity"))
            .await
            .unwrap();
        graph.upsert_product(&product(), &[key.clone()]).await.unwrap();

        let facts = graph
            .assess_ingredients(&user(), &product(), &["Dermal".to_string()])
            .await
            .unwrap();

        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].inci, "Linalool");
        assert_eq!(facts[0].hazards.len(), 1);
        assert!(facts[0].causes_sensitization());
        assert_eq!(facts[0].hed_risk_assessment, None);
    }

    #[tokio::test]
    async fn equal_hazards_are_merged() {
        let graph = InMemoryGraphGateway::new();
        let key = IngredientKey::from_inci("parfum");
        graph
            .upsert_ingredient(&key, &IngredientNode::named("Parfum"))
            .await
            .unwrap();
        let hazard = Hazard::dermal("irritation", "Irritant", "skin irritation", Severity::Medium);
        graph.upsert_hazard(&key, &hazard).await.unwrap();
        graph
            .upsert_hazard(&key, &hazard.clone().with_source("toxval", 0.8))
            .await
            .unwrap();

        let stored = graph.hazards(&key).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].source, "toxval");
    }

    #[tokio::test]
    async fn hazard_on_unknown_ingredient_is_rejected() {
        let graph = InMemoryGraphGateway::new();
        let err = graph
            .upsert_hazard(
                &IngredientKey::from_inci("ghost"),
                &Hazard::dermal("irritation", "x", "skin irritation", Severity::Low),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::IngredientNotFound);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let graph = InMemoryGraphGateway::new();
        let err = graph
            .assess_ingredients(&user(), &product(), &["dermal".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
    }

    #[tokio::test]
    async fn product_keeps_order_and_drops_duplicates() {
        let graph = InMemoryGraphGateway::new();
        let aqua = IngredientKey::from_inci("aqua");
        let parfum = IngredientKey::from_inci("parfum");
        graph
            .upsert_product(&product(), &[aqua.clone(), parfum.clone(), aqua.clone()])
            .await
            .unwrap();

        assert_eq!(graph.product(&product()).await, Some(vec![aqua, parfum]));
        let facts = graph
            .assess_ingredients(&user(), &product(), &["dermal".to_string()])
            .await
            .unwrap();
        assert_eq!(facts[0].inci, "aqua");
    }

    #[tokio::test]
    async fn upsert_ingredient_keeps_known_identifiers() {
        let graph = InMemoryGraphGateway::new();
        let key = IngredientKey::from_cas("56-81-5");
        let full = IngredientNode {
            inci: "Glycerin".to_string(),
            cas: Some("56-81-5".to_string()),
            inchi_key: None,
            dtxsid: Some("DTXSID9020663".to_string()),
            ..IngredientNode::named("Glycerin")
        };
        graph.upsert_ingredient(&key, &full).await.unwrap();
        graph
            .upsert_ingredient(&key, &IngredientNode::named("glycerin"))
            .await
            .unwrap();

        let stored = graph.ingredient(&key).await.unwrap();
        assert_eq!(stored.inci, "glycerin");
        assert_eq!(stored.dtxsid.as_deref(), Some("DTXSID9020663"));
        assert_eq!(graph.ingredient_count().await, 1);
    }

    #[tokio::test]
    async fn user_profile_links_conditions() {
        let graph = InMemoryGraphGateway::new();
        graph
            .upsert_user_profile(&user(), &UserProfile::default(), &["rosacea".to_string()])
            .await
            .unwrap();
        assert_eq!(
            graph.user_conditions(&user()).await,
            Some(vec!["rosacea".to_string()])
        );
    }
}
