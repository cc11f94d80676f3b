//! Graph Gateway Port - Read/write contract for the ingredient graph.
//!
//! The graph links products to ingredients, ingredients to hazards, hazards
//! to effects, ingredients to HED assessments, and users to conditions.
//! Implementations may use a graph engine or join fetched records in
//! process; either way the rows returned by `assess_ingredients` must carry
//! the same joined facts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::decision::{IngredientFacts, UserProfile};
use crate::domain::foundation::{DomainError, IngredientKey, ProductId, Timestamp, UserId};
use crate::domain::identity::ComprehensiveRecord;
use crate::domain::toxicology::{Hazard, HedAssessmentNode};

/// Scalar properties of an ingredient node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IngredientNode {
    pub inci: String,
    pub cas: Option<String>,
    pub inchi_key: Option<String>,
    pub dtxsid: Option<String>,
    pub updated_at: Timestamp,
}

impl IngredientNode {
    /// A node known only by name.
    pub fn named(inci: impl Into<String>) -> Self {
        Self {
            inci: inci.into(),
            ..Default::default()
        }
    }

    pub fn from_record(record: &ComprehensiveRecord) -> Self {
        Self {
            inci: record.inci_name.clone(),
            cas: record.identity.as_ref().and_then(|i| i.cas_number.clone()),
            inchi_key: record.identity.as_ref().and_then(|i| i.inchi_key.clone()),
            dtxsid: record.toxicology.as_ref().and_then(|t| t.dtxsid.clone()),
            updated_at: Timestamp::now(),
        }
    }
}

/// Port for the ingredient/user property graph.
#[async_trait]
pub trait GraphGateway: Send + Sync {
    /// Creates or updates an ingredient node.
    async fn upsert_ingredient(
        &self,
        key: &IngredientKey,
        node: &IngredientNode,
    ) -> Result<(), DomainError>;

    /// Attaches a hazard (and its effect) to an ingredient. Equal hazards
    /// are merged.
    async fn upsert_hazard(&self, key: &IngredientKey, hazard: &Hazard) -> Result<(), DomainError>;

    /// Replaces the HED assessment of an ingredient.
    async fn upsert_hed_assessment(
        &self,
        key: &IngredientKey,
        assessment: &HedAssessmentNode,
    ) -> Result<(), DomainError>;

    /// Sets the ordered ingredient list of a product.
    async fn upsert_product(
        &self,
        product_id: &ProductId,
        ingredient_keys: &[IngredientKey],
    ) -> Result<(), DomainError>;

    /// Stores a profile snapshot and links the user to its conditions.
    async fn upsert_user_profile(
        &self,
        user_id: &UserId,
        profile: &UserProfile,
        conditions: &[String],
    ) -> Result<(), DomainError>;

    /// One row per product ingredient, with hazards restricted to `routes`.
    async fn assess_ingredients(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        routes: &[String],
    ) -> Result<Vec<IngredientFacts>, DomainError>;
}
