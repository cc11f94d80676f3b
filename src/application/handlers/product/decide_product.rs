//! DecideProductHandler - Personalised verdict for a stored product.

use std::sync::Arc;
use tracing::info;

use crate::domain::decision::{DecisionEngine, ProductDecision};
use crate::domain::foundation::{DomainError, ErrorCode, ProductId, UserId};
use crate::ports::{GraphGateway, UserProfileReader};

/// Command to score a product for a user.
#[derive(Debug, Clone)]
pub struct DecideProductCommand {
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Exposure routes to consider; `None` uses the configured defaults.
    pub routes: Option<Vec<String>>,
}

/// Handler for product decisions.
pub struct DecideProductHandler {
    profiles: Arc<dyn UserProfileReader>,
    graph: Arc<dyn GraphGateway>,
    engine: DecisionEngine,
    default_routes: Vec<String>,
}

impl DecideProductHandler {
    pub fn new(
        profiles: Arc<dyn UserProfileReader>,
        graph: Arc<dyn GraphGateway>,
        engine: DecisionEngine,
    ) -> Self {
        Self {
            profiles,
            graph,
            engine,
            default_routes: vec!["dermal".to_string()],
        }
    }

    pub fn with_default_routes(mut self, routes: Vec<String>) -> Self {
        if !routes.is_empty() {
            self.default_routes = routes;
        }
        self
    }

    pub async fn handle(&self, cmd: DecideProductCommand) -> Result<ProductDecision, DomainError> {
        let profile = self
            .profiles
            .get_profile(&cmd.user_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::ProfileNotFound,
                    format!("Profile for user {} not found", cmd.user_id.as_str()),
                )
            })?;

        let conditions: Vec<String> = profile
            .condition_names()
            .into_iter()
            .map(String::from)
            .collect();
        self.graph
            .upsert_user_profile(&cmd.user_id, &profile, &conditions)
            .await?;

        let routes = self.routes(cmd.routes);
        let facts = self
            .graph
            .assess_ingredients(&cmd.user_id, &cmd.product_id, &routes)
            .await?;

        let decision = self.engine.decide(&profile, &facts);
        info!(
            user_id = cmd.user_id.as_str(),
            product_id = cmd.product_id.as_str(),
            risk = %decision.overall_risk,
            score = decision.risk_score.value(),
            "product decided"
        );
        Ok(decision)
    }

    fn routes(&self, requested: Option<Vec<String>>) -> Vec<String> {
        let routes: Vec<String> = requested
            .unwrap_or_default()
            .iter()
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty())
            .collect();
        if routes.is_empty() {
            self.default_routes.clone()
        } else {
            routes
        }
    }
}
