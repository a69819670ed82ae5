// src/handlers/estimates.rs
use log::{error, info};
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::models::{EconomicIndicators, PolicyRulesParameters};
use crate::services::fred::FredClient;
use crate::services::policy::calculate_policy_rule_estimates;

/// Shared adjustment knobs, all optional; absent fields use the rule
/// defaults (2% target, no inertia, no lower bound).
#[derive(Debug, Deserialize)]
pub struct RuleQuery {
    pub inflation_target: Option<f64>,
    pub rho: Option<f64>,
    pub elb: Option<f64>,
    pub apply_elb: Option<bool>,
}

impl RuleQuery {
    pub fn into_params(self) -> PolicyRulesParameters {
        let defaults = PolicyRulesParameters::default();
        PolicyRulesParameters {
            inflation_target: self.inflation_target.unwrap_or(defaults.inflation_target),
            rho: self.rho.unwrap_or(defaults.rho),
            elb: self.elb.unwrap_or(defaults.elb),
            apply_elb: self.apply_elb.unwrap_or(defaults.apply_elb),
        }
    }
}

pub async fn get_policy_estimates(
    query: RuleQuery,
    client: Arc<FredClient>,
) -> Result<Json, Rejection> {
    info!("Handling request for current policy rule estimates");

    let params = query.into_params();
    let mut indicators = EconomicIndicators::default();

    match calculate_policy_rule_estimates(client.as_ref(), &mut indicators, &params).await {
        Ok(estimates) => Ok(warp::reply::json(&estimates)),
        Err(e) => {
            error!("Failed to compute policy rule estimates: {}", e);
            Err(warp::reject::custom(ApiError::from(&e)))
        }
    }
}
