// src/handlers/historical.rs
use log::{error, info};
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::estimates::RuleQuery;
use crate::models::EconomicIndicators;
use crate::services::fred::FredClient;
use crate::services::policy::calculate_historical_policy_rates;

pub async fn get_historical_rates(
    query: RuleQuery,
    client: Arc<FredClient>,
) -> Result<Json, Rejection> {
    info!("Handling request for historical policy rule trajectories");

    let params = query.into_params();
    let indicators = EconomicIndicators::default();

    match calculate_historical_policy_rates(client.as_ref(), &indicators, &params).await {
        Ok(table) => Ok(warp::reply::json(&table)),
        Err(e) => {
            error!("Failed to compute historical policy rates: {}", e);
            Err(warp::reject::custom(ApiError::from(&e)))
        }
    }
}
