// src/handlers/series.rs
use log::{error, info};
use serde_json::json;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::models::EconomicIndicators;
use crate::services::fred::{FredClient, SeriesProvider, FED_TARGET_SERIES};

/// Display names of the series backing the default indicator set, so API
/// consumers can label what the rules were computed from.
pub async fn get_series_names(client: Arc<FredClient>) -> Result<Json, Rejection> {
    info!("Handling request for indicator series names");

    let ids = EconomicIndicators::default();
    let lookups = [
        ("inflation", ids.inflation_series_id.as_str()),
        ("unemployment_rate", ids.unemployment_rate_series_id.as_str()),
        (
            "natural_unemployment_rate",
            ids.natural_unemployment_series_id.as_str(),
        ),
        (
            "real_interest_rate",
            ids.real_interest_rate_series_id.as_str(),
        ),
        ("fed_target_rate", FED_TARGET_SERIES),
    ];

    let mut names = serde_json::Map::new();
    for (label, series_id) in lookups {
        match client.series_display_name(series_id).await {
            Ok(title) => {
                names.insert(
                    label.to_string(),
                    json!({ "series_id": series_id, "name": title }),
                );
            }
            Err(e) => {
                error!("Failed to resolve name for series {}: {}", series_id, e);
                return Err(warp::reject::custom(ApiError::from(&e)));
            }
        }
    }

    Ok(warp::reply::json(&names))
}
