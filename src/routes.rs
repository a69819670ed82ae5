// src/routes.rs
use log::info;
use std::convert::Infallible;
use std::sync::Arc;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::error::ApiError;
use crate::handlers::{
    estimates::{get_policy_estimates, RuleQuery},
    historical::get_historical_rates,
    series::get_series_names,
};
use crate::services::fred::FredClient;

// Recovery handling for our custom errors
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status();
        message = api_error.message.clone();
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(
    client: Arc<FredClient>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let client_filter = warp::any().map(move || client.clone());

    let estimates_route = warp::path!("api" / "v1" / "rules" / "estimates")
        .and(warp::get())
        .and(warp::query::<RuleQuery>())
        .and(client_filter.clone())
        .and_then(get_policy_estimates);

    let historical_route = warp::path!("api" / "v1" / "rules" / "historical")
        .and(warp::get())
        .and(warp::query::<RuleQuery>())
        .and(client_filter.clone())
        .and_then(get_historical_rates);

    let series_names_route = warp::path!("api" / "v1" / "series" / "names")
        .and(warp::get())
        .and(client_filter.clone())
        .and_then(get_series_names);

    info!("All routes configured successfully.");

    estimates_route
        .or(historical_route)
        .or(series_names_route)
        .recover(handle_rejection)
}
