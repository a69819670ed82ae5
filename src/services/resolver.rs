// src/services/resolver.rs
use log::debug;

use crate::error::{PolicyError, Result};
use crate::models::EconomicIndicators;
use crate::services::fred::{SeriesProvider, FED_TARGET_SERIES};

/// One year back in each series' native reporting interval: the
/// unemployment rate is monthly, the natural rate quarterly.
pub const UNEMPLOYMENT_LAG_PERIODS: i64 = -12;
pub const NATURAL_UNEMPLOYMENT_LAG_PERIODS: i64 = -4;

/// Fill the indicators every level rule needs: inflation, unemployment,
/// natural unemployment, the long-term real interest rate, and the current
/// fed rate. Caller-supplied values are kept as-is.
pub async fn resolve_level_inputs<P: SeriesProvider>(
    client: &P,
    indicators: &mut EconomicIndicators,
) -> Result<()> {
    indicators.current_inflation_rate = client
        .value_or_fetch(
            indicators.current_inflation_rate,
            &indicators.inflation_series_id,
            0,
        )
        .await?;
    indicators.current_unemployment_rate = client
        .value_or_fetch(
            indicators.current_unemployment_rate,
            &indicators.unemployment_rate_series_id,
            0,
        )
        .await?;
    indicators.natural_unemployment_rate = client
        .value_or_fetch(
            indicators.natural_unemployment_rate,
            &indicators.natural_unemployment_series_id,
            0,
        )
        .await?;
    indicators.long_term_real_interest_rate = client
        .value_or_fetch(
            indicators.long_term_real_interest_rate,
            &indicators.real_interest_rate_series_id,
            0,
        )
        .await?;
    indicators.current_fed_rate = client
        .value_or_fetch(indicators.current_fed_rate, FED_TARGET_SERIES, 0)
        .await?;

    debug!("Resolved level-rule indicators: {:?}", indicators);
    require(
        indicators,
        &[
            "current_inflation_rate",
            "current_unemployment_rate",
            "natural_unemployment_rate",
            "long_term_real_interest_rate",
            "current_fed_rate",
        ],
    )
}

/// Fill the indicators the first difference rule needs, including the
/// year-ago unemployment gap components.
pub async fn resolve_difference_inputs<P: SeriesProvider>(
    client: &P,
    indicators: &mut EconomicIndicators,
) -> Result<()> {
    indicators.current_inflation_rate = client
        .value_or_fetch(
            indicators.current_inflation_rate,
            &indicators.inflation_series_id,
            0,
        )
        .await?;
    indicators.current_unemployment_rate = client
        .value_or_fetch(
            indicators.current_unemployment_rate,
            &indicators.unemployment_rate_series_id,
            0,
        )
        .await?;
    indicators.natural_unemployment_rate = client
        .value_or_fetch(
            indicators.natural_unemployment_rate,
            &indicators.natural_unemployment_series_id,
            0,
        )
        .await?;
    indicators.current_fed_rate = client
        .value_or_fetch(indicators.current_fed_rate, FED_TARGET_SERIES, 0)
        .await?;
    indicators.lagged_unemployment_rate = client
        .value_or_fetch(
            indicators.lagged_unemployment_rate,
            &indicators.unemployment_rate_series_id,
            UNEMPLOYMENT_LAG_PERIODS,
        )
        .await?;
    indicators.lagged_natural_unemployment_rate = client
        .value_or_fetch(
            indicators.lagged_natural_unemployment_rate,
            &indicators.natural_unemployment_series_id,
            NATURAL_UNEMPLOYMENT_LAG_PERIODS,
        )
        .await?;

    debug!("Resolved first-difference indicators: {:?}", indicators);
    require(
        indicators,
        &[
            "current_inflation_rate",
            "current_unemployment_rate",
            "natural_unemployment_rate",
            "current_fed_rate",
            "lagged_unemployment_rate",
            "lagged_natural_unemployment_rate",
        ],
    )
}

/// Error with the names of every field still unset after resolution. A rule
/// evaluation must never proceed on a partially-resolved indicator set.
fn require(indicators: &EconomicIndicators, fields: &[&str]) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .copied()
        .filter(|field| field_value(indicators, field).is_none())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PolicyError::DataUnavailable(format!(
            "unresolved indicators: {}",
            missing.join(", ")
        )))
    }
}

fn field_value(indicators: &EconomicIndicators, field: &str) -> Option<f64> {
    match field {
        "current_fed_rate" => indicators.current_fed_rate,
        "current_inflation_rate" => indicators.current_inflation_rate,
        "current_unemployment_rate" => indicators.current_unemployment_rate,
        "natural_unemployment_rate" => indicators.natural_unemployment_rate,
        "long_term_real_interest_rate" => indicators.long_term_real_interest_rate,
        "lagged_unemployment_rate" => indicators.lagged_unemployment_rate,
        "lagged_natural_unemployment_rate" => indicators.lagged_natural_unemployment_rate,
        _ => None,
    }
}
