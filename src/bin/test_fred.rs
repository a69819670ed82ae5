// src/bin/test_fred.rs
use dotenv::dotenv;
use policy_rules_api::models::EconomicIndicators;
use policy_rules_api::services::fred::{FredClient, SeriesProvider, FED_TARGET_SERIES};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let client = FredClient::shared()?;
    let ids = EconomicIndicators::default();

    println!(
        "Inflation ({}):          {:?}",
        ids.inflation_series_id,
        client.latest_value(&ids.inflation_series_id).await?
    );
    println!(
        "Unemployment ({}):       {:?}",
        ids.unemployment_rate_series_id,
        client.latest_value(&ids.unemployment_rate_series_id).await?
    );
    println!(
        "Natural unemployment ({}): {:?}",
        ids.natural_unemployment_series_id,
        client
            .latest_value(&ids.natural_unemployment_series_id)
            .await?
    );
    println!(
        "Real interest rate ({}):  {:?}",
        ids.real_interest_rate_series_id,
        client
            .latest_value(&ids.real_interest_rate_series_id)
            .await?
    );
    println!(
        "Fed target rate ({}):    {:?}",
        FED_TARGET_SERIES,
        client.latest_value(FED_TARGET_SERIES).await?
    );
    Ok(())
}
